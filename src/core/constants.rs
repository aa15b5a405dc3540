//! Core constants for the nearby-postcards map.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Mean Earth radius used by every spherical calculation, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Smallest span (degrees) the viewport may zoom in to.
pub const MIN_SPAN_DEGREES: f64 = 0.01;

/// Largest span (degrees) the viewport may zoom out to.
pub const MAX_SPAN_DEGREES: f64 = 0.2;

/// How far the viewport center may drift from the user, in meters.
pub const MAX_PAN_DISTANCE_METERS: f64 = 5_000.0;

/// Span of the region recentered on every location fix.
pub const FIX_SPAN_DEGREES: f64 = 0.05;

/// Viewport shown before the first fix arrives.
pub const DEFAULT_CENTER: (f64, f64) = (37.7749, -122.4194);
pub const DEFAULT_SPAN_DEGREES: f64 = 0.1;

/// Minimum movement before the provider reports a new fix.
pub const DISTANCE_FILTER_METERS: f64 = 500.0;

/// Synthesized nearby batch: count and per-axis jitter (~5 km).
pub const NEARBY_BATCH_SIZE: usize = 5;
pub const NEARBY_JITTER_DEGREES: f64 = 0.05;

/// Hard cap on the published nearby set.
pub const NEARBY_MAX_ITEMS: usize = 50;

pub const NEARBY_LABEL: &str = "Nearby Location";
pub const NEARBY_IMAGE_URL: &str = "https://example.com/postcard.jpg";

/// Image used when a scanned code is missing.
pub const DEFAULT_POSTCARD_IMAGE_URL: &str = "https://example.com/default.jpg";
pub const SCANNED_LOCATION_LABEL: &str = "Current Location";

/// Slack (meters) when testing a center against the pan boundary, so a
/// center already projected onto the boundary is not projected again.
pub const PAN_BOUNDARY_TOLERANCE_METERS: f64 = 1e-6;
