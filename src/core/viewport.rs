use crate::core::constants::{DEFAULT_CENTER, DEFAULT_SPAN_DEGREES};
use crate::core::geo::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};

/// Visible extent of the map in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub lat_delta: f64,
    pub lng_delta: f64,
}

impl Span {
    pub fn new(lat_delta: f64, lng_delta: f64) -> Self {
        Self {
            lat_delta,
            lng_delta,
        }
    }

    /// Square span with the same delta on both axes
    pub fn uniform(delta: f64) -> Self {
        Self::new(delta, delta)
    }

    /// Clamps both deltas independently into `[min, max]`.
    /// NaN collapses to `min`.
    pub fn clamped(&self, min: f64, max: f64) -> Span {
        Span::new(clamp_delta(self.lat_delta, min, max), clamp_delta(self.lng_delta, min, max))
    }
}

fn clamp_delta(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// The region shown by the map: a center plus a span.
///
/// A region has no identity of its own. It is rebuilt on every fix and
/// every gesture instead of being patched in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// Latitude/longitude extent of the view
    pub span: Span,
}

impl Region {
    /// Creates a new region
    pub fn new(center: LatLng, span: Span) -> Self {
        Self { center, span }
    }

    /// Square region of `delta` degrees around `center`
    pub fn around(center: LatLng, delta: f64) -> Self {
        Self::new(center, Span::uniform(delta))
    }

    /// Returns a copy with a different center
    pub fn with_center(&self, center: LatLng) -> Self {
        Self::new(center, self.span)
    }

    /// Gets the region bounds in geographical coordinates
    pub fn bounds(&self) -> LatLngBounds {
        let half_lat = self.span.lat_delta / 2.0;
        let half_lng = self.span.lng_delta / 2.0;
        LatLngBounds::from_coords(
            self.center.lat - half_lat,
            self.center.lng - half_lng,
            self.center.lat + half_lat,
            self.center.lng + half_lng,
        )
    }

    /// Checks whether a coordinate is currently visible
    pub fn contains(&self, point: &LatLng) -> bool {
        self.bounds().contains(point)
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::around(
            LatLng::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            DEFAULT_SPAN_DEGREES,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_region() {
        let region = Region::default();
        assert_eq!(region.center, LatLng::new(37.7749, -122.4194));
        assert_eq!(region.span, Span::uniform(0.1));
    }

    #[test]
    fn test_span_clamping() {
        let span = Span::new(0.3, 0.005).clamped(0.01, 0.2);
        assert_eq!(span, Span::new(0.2, 0.01));

        let untouched = Span::new(0.05, 0.15).clamped(0.01, 0.2);
        assert_eq!(untouched, Span::new(0.05, 0.15));

        let weird = Span::new(f64::NAN, f64::INFINITY).clamped(0.01, 0.2);
        assert_eq!(weird, Span::new(0.01, 0.2));
    }

    #[test]
    fn test_bounds_and_contains() {
        let region = Region::around(LatLng::new(10.0, 20.0), 0.2);
        let bounds = region.bounds();

        assert!((bounds.south_west.lat - 9.9).abs() < 1e-12);
        assert!((bounds.north_east.lng - 20.1).abs() < 1e-12);
        assert!(region.contains(&LatLng::new(10.05, 19.95)));
        assert!(!region.contains(&LatLng::new(10.2, 20.0)));
    }
}
