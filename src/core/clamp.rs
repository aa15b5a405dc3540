//! Geofence policy for the nearby map.
//!
//! Keeps the viewport zoomed between two span limits and keeps its center
//! within a fixed distance of the user's last known location. Panning past
//! the limit is not rejected: the center is pulled back onto the boundary
//! circle in the direction the user was panning.

use crate::core::config::GeofenceConfig;
use crate::core::constants::PAN_BOUNDARY_TOLERANCE_METERS;
use crate::core::geo::LatLng;
use crate::core::viewport::Region;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionPolicy {
    pub min_span: f64,
    pub max_span: f64,
    pub max_pan_distance: f64,
}

impl RegionPolicy {
    pub fn new(min_span: f64, max_span: f64, max_pan_distance: f64) -> Self {
        Self {
            min_span,
            max_span,
            max_pan_distance,
        }
    }

    /// Produces the corrected region. Never fails; any input yields a
    /// region that satisfies both limits.
    pub fn clamp(&self, proposed: &Region, user_location: Option<LatLng>) -> Region {
        let span = proposed.span.clamped(self.min_span, self.max_span);
        let center = match user_location {
            Some(user) => self.clamp_center(proposed.center, user),
            None => proposed.center,
        };
        Region::new(center, span)
    }

    /// Projects `center` back onto the boundary circle around `user` when
    /// it has drifted too far; otherwise returns it untouched.
    pub fn clamp_center(&self, center: LatLng, user: LatLng) -> LatLng {
        let distance = user.distance_to(&center);
        if distance.is_nan() || distance <= self.max_pan_distance + PAN_BOUNDARY_TOLERANCE_METERS {
            return center;
        }

        let bearing = user.bearing_to(&center);
        user.destination(self.max_pan_distance, bearing)
    }

    /// Whether `center` is within the allowed pan distance of `user`
    pub fn within_reach(&self, center: &LatLng, user: &LatLng) -> bool {
        user.distance_to(center) <= self.max_pan_distance + PAN_BOUNDARY_TOLERANCE_METERS
    }
}

impl Default for RegionPolicy {
    fn default() -> Self {
        GeofenceConfig::default().policy()
    }
}

impl From<&GeofenceConfig> for RegionPolicy {
    fn from(config: &GeofenceConfig) -> Self {
        config.policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::viewport::Span;

    fn sf() -> LatLng {
        LatLng::new(37.7749, -122.4194)
    }

    #[test]
    fn test_span_is_clamped_without_user() {
        let policy = RegionPolicy::default();
        let proposed = Region::new(LatLng::new(10.0, 10.0), Span::new(0.3, 0.005));

        let clamped = policy.clamp(&proposed, None);
        assert_eq!(clamped.span, Span::new(0.2, 0.01));
        // No user location: the center is never touched
        assert_eq!(clamped.center, proposed.center);
    }

    #[test]
    fn test_center_inside_radius_is_unchanged() {
        let policy = RegionPolicy::default();
        let near = sf().destination(4_999.0, 123.0);
        let proposed = Region::around(near, 0.5);

        let clamped = policy.clamp(&proposed, Some(sf()));
        assert_eq!(clamped.center, near);
        assert_eq!(clamped.span, Span::uniform(0.2));
    }

    #[test]
    fn test_center_outside_radius_is_projected() {
        let policy = RegionPolicy::default();
        let proposed = Region::around(LatLng::new(37.8749, -122.4194), 0.05);

        let clamped = policy.clamp(&proposed, Some(sf()));
        assert!((clamped.center.lat - 37.8199).abs() < 1e-4, "{:?}", clamped.center);
        assert!((clamped.center.lng - -122.4194).abs() < 1e-9);
        assert!((sf().distance_to(&clamped.center) - 5_000.0).abs() < 1.0);
    }

    #[test]
    fn test_projection_keeps_pan_direction() {
        let policy = RegionPolicy::default();
        let far = LatLng::new(37.70, -122.30);
        let clamped = policy.clamp(&Region::around(far, 0.05), Some(sf()));

        let wanted = sf().bearing_to(&far);
        let got = sf().bearing_to(&clamped.center);
        assert!((wanted - got).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let policy = RegionPolicy::default();
        let user = sf();
        let cases = [
            Region::new(LatLng::new(37.8749, -122.4194), Span::new(0.3, 0.005)),
            Region::new(LatLng::new(36.0, -120.0), Span::new(0.001, 5.0)),
            Region::new(LatLng::new(37.78, -122.42), Span::new(0.05, 0.05)),
            Region::new(LatLng::new(-33.86, 151.2), Span::new(f64::NAN, 0.1)),
        ];

        for proposed in cases {
            let once = policy.clamp(&proposed, Some(user));
            let twice = policy.clamp(&once, Some(user));
            assert_eq!(once, twice, "not idempotent for {:?}", proposed);
        }
    }

    #[test]
    fn test_pan_across_antimeridian_stays_in_range() {
        let policy = RegionPolicy::default();
        let user = LatLng::new(0.0, 179.99);
        let proposed = Region::around(LatLng::new(0.0, -179.9), 0.05);

        let once = policy.clamp(&proposed, Some(user));
        assert!(once.center.is_valid(), "{:?}", once.center);
        assert!(once.center.lng < -179.9);
        assert!((user.distance_to(&once.center) - 5_000.0).abs() < 1.0);

        let twice = policy.clamp(&once, Some(user));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_within_reach() {
        let policy = RegionPolicy::default();
        assert!(policy.within_reach(&sf().destination(100.0, 0.0), &sf()));
        assert!(!policy.within_reach(&sf().destination(6_000.0, 0.0), &sf()));
    }
}
