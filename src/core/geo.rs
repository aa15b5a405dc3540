use serde::{Deserialize, Serialize};

use crate::core::constants::EARTH_RADIUS_METERS;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    #[serde(rename = "latitude")]
    pub lat: f64,
    #[serde(rename = "longitude")]
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Calculates the great-circle distance to another LatLng in meters
    /// using the Haversine formula
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }

    /// Initial great-circle bearing towards `to`, in degrees.
    ///
    /// The result comes straight out of `atan2`, so it lies in (-180, 180]
    /// and may be negative (west of north).
    pub fn bearing_to(&self, to: &LatLng) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = to.lat.to_radians();
        let delta_lng = (to.lng - self.lng).to_radians();

        let y = delta_lng.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

        y.atan2(x).to_degrees()
    }

    /// Point reached by travelling `distance` meters along the great circle
    /// that leaves this point with the given initial bearing (degrees).
    /// The longitude is wrapped into [-180, 180].
    pub fn destination(&self, distance: f64, bearing: f64) -> LatLng {
        let angular = distance / EARTH_RADIUS_METERS;
        let bearing_rad = bearing.to_radians();
        let lat1 = self.lat.to_radians();
        let lng1 = self.lng.to_radians();

        let lat2 = (lat1.sin() * angular.cos()
            + lat1.cos() * angular.sin() * bearing_rad.cos())
        .asin();
        let lng2 = lng1
            + (bearing_rad.sin() * angular.sin() * lat1.cos())
                .atan2(angular.cos() - lat1.sin() * lat2.sin());

        LatLng::new(lat2.to_degrees(), Self::wrap_lng(lng2.to_degrees()))
    }

    /// Wraps longitude to [-180, 180] range
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Clamps latitude to valid range
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-90.0, 90.0)
    }

    /// Returns a copy pulled back into the valid coordinate ranges
    pub fn normalized(&self) -> LatLng {
        LatLng::new(Self::clamp_lat(self.lat), Self::wrap_lng(self.lng))
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Initial great-circle bearing from `from` to `to`, in degrees
pub fn bearing(from: &LatLng, to: &LatLng) -> f64 {
    from.bearing_to(to)
}

/// Destination point from `origin` after `distance` meters on `bearing` degrees
pub fn destination(origin: &LatLng, distance: f64, bearing: f64) -> LatLng {
    origin.destination(distance, bearing)
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}
