use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::geo::LatLng;
use crate::social::records::Postcard;

/// A collectible postcard shown on the nearby map.
///
/// Items only live in the published map state; storing them is the
/// document store's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyItem {
    pub id: String,
    pub label: String,
    pub image_url: String,
    pub timestamp: DateTime<Utc>,
    pub coordinate: LatLng,
}

impl NearbyItem {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        image_url: impl Into<String>,
        coordinate: LatLng,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            image_url: image_url.into(),
            timestamp: Utc::now(),
            coordinate,
        }
    }

    /// Distance from `point` in meters
    pub fn distance_from(&self, point: &LatLng) -> f64 {
        point.distance_to(&self.coordinate)
    }
}

impl From<NearbyItem> for Postcard {
    fn from(item: NearbyItem) -> Self {
        Postcard {
            id: Some(item.id),
            image_url: item.image_url,
            location: item.label,
            date_scanned: item.timestamp,
            coordinate: item.coordinate,
        }
    }
}
