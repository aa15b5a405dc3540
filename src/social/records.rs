use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::geo::LatLng;
use crate::Result;

/// A registered user as stored in the `users` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl AppUser {
    pub fn new(id: impl Into<String>, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
        }
    }
}

/// A collected postcard, stored under `users/{id}/postcards`.
///
/// Field names follow the stored document layout (`imageUrl`,
/// `dateScanned`, RFC 3339 dates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Postcard {
    /// Assigned by the store on save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub image_url: String,
    pub location: String,
    pub date_scanned: DateTime<Utc>,
    pub coordinate: LatLng,
}

impl Postcard {
    pub fn new(
        image_url: impl Into<String>,
        location: impl Into<String>,
        date_scanned: DateTime<Utc>,
        coordinate: LatLng,
    ) -> Self {
        Self {
            id: None,
            image_url: image_url.into(),
            location: location.into(),
            date_scanned,
            coordinate,
        }
    }
}

/// Decodes a JSON array of postcards
pub fn decode_postcards(json: &str) -> Result<Vec<Postcard>> {
    Ok(serde_json::from_str(json)?)
}
