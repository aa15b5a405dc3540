use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// Authorization states reported by the platform location service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl AuthorizationStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::AuthorizedWhenInUse | Self::AuthorizedAlways)
    }

    /// Denied or restricted; `NotDetermined` is still pending, not refused
    pub fn is_refused(&self) -> bool {
        matches!(self, Self::Denied | Self::Restricted)
    }
}

impl Default for AuthorizationStatus {
    fn default() -> Self {
        Self::NotDetermined
    }
}

/// Events pushed by a location provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationEvent {
    AuthorizationChanged(AuthorizationStatus),
    /// A batch of fixes, oldest first. Only the last one is used.
    LocationUpdated(Vec<LatLng>),
    LocationFailed(String),
}

impl LocationEvent {
    /// Single-fix update
    pub fn fix(lat: f64, lng: f64) -> Self {
        Self::LocationUpdated(vec![LatLng::new(lat, lng)])
    }
}
