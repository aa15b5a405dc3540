//! Collaborator seams
//!
//! Everything outside the map core (the platform location service, the
//! session, the document backend and the nearby query) is reached through
//! one of these traits and injected by the caller, so tests can swap in
//! scripted or in-memory versions.

use async_trait::async_trait;

use crate::{
    core::geo::LatLng,
    location::events::AuthorizationStatus,
    nearby::item::NearbyItem,
    social::records::{AppUser, Postcard},
    Result,
};

/// Platform location service
///
/// Fixes, authorization changes and failures are not returned from these
/// calls; the provider pushes them as [`LocationEvent`]s into the map's
/// command channel.
///
/// [`LocationEvent`]: crate::location::events::LocationEvent
pub trait LocationProvider: Send + Sync {
    /// Whether location services are enabled on the device at all
    fn services_enabled(&self) -> bool;

    /// Current authorization status
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask the user for when-in-use access. The answer arrives later as an
    /// `AuthorizationChanged` event.
    fn request_authorization(&self);

    /// Minimum movement in meters between delivered fixes. Applied to
    /// updates started after the call.
    fn set_distance_filter(&self, _meters: f64) {}

    /// Begin delivering fixes
    fn start_updates(&self);

    /// Stop delivering fixes
    fn stop_updates(&self) {}
}

/// Source of the current signed-in identity
pub trait SessionProvider: Send + Sync {
    /// Id of the signed-in user, `None` when logged out
    fn current_user_id(&self) -> Option<String>;

    fn is_authenticated(&self) -> bool {
        self.current_user_id().is_some()
    }
}

/// Spatial query for collectible postcards around a point
#[async_trait]
pub trait NearbySource: Send + Sync {
    async fn nearby(&self, center: LatLng) -> Result<Vec<NearbyItem>>;
}

/// Document backend holding users, their postcards and follow edges
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_user(&self, user: AppUser) -> Result<()>;

    async fn get_user(&self, user_id: &str) -> Result<Option<AppUser>>;

    /// Users whose username lies in `[prefix, prefix + U+F8FF)`
    async fn users_with_username_prefix(&self, prefix: &str) -> Result<Vec<AppUser>>;

    /// Stores a postcard under the user and returns its generated id
    async fn save_postcard(&self, user_id: &str, postcard: Postcard) -> Result<String>;

    async fn postcards(&self, user_id: &str) -> Result<Vec<Postcard>>;

    async fn is_following(&self, user_id: &str, other_id: &str) -> Result<bool>;

    async fn set_following(&self, user_id: &str, other_id: &str, following: bool) -> Result<()>;

    /// Ids `user_id` follows
    async fn following(&self, user_id: &str) -> Result<Vec<String>>;

    /// Ids following `user_id`
    async fn followers_of(&self, user_id: &str) -> Result<Vec<String>>;
}
