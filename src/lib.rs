//! # postmap
//!
//! The map core of a postcard-collecting app: a geofenced viewport that
//! follows the user's live location, and a refreshed set of collectible
//! postcards around each fix.
//!
//! All published map state is owned by a single coordination task (see
//! [`core::controller`]); location providers, gestures and refresh
//! completions reach it through one command channel.

pub mod core;
pub mod location;
pub mod nearby;
pub mod prelude;
pub mod runtime;
pub mod social;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    clamp::RegionPolicy,
    config::{GeofenceProfile, NearbyMapOptions},
    controller::{NearbyMapController, NearbyMapHandle},
    geo::{bearing, destination, LatLng, LatLngBounds},
    state::{MapState, StateEvent},
    viewport::{Region, Span},
};

pub use location::{
    events::{AuthorizationStatus, LocationEvent},
    tracker::{LocationTracker, TrackingState},
};

pub use nearby::{item::NearbyItem, source::RandomNearbySource};

pub use social::{
    collector::PostcardCollector,
    records::{AppUser, Postcard},
    service::UserService,
};

pub use traits::{DocumentStore, LocationProvider, NearbySource, SessionProvider};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, PostmapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum PostmapError {
    #[error("Location access was denied")]
    AuthorizationDenied,

    #[error("Location services are disabled")]
    LocationServicesDisabled,

    #[error("Failed to get location: {0}")]
    LocationUnavailable(String),

    #[error("Failed to refresh nearby postcards: {0}")]
    RefreshFailed(String),

    #[error("User not logged in")]
    NotLoggedIn,

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Coordination channel is closed")]
    ChannelClosed,
}

impl PostmapError {
    /// Text shown in the map's single message slot
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Error type alias for convenience
pub type Error = PostmapError;

/// Installs `env_logger`, defaulting to `info` when `RUST_LOG` is unset
#[cfg(feature = "debug")]
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
