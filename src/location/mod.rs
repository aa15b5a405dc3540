pub mod events;
pub mod provider;
pub mod tracker;

// Re-export the essential types
pub use events::{AuthorizationStatus, LocationEvent};
pub use provider::ScriptedLocationProvider;
pub use tracker::{LocationTracker, TrackerAction, TrackingState};
