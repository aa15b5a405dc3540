//! Prelude module for common postmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use postmap::prelude::*;`

pub use crate::core::{
    clamp::RegionPolicy,
    config::{GeofenceConfig, GeofenceProfile, NearbyMapOptions, RefreshConfig, TrackingConfig},
    controller::{Command, NearbyMapController, NearbyMapHandle},
    geo::{bearing, destination, LatLng, LatLngBounds},
    state::{MapState, StateEvent},
    viewport::{Region, Span},
};

pub use crate::location::{
    AuthorizationStatus, LocationEvent, LocationTracker, ScriptedLocationProvider, TrackingState,
};

pub use crate::nearby::{NearbyItem, RandomNearbySource, RefreshSequencer};

pub use crate::social::{
    decode_postcards, AppUser, MemoryStore, Postcard, PostcardCollector, ProfileSummary,
    StaticSession, UserService,
};

pub use crate::traits::{DocumentStore, LocationProvider, NearbySource, SessionProvider};

pub use crate::runtime::{runtime, spawn, AsyncHandle, AsyncSpawner};

pub use crate::{Error as PostmapError, Result};

pub use std::sync::Arc;
