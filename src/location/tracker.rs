//! Location tracking state machine
//!
//! ```text
//! Unauthorized --(authorized)--> AwaitingFix --(fix)--> Tracking --(fix)--> Tracking
//!      ^                                                    |
//!      +-------------------(denied / restricted)------------+
//! ```
//!
//! The tracker owns the last known user location and turns every fix into
//! a clamped default region. Publishing and refreshing are left to the
//! coordination context.

use crate::core::clamp::RegionPolicy;
use crate::core::config::TrackingConfig;
use crate::core::geo::LatLng;
use crate::core::viewport::Region;
use crate::location::events::{AuthorizationStatus, LocationEvent};
use crate::traits::LocationProvider;
use crate::{PostmapError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingState {
    Unauthorized,
    AwaitingFix,
    Tracking,
}

impl Default for TrackingState {
    fn default() -> Self {
        Self::Unauthorized
    }
}

/// What the coordination context has to do after an event
#[derive(Debug)]
pub enum TrackerAction {
    /// Nothing changed
    None,
    /// Access granted and the provider was started
    Started,
    /// Access refused or revoked
    Denied,
    /// New fix: publish `region` and refresh around `fix`
    Fix { fix: LatLng, region: Region },
    /// Provider failure to surface to the user
    Failed(PostmapError),
}

#[derive(Debug, Clone)]
pub struct LocationTracker {
    state: TrackingState,
    user_location: Option<LatLng>,
    policy: RegionPolicy,
    fix_span: f64,
    distance_filter: f64,
}

impl LocationTracker {
    pub fn new(policy: RegionPolicy, tracking: &TrackingConfig) -> Self {
        Self {
            state: TrackingState::Unauthorized,
            user_location: None,
            policy,
            fix_span: tracking.fix_span,
            distance_filter: tracking.distance_filter,
        }
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn user_location(&self) -> Option<LatLng> {
        self.user_location
    }

    pub fn policy(&self) -> &RegionPolicy {
        &self.policy
    }

    /// Clamps a region against the current user location
    pub fn clamp(&self, proposed: &Region) -> Region {
        self.policy.clamp(proposed, self.user_location)
    }

    /// Entry point used when the map appears.
    ///
    /// Starts the provider right away when access is already granted, asks
    /// for it when undetermined, and reports why nothing can start otherwise.
    pub fn start(&mut self, provider: &dyn LocationProvider) -> Result<()> {
        if !provider.services_enabled() {
            log::warn!("Location services are not enabled");
            return Err(PostmapError::LocationServicesDisabled);
        }

        match provider.authorization_status() {
            AuthorizationStatus::NotDetermined => {
                log::debug!("Requesting location authorization");
                provider.request_authorization();
                Ok(())
            }
            status if status.is_authorized() => {
                self.begin(provider);
                Ok(())
            }
            status => {
                log::warn!("Location services are not authorized ({:?})", status);
                Err(PostmapError::AuthorizationDenied)
            }
        }
    }

    pub fn handle_event(
        &mut self,
        event: LocationEvent,
        provider: &dyn LocationProvider,
    ) -> TrackerAction {
        match event {
            LocationEvent::AuthorizationChanged(status) => {
                self.on_authorization_changed(status, provider)
            }
            LocationEvent::LocationUpdated(fixes) => match fixes.last() {
                Some(fix) => self.on_fix(*fix),
                None => TrackerAction::None,
            },
            LocationEvent::LocationFailed(reason) => {
                log::warn!("Location provider failed: {}", reason);
                TrackerAction::Failed(PostmapError::LocationUnavailable(reason))
            }
        }
    }

    fn on_authorization_changed(
        &mut self,
        status: AuthorizationStatus,
        provider: &dyn LocationProvider,
    ) -> TrackerAction {
        log::debug!("Location authorization changed: {:?}", status);

        if status.is_authorized() {
            return if self.begin(provider) {
                TrackerAction::Started
            } else {
                TrackerAction::None
            };
        }

        if self.state != TrackingState::Unauthorized {
            provider.stop_updates();
            self.state = TrackingState::Unauthorized;
        }

        // A reset to NotDetermined leaves tracking without a message
        if status.is_refused() {
            TrackerAction::Denied
        } else {
            TrackerAction::None
        }
    }

    /// Returns true when this call moved the tracker out of `Unauthorized`
    fn begin(&mut self, provider: &dyn LocationProvider) -> bool {
        if self.state != TrackingState::Unauthorized {
            return false;
        }
        provider.set_distance_filter(self.distance_filter);
        provider.start_updates();
        self.state = TrackingState::AwaitingFix;
        log::info!("Location updates started");
        true
    }

    fn on_fix(&mut self, fix: LatLng) -> TrackerAction {
        if self.state == TrackingState::Unauthorized {
            log::debug!("Ignoring fix received while unauthorized");
            return TrackerAction::None;
        }
        if !fix.is_valid() {
            log::warn!("Ignoring out-of-range fix {:?}", fix);
            return TrackerAction::None;
        }

        self.user_location = Some(fix);
        self.state = TrackingState::Tracking;

        let region = self.clamp(&Region::around(fix, self.fix_span));
        TrackerAction::Fix { fix, region }
    }
}

impl Default for LocationTracker {
    fn default() -> Self {
        Self::new(RegionPolicy::default(), &TrackingConfig::default())
    }
}
