//! The coordination context for the nearby map.
//!
//! [`NearbyMapController`] is the only writer of published map state. The
//! location provider, the view layer and spawned refreshes all talk to it
//! through [`Command`]s sent over one channel, so every mutation happens on
//! this single task without further locking.

use std::sync::Arc;

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;

use crate::core::config::{GeofenceProfile, NearbyMapOptions};
use crate::core::geo::LatLng;
use crate::core::state::{MapState, StateChange, StateContainer, StateEvent};
use crate::core::viewport::Region;
use crate::location::events::LocationEvent;
use crate::location::tracker::{LocationTracker, TrackerAction};
use crate::nearby::item::NearbyItem;
use crate::nearby::refresh::RefreshSequencer;
use crate::traits::{LocationProvider, NearbySource};
use crate::{runtime, PostmapError, Result};

/// Messages consumed by the coordination context
#[derive(Debug)]
pub enum Command {
    /// Pushed by the location provider
    Location(LocationEvent),
    /// Pan/zoom gesture from the view layer
    ProposeRegion(Region),
    /// The map appeared; start (or ask for) location updates
    StartUpdates,
    /// A spawned refresh finished
    RefreshCompleted {
        sequence: u64,
        fix: LatLng,
        result: Result<Vec<NearbyItem>>,
    },
    Shutdown,
}

/// Cloneable entry point into a running controller
#[derive(Clone)]
pub struct NearbyMapHandle {
    sender: UnboundedSender<Command>,
    state: Arc<StateContainer>,
}

impl NearbyMapHandle {
    pub fn send(&self, command: Command) -> Result<()> {
        self.sender
            .unbounded_send(command)
            .map_err(|_| PostmapError::ChannelClosed)
    }

    pub fn send_location_event(&self, event: LocationEvent) -> Result<()> {
        self.send(Command::Location(event))
    }

    pub fn propose_region(&self, region: Region) -> Result<()> {
        self.send(Command::ProposeRegion(region))
    }

    pub fn start_location_updates(&self) -> Result<()> {
        self.send(Command::StartUpdates)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    pub fn snapshot(&self) -> MapState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> crossbeam_channel::Receiver<StateEvent> {
        self.state.subscribe()
    }
}

impl std::fmt::Debug for NearbyMapHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearbyMapHandle")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

pub struct NearbyMapController {
    options: NearbyMapOptions,
    tracker: LocationTracker,
    provider: Arc<dyn LocationProvider>,
    source: Arc<dyn NearbySource>,
    state: Arc<StateContainer>,
    sequencer: RefreshSequencer,
    sender: UnboundedSender<Command>,
    commands: UnboundedReceiver<Command>,
}

impl NearbyMapController {
    pub fn new(
        options: NearbyMapOptions,
        provider: Arc<dyn LocationProvider>,
        source: Arc<dyn NearbySource>,
    ) -> Result<Self> {
        options.validate()?;

        let policy = options.geofence.policy();
        let tracker = LocationTracker::new(policy, &options.tracking);
        let initial = policy.clamp(&options.tracking.initial_region(), None);
        let state = StateContainer::new(MapState::new(initial));
        let (sender, commands) = unbounded();

        Ok(Self {
            options,
            tracker,
            provider,
            source,
            state,
            sequencer: RefreshSequencer::new(),
            sender,
            commands,
        })
    }

    pub fn with_profile(
        profile: GeofenceProfile,
        provider: Arc<dyn LocationProvider>,
        source: Arc<dyn NearbySource>,
    ) -> Result<Self> {
        Self::new(profile.resolve(), provider, source)
    }

    pub fn handle(&self) -> NearbyMapHandle {
        NearbyMapHandle {
            sender: self.sender.clone(),
            state: self.state.clone(),
        }
    }

    pub fn options(&self) -> &NearbyMapOptions {
        &self.options
    }

    pub fn tracker(&self) -> &LocationTracker {
        &self.tracker
    }

    pub fn snapshot(&self) -> MapState {
        self.state.snapshot()
    }

    /// Processes commands until `Shutdown`. The controller keeps a sender
    /// for its own refreshes, so dropping every handle does not end the loop.
    pub async fn run(mut self) {
        log::debug!("Nearby map controller running");
        while self.process_next().await {}
        log::debug!("Nearby map controller stopped");
    }

    /// Waits for one command and handles it. Returns false once shut down.
    pub async fn process_next(&mut self) -> bool {
        match self.commands.next().await {
            Some(command) => self.handle_command(command),
            None => false,
        }
    }

    /// Handles every command already queued without waiting
    pub fn drain(&mut self) -> bool {
        while let Ok(Some(command)) = self.commands.try_next() {
            if !self.handle_command(command) {
                return false;
            }
        }
        true
    }

    /// Returns false when the command was `Shutdown`
    pub fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Location(event) => self.on_location_event(event),
            Command::ProposeRegion(region) => self.propose_region(region),
            Command::StartUpdates => self.start_location_updates(),
            Command::RefreshCompleted {
                sequence,
                fix,
                result,
            } => self.on_refresh_completed(sequence, fix, result),
            Command::Shutdown => {
                self.provider.stop_updates();
                return false;
            }
        }
        true
    }

    fn start_location_updates(&mut self) {
        log::debug!("Attempting to start location updates");
        let result = self.tracker.start(self.provider.as_ref());
        let mut changes = vec![StateChange::Tracking(self.tracker.state())];
        if let Err(e) = result {
            changes.push(StateChange::Message(Some(e.user_message())));
        }
        self.state.update(changes);
    }

    fn on_location_event(&mut self, event: LocationEvent) {
        let action = self.tracker.handle_event(event, self.provider.as_ref());
        let tracking = StateChange::Tracking(self.tracker.state());

        match action {
            TrackerAction::None | TrackerAction::Started => {
                self.state.update(vec![tracking]);
            }
            TrackerAction::Denied => {
                self.state.update(vec![
                    tracking,
                    StateChange::Message(Some(PostmapError::AuthorizationDenied.user_message())),
                ]);
            }
            TrackerAction::Failed(e) => {
                self.state
                    .update(vec![tracking, StateChange::Message(Some(e.user_message()))]);
            }
            TrackerAction::Fix { fix, region } => {
                self.state.update(vec![
                    tracking,
                    StateChange::UserLocation(fix),
                    StateChange::Region(region),
                    StateChange::Message(None),
                ]);
                self.dispatch_refresh(fix);
            }
        }
    }

    fn propose_region(&mut self, proposed: Region) {
        let region = self.tracker.clamp(&proposed);
        if region != proposed {
            log::debug!("Clamped proposed region {:?} to {:?}", proposed, region);
        }
        self.state.update(vec![StateChange::Region(region)]);
    }

    /// Starts a refresh for `fix` without waiting on it
    fn dispatch_refresh(&mut self, fix: LatLng) {
        let sequence = self.sequencer.next();
        let source = self.source.clone();
        let sender = self.sender.clone();
        log::debug!("Fetching nearby postcards #{} around {:?}", sequence, fix);

        runtime::spawn(async move {
            let result = source.nearby(fix).await;
            let completed = Command::RefreshCompleted {
                sequence,
                fix,
                result,
            };
            if sender.unbounded_send(completed).is_err() {
                log::debug!("Controller gone, dropping refresh #{}", sequence);
            }
        });
    }

    fn on_refresh_completed(&mut self, sequence: u64, fix: LatLng, result: Result<Vec<NearbyItem>>) {
        if !self.sequencer.accept(sequence) {
            log::warn!(
                "Dropping stale nearby refresh #{} for {:?} (latest is #{})",
                sequence,
                fix,
                self.sequencer.latest_issued()
            );
            return;
        }

        match result {
            Ok(mut items) => {
                items.truncate(self.options.refresh.max_items);
                log::debug!("Updated nearby postcards. Count: {}", items.len());
                self.state.update(vec![StateChange::Nearby(items)]);
            }
            Err(e) => {
                let e = match e {
                    PostmapError::RefreshFailed(_) => e,
                    other => PostmapError::RefreshFailed(other.to_string()),
                };
                log::warn!("{}", e);
                self.state.update(vec![
                    StateChange::Nearby(Vec::new()),
                    StateChange::Message(Some(e.user_message())),
                ]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::viewport::Span;
    use crate::location::events::AuthorizationStatus;
    use crate::location::provider::ScriptedLocationProvider;
    use crate::location::tracker::TrackingState;
    use crate::nearby::source::RandomNearbySource;

    fn controller(status: AuthorizationStatus) -> (NearbyMapController, Arc<ScriptedLocationProvider>) {
        let provider = Arc::new(ScriptedLocationProvider::new(status));
        let source = Arc::new(RandomNearbySource::seeded(Default::default(), 9));
        let controller =
            NearbyMapController::new(NearbyMapOptions::default(), provider.clone(), source).unwrap();
        provider.attach(controller.handle());
        (controller, provider)
    }

    fn item_at(id: &str, coordinate: LatLng) -> NearbyItem {
        NearbyItem::new(id, "Nearby Location", "https://example.com/postcard.jpg", coordinate)
    }

    #[test]
    fn test_initial_state() {
        let (controller, _) = controller(AuthorizationStatus::NotDetermined);
        let state = controller.snapshot();

        assert_eq!(state.region, Region::default());
        assert_eq!(state.tracking, TrackingState::Unauthorized);
        assert!(state.nearby.is_empty());
        assert!(state.message.is_none());
    }

    #[test]
    fn test_gesture_is_clamped_without_fix() {
        let (mut controller, _) = controller(AuthorizationStatus::NotDetermined);
        let far = Region::new(LatLng::new(51.5, -0.12), Span::new(0.3, 0.005));

        controller.handle_command(Command::ProposeRegion(far));
        let region = controller.snapshot().region;
        // No fix yet: only zoom is limited
        assert_eq!(region.center, far.center);
        assert_eq!(region.span, Span::new(0.2, 0.01));
    }

    #[test]
    fn test_denied_authorization_leaves_map_untouched() {
        let (mut controller, provider) = controller(AuthorizationStatus::NotDetermined);
        let before = controller.snapshot();

        controller.handle_command(Command::Location(LocationEvent::AuthorizationChanged(
            AuthorizationStatus::Denied,
        )));
        controller.handle_command(Command::Location(LocationEvent::fix(1.0, 1.0)));

        let after = controller.snapshot();
        assert_eq!(after.tracking, TrackingState::Unauthorized);
        assert_eq!(after.region, before.region);
        assert_eq!(after.nearby, before.nearby);
        assert_eq!(after.user_location, None);
        assert_eq!(after.message.as_deref(), Some("Location access was denied"));
        assert_eq!(provider.start_calls(), 0);
    }

    #[test]
    fn test_authorization_reset_publishes_unauthorized() {
        let (mut controller, provider) = controller(AuthorizationStatus::AuthorizedWhenInUse);
        controller.handle_command(Command::StartUpdates);
        controller.handle_command(Command::Location(LocationEvent::fix(1.0, 1.0)));
        assert_eq!(controller.snapshot().tracking, TrackingState::Tracking);

        controller.handle_command(Command::Location(LocationEvent::AuthorizationChanged(
            AuthorizationStatus::NotDetermined,
        )));
        let state = controller.snapshot();
        assert_eq!(state.tracking, TrackingState::Unauthorized);
        assert_eq!(state.message, None);
        assert_eq!(provider.stop_calls(), 1);
    }

    #[test]
    fn test_start_with_services_disabled_reports_message() {
        let provider = Arc::new(
            ScriptedLocationProvider::new(AuthorizationStatus::AuthorizedAlways).services_disabled(),
        );
        let mut controller = NearbyMapController::new(
            NearbyMapOptions::default(),
            provider,
            Arc::new(RandomNearbySource::default()),
        )
        .unwrap();

        controller.handle_command(Command::StartUpdates);
        let state = controller.snapshot();
        assert_eq!(state.tracking, TrackingState::Unauthorized);
        assert_eq!(state.message.as_deref(), Some("Location services are disabled"));
    }

    #[test]
    fn test_stale_refresh_is_dropped() {
        let (mut controller, _) = controller(AuthorizationStatus::AuthorizedWhenInUse);
        let a = LatLng::new(37.0, -122.0);
        let b = LatLng::new(38.0, -121.0);
        let first = controller.sequencer.next();
        let second = controller.sequencer.next();

        controller.handle_command(Command::RefreshCompleted {
            sequence: second,
            fix: b,
            result: Ok(vec![item_at("b", b)]),
        });
        controller.handle_command(Command::RefreshCompleted {
            sequence: first,
            fix: a,
            result: Ok(vec![item_at("a", a)]),
        });

        let nearby = controller.snapshot().nearby;
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].id, "b");
    }

    #[test]
    fn test_failed_refresh_publishes_empty_set() {
        let (mut controller, _) = controller(AuthorizationStatus::AuthorizedWhenInUse);
        let p = LatLng::new(37.0, -122.0);

        let seq = controller.sequencer.next();
        controller.handle_command(Command::RefreshCompleted {
            sequence: seq,
            fix: p,
            result: Ok(vec![item_at("x", p)]),
        });
        let seq = controller.sequencer.next();
        controller.handle_command(Command::RefreshCompleted {
            sequence: seq,
            fix: p,
            result: Err(PostmapError::Store("backend offline".into())),
        });

        let state = controller.snapshot();
        assert!(state.nearby.is_empty());
        assert_eq!(
            state.message.as_deref(),
            Some("Failed to refresh nearby postcards: Store error: backend offline")
        );
    }

    #[test]
    fn test_oversized_result_is_truncated() {
        let (mut controller, _) = controller(AuthorizationStatus::AuthorizedWhenInUse);
        let p = LatLng::new(0.0, 0.0);
        let items = (0..200).map(|i| item_at(&i.to_string(), p)).collect();

        let seq = controller.sequencer.next();
        controller.handle_command(Command::RefreshCompleted {
            sequence: seq,
            fix: p,
            result: Ok(items),
        });
        assert_eq!(controller.snapshot().nearby.len(), 50);
    }

    #[test]
    fn test_shutdown_stops_provider() {
        let (mut controller, provider) = controller(AuthorizationStatus::AuthorizedWhenInUse);
        assert!(!controller.handle_command(Command::Shutdown));
        assert_eq!(provider.stop_calls(), 1);
    }
}
