use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::core::controller::NearbyMapHandle;
use crate::core::geo::LatLng;
use crate::location::events::{AuthorizationStatus, LocationEvent};
use crate::traits::LocationProvider;

/// A location provider driven by a script instead of hardware.
///
/// Used by the tests and the demo binary. Events are forwarded to the
/// attached map handle; before a handle is attached they are dropped.
/// Fixes closer than the distance filter to the last delivered one are
/// swallowed, like a platform provider would.
pub struct ScriptedLocationProvider {
    enabled: bool,
    status: Mutex<AuthorizationStatus>,
    /// Status granted when authorization is requested
    answer: AuthorizationStatus,
    route: Vec<LatLng>,
    distance_filter: Mutex<f64>,
    last_delivered: Mutex<Option<LatLng>>,
    sink: Mutex<Option<NearbyMapHandle>>,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    authorization_requests: AtomicUsize,
}

impl ScriptedLocationProvider {
    pub fn new(status: AuthorizationStatus) -> Self {
        Self {
            enabled: true,
            status: Mutex::new(status),
            answer: AuthorizationStatus::AuthorizedWhenInUse,
            route: Vec::new(),
            distance_filter: Mutex::new(0.0),
            last_delivered: Mutex::new(None),
            sink: Mutex::new(None),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            authorization_requests: AtomicUsize::new(0),
        }
    }

    /// Location services switched off at the device level
    pub fn services_disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// What the user answers when prompted for access
    pub fn answering(mut self, answer: AuthorizationStatus) -> Self {
        self.answer = answer;
        self
    }

    /// Fixes replayed as soon as updates start
    pub fn with_route(mut self, route: Vec<LatLng>) -> Self {
        self.route = route;
        self
    }

    pub fn attach(&self, handle: NearbyMapHandle) {
        if let Ok(mut sink) = self.sink.lock() {
            *sink = Some(handle);
        }
    }

    pub fn emit(&self, event: LocationEvent) {
        let handle = match self.sink.lock() {
            Ok(sink) => sink.clone(),
            Err(_) => None,
        };
        match handle {
            Some(handle) => {
                if let Err(e) = handle.send_location_event(event) {
                    log::debug!("Dropping scripted location event: {}", e);
                }
            }
            None => log::debug!("No map attached, dropping {:?}", event),
        }
    }

    pub fn push_fix(&self, fix: LatLng) {
        let filter = self.distance_filter.lock().map(|f| *f).unwrap_or(0.0);
        if let Ok(mut last) = self.last_delivered.lock() {
            if let Some(previous) = *last {
                if previous.distance_to(&fix) < filter {
                    log::debug!("Fix {:?} within {} m of the last one, skipped", fix, filter);
                    return;
                }
            }
            *last = Some(fix);
        }
        self.emit(LocationEvent::LocationUpdated(vec![fix]));
    }

    pub fn fail(&self, reason: &str) {
        self.emit(LocationEvent::LocationFailed(reason.to_string()));
    }

    /// Changes the status as if the user flipped it in system settings
    pub fn set_authorization(&self, status: AuthorizationStatus) {
        if let Ok(mut current) = self.status.lock() {
            *current = status;
        }
        self.emit(LocationEvent::AuthorizationChanged(status));
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn authorization_requests(&self) -> usize {
        self.authorization_requests.load(Ordering::SeqCst)
    }
}

impl LocationProvider for ScriptedLocationProvider {
    fn services_enabled(&self) -> bool {
        self.enabled
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        self.status
            .lock()
            .map(|status| *status)
            .unwrap_or(AuthorizationStatus::NotDetermined)
    }

    fn request_authorization(&self) {
        self.authorization_requests.fetch_add(1, Ordering::SeqCst);
        self.set_authorization(self.answer);
    }

    fn set_distance_filter(&self, meters: f64) {
        if let Ok(mut filter) = self.distance_filter.lock() {
            *filter = meters;
        }
    }

    fn start_updates(&self) {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        for fix in &self.route {
            self.push_fix(*fix);
        }
    }

    fn stop_updates(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::NearbyMapOptions;
    use crate::core::controller::{Command, NearbyMapController};
    use crate::nearby::source::RandomNearbySource;
    use std::sync::Arc;

    #[test]
    fn test_authorization_answer_is_forwarded() {
        let provider = Arc::new(
            ScriptedLocationProvider::new(AuthorizationStatus::NotDetermined)
                .answering(AuthorizationStatus::Denied),
        );
        let mut controller = NearbyMapController::new(
            NearbyMapOptions::default(),
            provider.clone(),
            Arc::new(RandomNearbySource::default()),
        )
        .unwrap();
        provider.attach(controller.handle());

        provider.request_authorization();
        assert_eq!(provider.authorization_status(), AuthorizationStatus::Denied);
        assert!(controller.drain());
        assert_eq!(
            controller.snapshot().message.as_deref(),
            Some("Location access was denied")
        );
    }

    #[test]
    fn test_distance_filter_skips_small_moves() {
        let provider = Arc::new(ScriptedLocationProvider::new(
            AuthorizationStatus::AuthorizedWhenInUse,
        ));
        let mut controller = NearbyMapController::new(
            NearbyMapOptions::default(),
            provider.clone(),
            Arc::new(RandomNearbySource::default()),
        )
        .unwrap();
        provider.attach(controller.handle());
        controller.handle_command(Command::StartUpdates);

        let start = LatLng::new(37.7749, -122.4194);
        provider.push_fix(start);
        provider.push_fix(start.destination(200.0, 90.0));
        provider.push_fix(start.destination(800.0, 90.0));
        assert!(controller.drain());

        let fix = controller.snapshot().user_location.unwrap();
        assert!((start.distance_to(&fix) - 800.0).abs() < 1e-3);
    }

    #[test]
    fn test_events_without_map_are_dropped() {
        let provider = ScriptedLocationProvider::new(AuthorizationStatus::AuthorizedAlways)
            .with_route(vec![LatLng::new(1.0, 1.0)]);
        provider.start_updates();
        provider.fail("nobody listening");
        assert_eq!(provider.start_calls(), 1);
    }
}
