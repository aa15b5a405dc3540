//! Published map state
//!
//! The view layer never binds to mutable fields. It reads cloned
//! [`MapState`] snapshots or subscribes to [`StateEvent`]s. Writes go
//! through [`StateContainer::update`], which only the coordination context
//! calls.

use std::sync::{Arc, Mutex, RwLock};

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::core::geo::LatLng;
use crate::core::viewport::Region;
use crate::location::tracker::TrackingState;
use crate::nearby::item::NearbyItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapState {
    pub region: Region,
    pub user_location: Option<LatLng>,
    pub nearby: Vec<NearbyItem>,
    /// The single user-visible message slot
    pub message: Option<String>,
    pub tracking: TrackingState,
}

impl MapState {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            user_location: None,
            nearby: Vec::new(),
            message: None,
            tracking: TrackingState::Unauthorized,
        }
    }

    /// Applies a change and reports it as an event when it is one
    fn apply(&mut self, change: StateChange) -> Option<StateEvent> {
        match change {
            StateChange::Region(region) => {
                if self.region == region {
                    return None;
                }
                self.region = region;
                Some(StateEvent::RegionChanged(region))
            }
            StateChange::UserLocation(location) => {
                self.user_location = Some(location);
                Some(StateEvent::UserLocationChanged(location))
            }
            StateChange::Nearby(items) => {
                self.nearby = items;
                Some(StateEvent::NearbyChanged(self.nearby.clone()))
            }
            StateChange::Message(message) => {
                if self.message == message {
                    return None;
                }
                self.message = message.clone();
                Some(StateEvent::MessageChanged(message))
            }
            StateChange::Tracking(tracking) => {
                if self.tracking == tracking {
                    return None;
                }
                self.tracking = tracking;
                Some(StateEvent::TrackingChanged(tracking))
            }
        }
    }
}

impl Default for MapState {
    fn default() -> Self {
        Self::new(Region::default())
    }
}

/// A single mutation of the published state
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    Region(Region),
    UserLocation(LatLng),
    Nearby(Vec<NearbyItem>),
    Message(Option<String>),
    Tracking(TrackingState),
}

/// Notifications sent to subscribers after a change was applied
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    RegionChanged(Region),
    UserLocationChanged(LatLng),
    NearbyChanged(Vec<NearbyItem>),
    MessageChanged(Option<String>),
    TrackingChanged(TrackingState),
}

#[derive(Debug)]
pub struct StateContainer {
    state: RwLock<MapState>,
    subscribers: Mutex<Vec<Sender<StateEvent>>>,
}

impl StateContainer {
    pub fn new(initial: MapState) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(initial),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> MapState {
        match self.state.read() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Receives every event published from now on
    pub fn subscribe(&self) -> Receiver<StateEvent> {
        let (tx, rx) = unbounded();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// The only write path. Applies the changes in order, then notifies
    /// subscribers of what actually changed.
    pub(crate) fn update(&self, changes: Vec<StateChange>) -> Vec<StateEvent> {
        let events: Vec<StateEvent> = {
            let mut state = match self.state.write() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            changes
                .into_iter()
                .filter_map(|change| state.apply(change))
                .collect()
        };

        if !events.is_empty() {
            self.broadcast(&events);
        }
        events
    }

    fn broadcast(&self, events: &[StateEvent]) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            // Receivers that hung up are pruned on the way
            subscribers.retain(|tx| events.iter().all(|event| tx.send(event.clone()).is_ok()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_notifies_subscribers() {
        let container = StateContainer::new(MapState::default());
        let rx = container.subscribe();

        let region = Region::around(LatLng::new(1.0, 2.0), 0.05);
        let events = container.update(vec![
            StateChange::Region(region),
            StateChange::Message(Some("hello".into())),
        ]);

        assert_eq!(events.len(), 2);
        assert_eq!(rx.try_recv().unwrap(), StateEvent::RegionChanged(region));
        assert_eq!(
            rx.try_recv().unwrap(),
            StateEvent::MessageChanged(Some("hello".into()))
        );
        assert_eq!(container.snapshot().region, region);
    }

    #[test]
    fn test_unchanged_values_are_not_reported() {
        let container = StateContainer::new(MapState::default());
        let rx = container.subscribe();

        let events = container.update(vec![
            StateChange::Region(Region::default()),
            StateChange::Message(None),
            StateChange::Tracking(TrackingState::Unauthorized),
        ]);
        assert!(events.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let container = StateContainer::new(MapState::default());
        let kept = container.subscribe();
        drop(container.subscribe());
        assert_eq!(container.subscriber_count(), 2);

        container.update(vec![StateChange::Tracking(TrackingState::AwaitingFix)]);
        assert_eq!(container.subscriber_count(), 1);
        assert_eq!(
            kept.try_recv().unwrap(),
            StateEvent::TrackingChanged(TrackingState::AwaitingFix)
        );
    }

    #[test]
    fn test_snapshot_is_detached() {
        let container = StateContainer::new(MapState::default());
        let before = container.snapshot();
        container.update(vec![StateChange::UserLocation(LatLng::new(5.0, 5.0))]);

        assert_eq!(before.user_location, None);
        assert_eq!(container.snapshot().user_location, Some(LatLng::new(5.0, 5.0)));
    }
}
