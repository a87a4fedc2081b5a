use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::communication::messages::TrafficEvent;

const SUBSCRIBER_BUFFER: usize = 32;

/// Fan-out of controller events to status subscribers. Delivery is
/// best-effort: a subscriber whose channel is closed or full is dropped
/// from the set rather than retried, so one slow consumer cannot stall
/// the push loop.
#[derive(Debug, Default)]
pub struct StatusBroadcaster {
    subscribers: Mutex<HashMap<Uuid, mpsc::Sender<TrafficEvent>>>,
}

impl StatusBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> (Uuid, mpsc::Receiver<TrafficEvent>) {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_BUFFER);
        let id = Uuid::new_v4();
        let total = {
            let mut subscribers = self.subscribers.lock().unwrap();
            subscribers.insert(id, sender);
            subscribers.len()
        };
        log::info!("subscriber {} connected, total: {}", id, total);
        (id, receiver)
    }

    pub fn unsubscribe(&self, id: Uuid) {
        let total = {
            let mut subscribers = self.subscribers.lock().unwrap();
            subscribers.remove(&id);
            subscribers.len()
        };
        log::info!("subscriber {} disconnected, total: {}", id, total);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }

    /// Snapshot-then-notify: the subscriber set is copied before
    /// delivery, failures are collected, and removals are reconciled
    /// afterwards. Never mutates the set while iterating it.
    pub fn broadcast(&self, event: &TrafficEvent) {
        let targets: Vec<(Uuid, mpsc::Sender<TrafficEvent>)> = {
            let subscribers = self.subscribers.lock().unwrap();
            subscribers
                .iter()
                .map(|(id, sender)| (*id, sender.clone()))
                .collect()
        };
        let mut failed = Vec::new();
        for (id, sender) in targets {
            if sender.try_send(event.clone()).is_err() {
                log::warn!("failed to deliver to subscriber {}, dropping it", id);
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            let mut subscribers = self.subscribers.lock().unwrap();
            for id in failed {
                subscribers.remove(&id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::messages::TrafficEventKind;
    use crate::models::detection::DetectionReport;
    use crate::models::lane::LaneCounts;

    fn event() -> TrafficEvent {
        TrafficEvent::now(TrafficEventKind::VehicleDetection(DetectionReport::new(
            LaneCounts::new(1, 0, 0, 0),
            false,
        )))
    }

    #[tokio::test]
    async fn delivers_to_every_subscriber() {
        let broadcaster = StatusBroadcaster::new();
        let (_, mut rx_a) = broadcaster.subscribe();
        let (_, mut rx_b) = broadcaster.subscribe();
        broadcaster.broadcast(&event());
        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.recv().await.is_some());
    }

    #[tokio::test]
    async fn drops_closed_subscribers_on_failure() {
        let broadcaster = StatusBroadcaster::new();
        let (_, rx_dead) = broadcaster.subscribe();
        let (_, mut rx_live) = broadcaster.subscribe();
        drop(rx_dead);
        broadcaster.broadcast(&event());
        assert_eq!(broadcaster.subscriber_count(), 1);
        assert!(rx_live.recv().await.is_some());
    }

    #[tokio::test]
    async fn unsubscribe_removes_subscriber() {
        let broadcaster = StatusBroadcaster::new();
        let (id, _rx) = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);
        broadcaster.unsubscribe(id);
        assert_eq!(broadcaster.subscriber_count(), 0);
    }
}
