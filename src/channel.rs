//! Single-slot, latest-value publish/subscribe channel for controller state.
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::drivers::dualshock4::state::DualShockState;

/// A single-slot broadcast channel holding the most recently published
/// [DualShockState]. Every publish replaces the slot and is delivered to all
/// subscribers registered at that moment, in registration order. A subscriber
/// that registers late is handed the current snapshot first.
#[derive(Debug, Clone, Default)]
pub struct StateChannel {
    inner: Arc<Mutex<ChannelState>>,
}

#[derive(Debug, Default)]
struct ChannelState {
    current: Option<DualShockState>,
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

#[derive(Debug)]
struct Subscriber {
    id: u64,
    tx: mpsc::UnboundedSender<DualShockState>,
}

impl StateChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot and notify every registered subscriber.
    /// Subscribers whose receiving end has been dropped are pruned.
    pub fn publish(&self, state: DualShockState) {
        let mut inner = self.inner.lock().unwrap();
        inner.current = Some(state);
        inner.subscribers.retain(|sub| sub.tx.send(state).is_ok());
    }

    /// The most recently published snapshot, or [None] before the first
    /// report has arrived.
    pub fn latest(&self) -> Option<DualShockState> {
        self.inner.lock().unwrap().current
    }

    /// Register a new subscriber. If a snapshot has already been published,
    /// the subscription starts with the latest value queued.
    pub fn subscribe(&self) -> Subscription {
        let mut inner = self.inner.lock().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(current) = inner.current {
            // Replay the last snapshot to the late subscriber
            let _ = tx.send(current);
        }
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push(Subscriber { id, tx });

        Subscription {
            id,
            rx,
            channel: self.inner.clone(),
        }
    }
}

/// Handle to a [StateChannel] subscription. Snapshots are received in publish
/// order with no coalescing. Dropping the subscription deregisters it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<DualShockState>,
    channel: Arc<Mutex<ChannelState>>,
}

impl Subscription {
    /// Wait for the next published snapshot. Returns [None] once the channel
    /// has been dropped and all queued snapshots were consumed.
    pub async fn recv(&mut self) -> Option<DualShockState> {
        self.rx.recv().await
    }

    /// Take the next queued snapshot without waiting, if one is available.
    pub fn try_recv(&mut self) -> Option<DualShockState> {
        self.rx.try_recv().ok()
    }

    /// Deregister this subscriber.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.channel.lock() {
            inner.subscribers.retain(|sub| sub.id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(battery: u8) -> DualShockState {
        DualShockState {
            battery,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_delivers_publishes_in_order() {
        let channel = StateChannel::new();
        let mut sub = channel.subscribe();

        channel.publish(snapshot(1));
        channel.publish(snapshot(2));

        assert_eq!(sub.recv().await.unwrap().battery, 1);
        assert_eq!(sub.recv().await.unwrap().battery, 2);
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_late_subscriber_replays_only_latest() {
        let channel = StateChannel::new();
        channel.publish(snapshot(1));
        channel.publish(snapshot(2));

        let mut sub = channel.subscribe();
        assert_eq!(sub.recv().await.unwrap().battery, 2);
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_every_publish() {
        let channel = StateChannel::new();
        let mut first = channel.subscribe();
        let mut second = channel.subscribe();

        channel.publish(snapshot(7));

        assert_eq!(first.recv().await.unwrap().battery, 7);
        assert_eq!(second.recv().await.unwrap().battery, 7);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let channel = StateChannel::new();
        let sub = channel.subscribe();
        sub.unsubscribe();

        // Publishing must not panic or deliver to the dropped subscriber
        channel.publish(snapshot(3));
        assert_eq!(channel.latest().unwrap().battery, 3);
    }

    #[test]
    fn test_latest_is_empty_before_first_publish() {
        let channel = StateChannel::new();
        assert!(channel.latest().is_none());
    }
}
