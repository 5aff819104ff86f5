//! Broadcast bus for supervision events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]: publishers
//! (supervisors) never block, and each subscriber gets an independent
//! receiver that only observes events sent after it subscribed.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` calls `broadcast::Sender::send`
//!   and returns immediately.
//! - **Bounded capacity**: one ring buffer stores recent events for all
//!   receivers; slow receivers observe `RecvError::Lagged(n)` and skip the
//!   `n` oldest items.
//! - **No persistence**: events published with no active receivers are
//!   dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for supervision events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender); publish is
/// fire-and-forget with no delivery guarantees.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no receivers the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new independent receiver observing subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
