//! Supervision lifecycle events.
//!
//! [`EventKind`] classifies what happened; [`Event`] carries the metadata
//! (which child, why, when). Events are the crate's observability surface:
//! the control loop publishes them instead of writing to a logger directly,
//! and subscribers decide what to do with them.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! observed out of order across receivers.
//!
//! ## Example
//! ```
//! use actorvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ChildFailed)
//!     .with_child("worker")
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::ChildFailed);
//! assert_eq!(ev.child.as_deref(), Some("worker"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervision events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A child instance was spawned (initial start, dynamic add, or restart).
    ///
    /// Sets:
    /// - `child`: child name
    ChildStarted,

    /// A child terminated with a `Normal` cause.
    ///
    /// Sets:
    /// - `child`: child name
    ChildStopped,

    /// A child terminated with a `Failure` cause, or a respawn attempt
    /// failed.
    ///
    /// Sets:
    /// - `child`: child name
    /// - `reason`: failure message
    ChildFailed,

    /// A child entry was removed from the supervisor's table (no restart).
    ///
    /// Sets:
    /// - `child`: child name
    ChildRemoved,

    /// A child did not stop within its shutdown deadline and was killed.
    ///
    /// Sets:
    /// - `child`: child name
    ShutdownTimeout,

    /// Restart intensity was exceeded; the supervisor is escalating.
    ///
    /// Sets:
    /// - `child`: name of the child whose failure tripped the limit
    IntensityExceeded,

    /// The supervisor received a shutdown request.
    ShutdownRequested,

    /// The supervisor finished stopping its children and is terminating
    /// normally.
    SupervisorStopped,
}

/// Supervision event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the child, if applicable.
    pub child: Option<Arc<str>>,
    /// Human-readable reason (failure messages, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            child: None,
            reason: None,
        }
    }

    /// Attaches a child name.
    #[inline]
    pub fn with_child(mut self, child: impl Into<Arc<str>>) -> Self {
        self.child = Some(child.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::ChildStarted);
        let b = Event::new(EventKind::ChildStopped);
        assert!(b.seq > a.seq);
    }
}
