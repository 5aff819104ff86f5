//! Runtime events and the broadcast bus.
//!
//! Supervisors publish lifecycle events ([`Event`]) to a shared [`Bus`];
//! subscribers observe them for logging, metrics, or test assertions.
//! Events carry a globally monotonic sequence number for ordering.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
