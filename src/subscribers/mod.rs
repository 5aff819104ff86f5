//! Event subscribers.
//!
//! Implement [`Subscriber`] and attach it with
//! [`Runtime::attach`](crate::Runtime::attach) to observe supervision
//! events (logging, metrics, test assertions).
//!
//! ```text
//! Supervisor ── publish(Event) ──► Bus ──► listener task ──► Subscriber::handle(&Event)
//! ```

mod subscriber;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscriber;
