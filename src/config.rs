//! Global runtime configuration.
//!
//! [`RuntimeConfig`] controls the actor runtime: how many actors may be
//! live at once and how large the event bus ring buffer is. Per-child
//! supervision knobs (restart limits, shutdown deadlines) live on
//! [`ChildSpec`](crate::ChildSpec), not here.
//!
//! # Example
//! ```
//! use actorvisor::RuntimeConfig;
//!
//! let mut cfg = RuntimeConfig::default();
//! cfg.max_actors = 64;
//!
//! assert_eq!(cfg.max_actors, 64);
//! ```

/// Configuration for [`Runtime`](crate::Runtime).
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Maximum number of live actors (0 = unlimited).
    ///
    /// When the limit is reached, `Runtime::spawn` fails with
    /// [`SpawnError::CapacityExhausted`](crate::SpawnError::CapacityExhausted).
    pub max_actors: usize,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for RuntimeConfig {
    /// Provides a default configuration:
    /// - `max_actors = 0` (unlimited)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            max_actors: 0,
            bus_capacity: 1024,
        }
    }
}
