//! Child descriptors.
//!
//! A [`ChildSpec`] is the immutable configuration of one child slot: its
//! name, its [`ChildMode`], its restart-intensity limits, its shutdown
//! deadline, and the factory producing fresh instances. Descriptors are
//! supplied at supervisor construction or via
//! [`Supervisor::add_child`](crate::Supervisor::add_child) and never
//! mutate.

use std::time::Duration;

use crate::runtime::FactoryRef;

/// Per-child policy deciding whether a termination cause warrants a
/// restart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildMode {
    /// Always restarted, whatever the termination cause.
    Permanent,
    /// Restarted only after abnormal (`Failure`) termination.
    Transient,
    /// Never restarted; the entry is removed on any termination.
    Temporary,
}

impl ChildMode {
    /// Restart classification for a termination cause.
    pub(crate) fn wants_restart(self, abnormal: bool) -> bool {
        match self {
            ChildMode::Permanent => true,
            ChildMode::Transient => abnormal,
            ChildMode::Temporary => false,
        }
    }
}

/// Immutable configuration for one child slot.
///
/// ## Example
/// ```no_run
/// use std::time::Duration;
/// use actorvisor::{exit_value, factory_fn, ChildMode, ChildSpec};
///
/// let factory = factory_fn(|_mailbox| async { Ok(exit_value(())) });
///
/// let spec = ChildSpec::new("worker", ChildMode::Permanent, factory)
///     .with_max_restarts(3)
///     .with_restart_window(Duration::from_secs(1))
///     .with_shutdown_deadline(Duration::from_secs(3));
///
/// assert_eq!(spec.name(), "worker");
/// assert_eq!(spec.max_restarts(), 3);
/// ```
#[derive(Clone)]
pub struct ChildSpec {
    name: String,
    mode: ChildMode,
    max_restarts: u32,
    restart_window: Duration,
    shutdown_deadline: Duration,
    factory: FactoryRef,
}

impl ChildSpec {
    /// Creates a descriptor with default limits:
    /// - `max_restarts = 5`
    /// - `restart_window = 5s`
    /// - `shutdown_deadline = 5s`
    pub fn new(name: impl Into<String>, mode: ChildMode, factory: FactoryRef) -> Self {
        Self {
            name: name.into(),
            mode,
            max_restarts: 5,
            restart_window: Duration::from_secs(5),
            shutdown_deadline: Duration::from_secs(5),
            factory,
        }
    }

    /// Returns a new spec with updated restart limit.
    pub fn with_max_restarts(mut self, max_restarts: u32) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    /// Returns a new spec with an updated intensity window.
    pub fn with_restart_window(mut self, window: Duration) -> Self {
        self.restart_window = window;
        self
    }

    /// Returns a new spec with an updated graceful-stop deadline.
    pub fn with_shutdown_deadline(mut self, deadline: Duration) -> Self {
        self.shutdown_deadline = deadline;
        self
    }

    /// Unique name within one supervisor.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Restart classification mode.
    pub fn mode(&self) -> ChildMode {
        self.mode
    }

    /// Restarts tolerated within one [`restart_window`](Self::restart_window).
    pub fn max_restarts(&self) -> u32 {
        self.max_restarts
    }

    /// Length of the sliding intensity window.
    pub fn restart_window(&self) -> Duration {
        self.restart_window
    }

    /// Bounded wait applied when this child is stopped gracefully.
    pub fn shutdown_deadline(&self) -> Duration {
        self.shutdown_deadline
    }

    /// The instance factory.
    pub fn factory(&self) -> &FactoryRef {
        &self.factory
    }
}

impl std::fmt::Debug for ChildSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildSpec")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("max_restarts", &self.max_restarts)
            .field("restart_window", &self.restart_window)
            .field("shutdown_deadline", &self.shutdown_deadline)
            .finish_non_exhaustive()
    }
}
