//! Error types used by the actor runtime and the supervision core.
//!
//! Three enums cover the crate's failure surface:
//!
//! - [`SpawnError`] — the runtime could not produce a new actor instance.
//! - [`ActorError`] — an actor terminated abnormally (this is the payload of
//!   a `Failure` exit cause).
//! - [`SupervisorError`] — an administrative request was rejected by a
//!   supervisor.
//!
//! All types provide `as_label` for stable snake_case identifiers in
//! logs/metrics.
//!
//! Per-child failures never surface to the supervisor's owner as errors:
//! they are consumed by the control loop (restart or escalate). The owner
//! only observes supervisor-level termination through
//! [`ActorHandle::wait`](crate::ActorHandle::wait).

use thiserror::Error;

/// Errors raised while spawning a new actor instance.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    /// The runtime's actor capacity (`RuntimeConfig::max_actors`) is exhausted.
    #[error("actor capacity exhausted")]
    CapacityExhausted,

    /// The runtime no longer accepts spawns.
    #[error("runtime closed")]
    RuntimeClosed,
}

impl SpawnError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SpawnError::CapacityExhausted => "spawn_capacity_exhausted",
            SpawnError::RuntimeClosed => "spawn_runtime_closed",
        }
    }
}

/// Abnormal termination causes for a single actor.
///
/// An actor's `run` returning `Err(ActorError)` terminates it with a
/// `Failure` exit cause; panics and forced kills are mapped onto this type
/// by the runtime's monitor task.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ActorError {
    /// The actor's own logic failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The actor received a shutdown request and did not convert it into a
    /// controlled return.
    ///
    /// This is the runtime default: graceful (`Normal`) termination requires
    /// the actor to handle the request explicitly. See
    /// [`Mailbox::recv`](crate::Mailbox::recv).
    #[error("shutdown request not handled")]
    UnhandledShutdown,

    /// The actor task panicked.
    #[error("actor panicked")]
    Panicked,

    /// The actor was forcibly terminated (shutdown deadline exceeded, or an
    /// explicit [`ActorHandle::kill`](crate::ActorHandle::kill)).
    #[error("actor killed")]
    Killed,

    /// A supervisor could not (re)spawn one of its children.
    #[error("spawn failed: {0}")]
    Spawn(#[from] SpawnError),
}

impl ActorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use actorvisor::ActorError;
    ///
    /// let err = ActorError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "actor_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ActorError::Fail { .. } => "actor_failed",
            ActorError::UnhandledShutdown => "shutdown_unhandled",
            ActorError::Panicked => "actor_panicked",
            ActorError::Killed => "actor_killed",
            ActorError::Spawn(_) => "spawn_failed",
        }
    }

    /// Shorthand for an [`ActorError::Fail`] with the given message.
    pub fn fail(error: impl Into<String>) -> Self {
        ActorError::Fail {
            error: error.into(),
        }
    }
}

/// Rejections of administrative supervisor requests.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// The supervisor is no longer serving requests (shutting down or
    /// terminated).
    #[error("supervisor is not running")]
    NotRunning,

    /// A child with this name already exists under the supervisor.
    #[error("child name already in use: {name}")]
    DuplicateName {
        /// The conflicting child name.
        name: String,
    },

    /// The child could not be spawned.
    #[error("spawn failed: {0}")]
    Spawn(#[from] SpawnError),
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::NotRunning => "supervisor_not_running",
            SupervisorError::DuplicateName { .. } => "supervisor_duplicate_name",
            SupervisorError::Spawn(_) => "supervisor_spawn_failed",
        }
    }
}
