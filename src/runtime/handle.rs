//! Actor handles and termination outcomes.
//!
//! An [`ActorHandle`] is the only way to interact with a live actor: send
//! it messages, request a graceful shutdown, await its termination outcome,
//! or kill it. Handles are cheap to clone and compare by [`ActorId`] — a
//! restarted child always carries a fresh id, so a handle to the old
//! instance can never be mistaken for the new one.
//!
//! ## Termination outcomes
//! [`ExitCause`] is the awaitable result of an actor's lifetime:
//! - `Normal(value)` — the actor returned `Ok`; `value` is an opaque
//!   [`ExitValue`] downcastable by the caller.
//! - `Failure(error)` — the actor returned `Err`, panicked, or was killed.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;

use crate::error::ActorError;
use crate::runtime::mailbox::{Envelope, Message};

/// Global id counter; ids are never reused within a process.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of one actor instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u64);

impl ActorId {
    pub(crate) fn next() -> Self {
        ActorId(NEXT_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque value returned by a normally-terminating actor.
pub type ExitValue = Arc<dyn Any + Send + Sync>;

/// Wraps a concrete value into an [`ExitValue`].
pub fn exit_value<T: Any + Send + Sync>(value: T) -> ExitValue {
    Arc::new(value)
}

/// Why an actor terminated.
#[derive(Clone)]
pub enum ExitCause {
    /// Controlled return with a result value.
    Normal(ExitValue),
    /// Abnormal termination: error return, panic, or kill.
    Failure(Arc<ActorError>),
}

impl ExitCause {
    /// True for a controlled (`Normal`) termination.
    pub fn is_normal(&self) -> bool {
        matches!(self, ExitCause::Normal(_))
    }

    /// True for an abnormal (`Failure`) termination.
    pub fn is_failure(&self) -> bool {
        matches!(self, ExitCause::Failure(_))
    }

    /// Downcasts the `Normal` result value.
    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        match self {
            ExitCause::Normal(v) => v.downcast_ref::<T>(),
            ExitCause::Failure(_) => None,
        }
    }

    /// Returns the `Failure` error, if any.
    pub fn error(&self) -> Option<&ActorError> {
        match self {
            ExitCause::Normal(_) => None,
            ExitCause::Failure(e) => Some(e),
        }
    }
}

impl fmt::Debug for ExitCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCause::Normal(_) => f.write_str("Normal(..)"),
            ExitCause::Failure(e) => write!(f, "Failure({e})"),
        }
    }
}

/// Handle to a live (or terminated) actor instance.
///
/// Cloneable; all clones refer to the same instance and share its identity.
#[derive(Clone)]
pub struct ActorHandle {
    id: ActorId,
    tx: mpsc::UnboundedSender<Envelope>,
    exit: watch::Receiver<Option<ExitCause>>,
    abort: AbortHandle,
}

impl ActorHandle {
    pub(crate) fn new(
        id: ActorId,
        tx: mpsc::UnboundedSender<Envelope>,
        exit: watch::Receiver<Option<ExitCause>>,
        abort: AbortHandle,
    ) -> Self {
        Self {
            id,
            tx,
            exit,
            abort,
        }
    }

    /// The instance's unique identity.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Fire-and-forget delivery into the actor's inbox.
    ///
    /// Returns `false` if the actor's mailbox is gone.
    pub fn send(&self, msg: Message) -> bool {
        self.tx.send(Envelope::User(msg)).is_ok()
    }

    /// Requests a graceful shutdown.
    ///
    /// The request is delivered in mailbox order after previously sent
    /// messages. The default outcome for an actor that does not handle the
    /// request is termination with a `Failure` cause; see
    /// [`Mailbox::recv`](crate::Mailbox::recv).
    pub fn send_shutdown_request(&self) -> bool {
        self.tx.send(Envelope::Shutdown).is_ok()
    }

    /// Suspends until the actor terminates and returns its [`ExitCause`].
    ///
    /// Returns immediately if the actor already terminated.
    pub async fn wait(&self) -> ExitCause {
        let mut rx = self.exit.clone();
        loop {
            if let Some(cause) = rx.borrow_and_update().clone() {
                return cause;
            }
            if rx.changed().await.is_err() {
                // The monitor task always records a cause before dropping
                // the sender; a missing one means the runtime was torn down.
                return rx
                    .borrow()
                    .clone()
                    .unwrap_or(ExitCause::Failure(Arc::new(ActorError::Killed)));
            }
        }
    }

    /// Bounded [`wait`](Self::wait): `None` if the actor is still running
    /// when the timeout elapses.
    pub async fn wait_timeout(&self, timeout: Duration) -> Option<ExitCause> {
        tokio::time::timeout(timeout, self.wait()).await.ok()
    }

    /// True once the actor has terminated (its exit cause is recorded).
    pub fn is_terminated(&self) -> bool {
        self.exit.borrow().is_some()
    }

    /// Forcibly terminates the actor; it will report `Failure(Killed)`.
    ///
    /// A force-killed supervisor does not get to stop its own children;
    /// prefer [`send_shutdown_request`](Self::send_shutdown_request) with a
    /// bounded wait, which is what supervisors themselves do.
    pub fn kill(&self) {
        self.abort.abort();
    }
}

impl fmt::Debug for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorHandle")
            .field("id", &self.id)
            .field("terminated", &self.is_terminated())
            .finish()
    }
}

impl PartialEq for ActorHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ActorHandle {}
