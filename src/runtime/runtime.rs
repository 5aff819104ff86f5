//! The actor runtime: spawning and monitoring.
//!
//! [`Runtime`] turns an [`ActorFactory`] into a live instance:
//!
//! ```text
//! Runtime::spawn(factory)
//!   ├─► capacity check (optional semaphore, try-acquire)
//!   ├─► mailbox channel + exit watch + fresh ActorId
//!   ├─► body task:    actor.run(mailbox)
//!   └─► monitor task: join body → record ExitCause → release permit
//! ```
//!
//! The monitor task is the only writer of an actor's exit cause. It maps
//! the join result exactly once:
//! - `Ok(Ok(value))`   → `Normal(value)`
//! - `Ok(Err(error))`  → `Failure(error)`
//! - cancelled join    → `Failure(Killed)`
//! - panicked join     → `Failure(Panicked)`
//!
//! Spawning is synchronous (no suspension), so a supervisor's control loop
//! can spawn replacements while handling a single event.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Semaphore, TryAcquireError};

use crate::config::RuntimeConfig;
use crate::error::{ActorError, SpawnError};
use crate::events::{Bus, Event};
use crate::runtime::actor::FactoryRef;
use crate::runtime::handle::{ActorHandle, ActorId, ExitCause};
use crate::runtime::mailbox::Mailbox;
use crate::subscribers::Subscriber;

struct Inner {
    capacity: Option<Arc<Semaphore>>,
    bus: Bus,
}

/// Spawns actors and hosts the shared event bus.
///
/// Cheap to clone; all clones share the capacity limit and the bus.
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<Inner>,
}

impl Runtime {
    /// Creates a runtime from the given configuration.
    pub fn new(cfg: RuntimeConfig) -> Self {
        let capacity = match cfg.max_actors {
            0 => None,
            n => Some(Arc::new(Semaphore::new(n))),
        };
        Self {
            inner: Arc::new(Inner {
                capacity,
                bus: Bus::new(cfg.bus_capacity),
            }),
        }
    }

    /// The shared event bus.
    pub fn bus(&self) -> &Bus {
        &self.inner.bus
    }

    /// Shorthand for `bus().subscribe()`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Attaches a subscriber: a dedicated listener task forwards every bus
    /// event to it. Lagged receivers skip missed events.
    ///
    /// Must be called from within a tokio runtime.
    pub fn attach(&self, sub: Arc<dyn Subscriber>) {
        let mut rx = self.inner.bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => sub.handle(&ev).await,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
        });
    }

    /// Spawns a fresh actor instance from `factory`.
    ///
    /// Fails with [`SpawnError::CapacityExhausted`] when `max_actors` live
    /// actors already exist; the slot is released when the instance
    /// terminates.
    pub fn spawn(&self, factory: &FactoryRef) -> Result<ActorHandle, SpawnError> {
        let permit = match &self.inner.capacity {
            Some(sem) => match sem.clone().try_acquire_owned() {
                Ok(p) => Some(p),
                Err(TryAcquireError::NoPermits) => return Err(SpawnError::CapacityExhausted),
                Err(TryAcquireError::Closed) => return Err(SpawnError::RuntimeClosed),
            },
            None => None,
        };

        let id = ActorId::next();
        let (tx, rx) = mpsc::unbounded_channel();
        let (exit_tx, exit_rx) = watch::channel(None::<ExitCause>);
        let mailbox = Mailbox::new(tx.clone(), rx);
        let actor = factory.build();

        let body = tokio::spawn(async move { actor.run(mailbox).await });
        let abort = body.abort_handle();

        tokio::spawn(async move {
            let cause = match body.await {
                Ok(Ok(value)) => ExitCause::Normal(value),
                Ok(Err(error)) => ExitCause::Failure(Arc::new(error)),
                Err(join) if join.is_cancelled() => {
                    ExitCause::Failure(Arc::new(ActorError::Killed))
                }
                Err(_join) => ExitCause::Failure(Arc::new(ActorError::Panicked)),
            };
            let _ = exit_tx.send(Some(cause));
            drop(permit);
        });

        Ok(ActorHandle::new(id, tx, exit_rx, abort))
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}
