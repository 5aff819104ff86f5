//! Supervisor: the child-table control loop and its owner facade.
//!
//! The control loop is itself an [`Actor`]: administrative requests and
//! child-exit notifications are ordinary messages in its one ordered
//! mailbox, handled strictly one at a time. That single-consumer
//! serialization is what lets the child table be plain owned data with no
//! locks.
//!
//! ## Architecture
//! ```text
//! Supervisor (owner facade)                SupervisorActor (control loop)
//!   add_child(spec) ── AddChild ─────────►  ┌────────────────────────────┐
//!   get_child(name) ── GetChild ─────────►  │ recv() one event at a time │
//!   shutdown()      ── shutdown request ─►  │   ├─ AddChild  → spawn     │
//!                                           │   ├─ GetChild  → reply     │
//!   child watcher ──── ChildExit ────────►  │   └─ ChildExit → classify  │
//!     (one task per child instance,         └──────────┬─────────────────┘
//!      forwards handle.wait() into                     ▼
//!      the supervisor's own inbox)          classify (ChildMode)
//!                                             ├─ no restart → remove entry
//!                                             └─ restart:
//!                                                  ├─ intensity gate ─ exceeded → escalate:
//!                                                  │                    stop all, exit Failure
//!                                                  └─ fan-out (RestartStrategy):
//!                                                       stop members (deadline, kill on
//!                                                       timeout) → respawn fresh instances
//! ```
//!
//! ## Rules
//! - A notification whose handle id is not the entry's current id is stale
//!   (the instance was already superseded) and is discarded, never acted
//!   on.
//! - Once the loop leaves its receive state (shutdown or escalation) it
//!   never processes another notification.
//! - Shutdown stops children in reverse start order; each stop is a
//!   graceful request bounded by the child's `shutdown_deadline`, then a
//!   kill.
//! - Escalation behaves like shutdown and then terminates the loop with a
//!   `Failure` cause, which cascades to an enclosing supervisor through
//!   the ordinary exit-notification channel — supervision trees compose
//!   recursively with no special casing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::{ActorError, SpawnError, SupervisorError};
use crate::events::{Bus, Event, EventKind};
use crate::runtime::{
    exit_value, Actor, ActorFactory, ActorHandle, ActorId, ExitCause, ExitValue, FactoryRef,
    Mailbox, MailboxSender, RegistryRef, Runtime,
};
use crate::supervise::intensity::RestartWindow;
use crate::supervise::spec::{ChildMode, ChildSpec};
use crate::supervise::strategy::RestartStrategy;

/// Messages understood by the control loop. Both administrative requests
/// and child-exit notifications travel through the supervisor's mailbox.
enum Request {
    AddChild {
        spec: ChildSpec,
        reply: oneshot::Sender<Result<ActorHandle, SupervisorError>>,
    },
    GetChild {
        name: String,
        reply: oneshot::Sender<Option<ActorHandle>>,
    },
    ChildExit {
        id: ActorId,
        cause: ExitCause,
    },
}

/// Mutable runtime record for one child slot. Exclusively owned by the
/// control loop.
struct ChildEntry {
    spec: ChildSpec,
    /// Start-order index; positions are never reused after removal.
    position: u64,
    current: Option<ActorHandle>,
    /// Per-child intensity tracker (used by `OneForOne`).
    restarts: RestartWindow,
}

/// Describes a supervisor so it can be spawned like any other actor.
///
/// `SupervisorDef` implements [`ActorFactory`], so it can be the factory of
/// a [`ChildSpec`] — nesting supervisors to arbitrary depth:
///
/// ```no_run
/// use std::sync::Arc;
/// use actorvisor::{
///     ChildMode, ChildSpec, FactoryRef, RestartStrategy, Runtime, Supervisor, SupervisorDef,
/// };
///
/// # fn demo(runtime: Runtime, registry: actorvisor::RegistryRef, workers: Vec<ChildSpec>) {
/// let inner: FactoryRef = Arc::new(SupervisorDef::new(
///     runtime.clone(),
///     registry.clone(),
///     RestartStrategy::OneForOne,
///     workers,
/// ));
/// let tree = Supervisor::start(
///     &runtime,
///     &registry,
///     RestartStrategy::OneForOne,
///     vec![ChildSpec::new("inner", ChildMode::Transient, inner)],
/// );
/// # }
/// ```
pub struct SupervisorDef {
    runtime: Runtime,
    registry: RegistryRef,
    strategy: RestartStrategy,
    children: Vec<ChildSpec>,
}

impl SupervisorDef {
    /// Creates a supervisor definition.
    pub fn new(
        runtime: Runtime,
        registry: RegistryRef,
        strategy: RestartStrategy,
        children: Vec<ChildSpec>,
    ) -> Self {
        Self {
            runtime,
            registry,
            strategy,
            children,
        }
    }

    /// Wraps the definition into a [`FactoryRef`] for use in a
    /// [`ChildSpec`].
    pub fn into_factory(self) -> FactoryRef {
        Arc::new(self)
    }
}

impl ActorFactory for SupervisorDef {
    fn build(&self) -> Box<dyn Actor> {
        Box::new(SupervisorActor {
            runtime: self.runtime.clone(),
            registry: self.registry.clone(),
            strategy: self.strategy,
            children: self.children.clone(),
        })
    }
}

/// The control loop behind a [`Supervisor`].
struct SupervisorActor {
    runtime: Runtime,
    registry: RegistryRef,
    strategy: RestartStrategy,
    children: Vec<ChildSpec>,
}

#[async_trait]
impl Actor for SupervisorActor {
    async fn run(self: Box<Self>, mut mailbox: Mailbox) -> Result<ExitValue, ActorError> {
        let SupervisorActor {
            runtime,
            registry,
            strategy,
            children,
        } = *self;
        let bus = runtime.bus().clone();
        let mut state = ControlLoop {
            inbox: mailbox.sender(),
            runtime,
            registry,
            strategy,
            bus,
            entries: Vec::new(),
            next_position: 0,
            shared_restarts: RestartWindow::new(),
        };

        // Initializing: spawn the first batch in start order. A rejected
        // spec (duplicate name) or a spawn failure tears down whatever
        // already started and terminates the supervisor with that failure
        // as its cause.
        for spec in children {
            if let Err(err) = state.start_child(spec).await {
                state.stop_all().await;
                return Err(match err {
                    SupervisorError::Spawn(spawn) => ActorError::Spawn(spawn),
                    other => ActorError::fail(other.to_string()),
                });
            }
        }

        // Running.
        loop {
            match mailbox.recv().await {
                Err(_shutdown) => {
                    state.bus.publish(Event::new(EventKind::ShutdownRequested));
                    state.stop_all().await;
                    state.bus.publish(Event::new(EventKind::SupervisorStopped));
                    return Ok(exit_value(()));
                }
                Ok(msg) => {
                    let req = match msg.downcast::<Request>() {
                        Ok(req) => *req,
                        // Foreign payloads are not part of the protocol.
                        Err(_other) => continue,
                    };
                    match req {
                        Request::AddChild { spec, reply } => {
                            let res = state.start_child(spec).await;
                            let _ = reply.send(res);
                        }
                        Request::GetChild { name, reply } => {
                            let _ = reply.send(state.current_handle(&name));
                        }
                        Request::ChildExit { id, cause } => {
                            if let Err(err) = state.on_child_exit(id, cause).await {
                                state.stop_all().await;
                                return Err(err);
                            }
                        }
                    }
                }
            }
        }
    }
}

struct ControlLoop {
    runtime: Runtime,
    registry: RegistryRef,
    strategy: RestartStrategy,
    bus: Bus,
    /// Sender into the supervisor's own mailbox, cloned into child
    /// watchers.
    inbox: MailboxSender,
    /// Child table in start order. Removal deletes the entry; positions
    /// stay unique forever.
    entries: Vec<ChildEntry>,
    next_position: u64,
    /// Supervisor-level intensity tracker for the group strategies.
    shared_restarts: RestartWindow,
}

impl ControlLoop {
    fn index_of_position(&self, pos: u64) -> Option<usize> {
        self.entries.iter().position(|e| e.position == pos)
    }

    fn current_handle(&self, name: &str) -> Option<ActorHandle> {
        self.entries
            .iter()
            .find(|e| e.spec.name() == name)
            .and_then(|e| e.current.clone())
    }

    /// Spawns a fresh instance and a watcher forwarding its exit cause
    /// back into the supervisor's inbox as an ordinary message.
    fn spawn_instance(&self, spec: &ChildSpec) -> Result<ActorHandle, SpawnError> {
        let handle = self.runtime.spawn(spec.factory())?;
        let inbox = self.inbox.clone();
        let watched = handle.clone();
        tokio::spawn(async move {
            let cause = watched.wait().await;
            inbox.send(Box::new(Request::ChildExit {
                id: watched.id(),
                cause,
            }));
        });
        Ok(handle)
    }

    /// Spawns `spec` and appends its entry at the end of the start order.
    ///
    /// Names must be unique among live entries; a duplicate is rejected
    /// whether the spec arrives in the initial batch or through
    /// `add_child`.
    async fn start_child(&mut self, spec: ChildSpec) -> Result<ActorHandle, SupervisorError> {
        if self.entries.iter().any(|e| e.spec.name() == spec.name()) {
            return Err(SupervisorError::DuplicateName {
                name: spec.name().to_string(),
            });
        }
        let handle = self.spawn_instance(&spec)?;
        self.registry.register(spec.name(), handle.clone()).await;
        self.bus
            .publish(Event::new(EventKind::ChildStarted).with_child(spec.name()));
        let position = self.next_position;
        self.next_position += 1;
        self.entries.push(ChildEntry {
            spec,
            position,
            current: Some(handle.clone()),
            restarts: RestartWindow::new(),
        });
        Ok(handle)
    }

    /// Handles one termination notification.
    ///
    /// `Err` means escalation: the caller stops the remaining children and
    /// terminates the supervisor with this cause.
    async fn on_child_exit(&mut self, id: ActorId, cause: ExitCause) -> Result<(), ActorError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.current.as_ref().map(ActorHandle::id) == Some(id));
        let Some(idx) = idx else {
            // Stale: the instance was superseded by a prior restart, or the
            // entry is gone. Acting on it would double-restart.
            return Ok(());
        };

        let name = self.entries[idx].spec.name().to_string();
        let abnormal = cause.is_failure();
        match &cause {
            ExitCause::Normal(_) => self
                .bus
                .publish(Event::new(EventKind::ChildStopped).with_child(name.as_str())),
            ExitCause::Failure(err) => self.bus.publish(
                Event::new(EventKind::ChildFailed)
                    .with_child(name.as_str())
                    .with_reason(err.to_string()),
            ),
        }

        if !self.entries[idx].spec.mode().wants_restart(abnormal) {
            self.remove_entry(idx).await;
            return Ok(());
        }

        let gate_max = self.entries[idx].spec.max_restarts();
        let gate_window = self.entries[idx].spec.restart_window();
        if self.check_intensity(idx, gate_max, gate_window, Instant::now()) {
            self.bus
                .publish(Event::new(EventKind::IntensityExceeded).with_child(name.as_str()));
            return Err(ActorError::fail(format!(
                "restart intensity exceeded for child '{name}'"
            )));
        }

        let failing_pos = self.entries[idx].position;
        let live: Vec<u64> = self
            .entries
            .iter()
            .filter(|e| e.current.is_some())
            .map(|e| e.position)
            .collect();

        for pos in self.strategy.affected(failing_pos, &live) {
            let Some(i) = self.index_of_position(pos) else {
                continue;
            };
            if pos != failing_pos {
                self.stop_entry(i).await;
            }
            if self.entries[i].spec.mode() == ChildMode::Temporary {
                // Stopped as part of the group, but never restarted.
                self.remove_entry(i).await;
            } else {
                self.respawn(pos, gate_max, gate_window).await?;
            }
        }
        Ok(())
    }

    /// Intensity gate for a prospective restart.
    ///
    /// `max` and `window` are always the limits of the child whose failure
    /// triggered the restart; they stay fixed for the whole logical event,
    /// including spawn-failure retries for siblings caught in a group
    /// fan-out. `OneForOne` charges the tracker of entry `idx` (the failing
    /// child itself); the group strategies charge one supervisor-level
    /// window, because a group restart is a single logical event.
    fn check_intensity(&mut self, idx: usize, max: u32, window: Duration, now: Instant) -> bool {
        match self.strategy {
            RestartStrategy::OneForOne => {
                self.entries[idx].restarts.should_escalate(max, window, now)
            }
            RestartStrategy::OneForAll | RestartStrategy::RestForOne => {
                self.shared_restarts.should_escalate(max, window, now)
            }
        }
    }

    /// Replaces entry `pos`'s instance with a fresh one.
    ///
    /// A spawn failure counts as a failed restart attempt toward intensity,
    /// still charged against the triggering child's limits, and is retried
    /// until it succeeds or the window fills up.
    async fn respawn(
        &mut self,
        pos: u64,
        gate_max: u32,
        gate_window: Duration,
    ) -> Result<(), ActorError> {
        loop {
            let Some(i) = self.index_of_position(pos) else {
                return Ok(());
            };
            let name = self.entries[i].spec.name().to_string();
            match self.spawn_instance(&self.entries[i].spec) {
                Ok(handle) => {
                    self.registry.register(&name, handle.clone()).await;
                    self.entries[i].current = Some(handle);
                    self.bus
                        .publish(Event::new(EventKind::ChildStarted).with_child(name.as_str()));
                    return Ok(());
                }
                Err(err) => {
                    self.bus.publish(
                        Event::new(EventKind::ChildFailed)
                            .with_child(name.as_str())
                            .with_reason(err.to_string()),
                    );
                    if self.check_intensity(i, gate_max, gate_window, Instant::now()) {
                        self.bus.publish(
                            Event::new(EventKind::IntensityExceeded).with_child(name.as_str()),
                        );
                        return Err(ActorError::Spawn(err));
                    }
                }
            }
        }
    }

    /// Gracefully stops entry `i`'s instance: shutdown request, bounded
    /// wait of the child's deadline, kill on timeout.
    ///
    /// The stop produces an exit notification through the watcher; it is
    /// discarded later as stale once the entry's current handle changes or
    /// the entry is removed.
    async fn stop_entry(&mut self, i: usize) {
        let Some(handle) = self.entries[i].current.clone() else {
            return;
        };
        if handle.is_terminated() {
            return;
        }
        handle.send_shutdown_request();
        let deadline = self.entries[i].spec.shutdown_deadline();
        if handle.wait_timeout(deadline).await.is_none() {
            self.bus.publish(
                Event::new(EventKind::ShutdownTimeout).with_child(self.entries[i].spec.name()),
            );
            handle.kill();
            handle.wait().await;
        }
    }

    /// Deletes entry `idx` from the table and the name registry.
    async fn remove_entry(&mut self, idx: usize) {
        let entry = self.entries.remove(idx);
        self.registry.unregister(entry.spec.name()).await;
        self.bus
            .publish(Event::new(EventKind::ChildRemoved).with_child(entry.spec.name()));
    }

    /// Stops and removes every child, in reverse start order.
    async fn stop_all(&mut self) {
        let mut positions: Vec<u64> = self.entries.iter().map(|e| e.position).collect();
        positions.sort_unstable_by(|a, b| b.cmp(a));
        for pos in positions {
            let Some(i) = self.index_of_position(pos) else {
                continue;
            };
            self.stop_entry(i).await;
            self.remove_entry(i).await;
        }
    }
}

/// Owner facade over a running supervisor.
///
/// Construct with [`Supervisor::start`]; interact through
/// [`add_child`](Self::add_child), [`get_child`](Self::get_child),
/// [`shutdown`](Self::shutdown), and [`wait`](Self::wait). All requests go
/// through the control loop's mailbox, so they are serialized with restart
/// handling.
///
/// `wait` resolves to `Normal` after a clean shutdown and to `Failure`
/// after escalation.
pub struct Supervisor {
    handle: ActorHandle,
}

impl Supervisor {
    /// Spawns a supervisor with the given strategy and initial children
    /// (started in order).
    ///
    /// Startup is asynchronous: a failure to spawn the initial batch
    /// surfaces as the supervisor terminating with a `Failure` cause, not
    /// as an error here.
    pub fn start(
        runtime: &Runtime,
        registry: &RegistryRef,
        strategy: RestartStrategy,
        children: Vec<ChildSpec>,
    ) -> Result<Self, SpawnError> {
        let def: FactoryRef =
            SupervisorDef::new(runtime.clone(), registry.clone(), strategy, children)
                .into_factory();
        let handle = runtime.spawn(&def)?;
        Ok(Self { handle })
    }

    /// Spawns a new child and appends it at the end of the start order.
    ///
    /// Fails with [`SupervisorError::DuplicateName`] if the name is in use
    /// and [`SupervisorError::NotRunning`] once the supervisor no longer
    /// serves requests.
    pub async fn add_child(&self, spec: ChildSpec) -> Result<ActorHandle, SupervisorError> {
        let (reply, rx) = oneshot::channel();
        if !self.handle.send(Box::new(Request::AddChild { spec, reply })) {
            return Err(SupervisorError::NotRunning);
        }
        match rx.await {
            Ok(res) => res,
            Err(_) => Err(SupervisorError::NotRunning),
        }
    }

    /// Returns the current handle for a live entry, or `None` if no entry
    /// exists under that name.
    ///
    /// Restart is asynchronous relative to the notification that triggered
    /// it; callers needing a settled answer poll with their own timeout.
    pub async fn get_child(&self, name: &str) -> Option<ActorHandle> {
        let (reply, rx) = oneshot::channel();
        let sent = self.handle.send(Box::new(Request::GetChild {
            name: name.to_string(),
            reply,
        }));
        if !sent {
            return None;
        }
        rx.await.ok().flatten()
    }

    /// Requests a graceful shutdown: children are stopped in reverse start
    /// order, then the supervisor terminates with a `Normal` cause.
    pub fn shutdown(&self) {
        let _ = self.handle.send_shutdown_request();
    }

    /// Suspends until the supervisor terminates.
    pub async fn wait(&self) -> ExitCause {
        self.handle.wait().await
    }

    /// Bounded [`wait`](Self::wait).
    pub async fn wait_timeout(&self, timeout: Duration) -> Option<ExitCause> {
        self.handle.wait_timeout(timeout).await
    }

    /// True once the supervisor has terminated.
    pub fn is_terminated(&self) -> bool {
        self.handle.is_terminated()
    }

    /// The supervisor's own actor handle (it satisfies the same contract
    /// as any child).
    pub fn handle(&self) -> &ActorHandle {
        &self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::runtime::{factory_fn, InMemoryRegistry};
    use tokio::sync::mpsc;

    fn control_loop(strategy: RestartStrategy) -> (ControlLoop, Mailbox) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mailbox = Mailbox::new(tx, rx);
        let runtime = Runtime::new(RuntimeConfig::default());
        let bus = runtime.bus().clone();
        let state = ControlLoop {
            inbox: mailbox.sender(),
            runtime,
            registry: InMemoryRegistry::shared(),
            strategy,
            bus,
            entries: Vec::new(),
            next_position: 0,
            shared_restarts: RestartWindow::new(),
        };
        (state, mailbox)
    }

    fn entry(name: &str, max_restarts: u32, position: u64) -> ChildEntry {
        let factory = factory_fn(|_mailbox| async { Ok(exit_value(())) });
        ChildEntry {
            spec: ChildSpec::new(name, ChildMode::Permanent, factory)
                .with_max_restarts(max_restarts),
            position,
            current: None,
            restarts: RestartWindow::new(),
        }
    }

    const WINDOW: Duration = Duration::from_secs(1);

    #[test]
    fn group_gate_charges_the_triggering_childs_limits() {
        let (mut state, _mailbox) = control_loop(RestartStrategy::OneForAll);
        state.entries.push(entry("a", 2, 0));
        // The sibling has no budget of its own.
        state.entries.push(entry("b", 0, 1));

        let now = Instant::now();
        // Retrying entry "b" is still gated by the limits passed in ("a"'s).
        assert!(!state.check_intensity(1, 2, WINDOW, now));
        assert!(!state.check_intensity(1, 2, WINDOW, now));
        assert!(state.check_intensity(1, 2, WINDOW, now));
    }

    #[test]
    fn one_for_one_gate_charges_per_child_trackers() {
        let (mut state, _mailbox) = control_loop(RestartStrategy::OneForOne);
        state.entries.push(entry("a", 1, 0));
        state.entries.push(entry("b", 1, 1));

        let now = Instant::now();
        assert!(!state.check_intensity(0, 1, WINDOW, now));
        // "a"'s tracker is full; "b"'s is untouched.
        assert!(state.check_intensity(0, 1, WINDOW, now));
        assert!(!state.check_intensity(1, 1, WINDOW, now));
    }
}
