//! # actorvisor
//!
//! **Actorvisor** is an OTP-style supervision library for lightweight tokio
//! actors.
//!
//! It provides a minimal actor runtime (spawn, message, await termination)
//! and, on top of it, supervisors that own a set of child actors, restart
//! them according to declarative per-child policies, and give up (escalate)
//! when failures recur too often in too short a time.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  ChildSpec   │   │  ChildSpec   │   │  ChildSpec   │
//!     │ (name, mode, │   │              │   │              │
//!     │  limits,     │   │              │   │              │
//!     │  factory)    │   │              │   │              │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Supervisor (control loop, itself an Actor)                   │
//! │  - one ordered mailbox: admin requests + exit notifications   │
//! │  - child table (start order, owned, lock-free)                │
//! │  - RestartWindow (sliding-window intensity)                   │
//! │  - RestartStrategy fan-out (one-for-one / one-for-all /       │
//! │    rest-for-one)                                              │
//! └──────┬──────────────────┬──────────────────┬──────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌─────────┐        ┌─────────┐        ┌─────────┐
//!   │  child  │        │  child  │        │  child  │   (tokio tasks,
//!   │ (Actor) │        │ (Actor) │        │ (Actor) │    or nested
//!   └────┬────┘        └────┬────┘        └────┬────┘    supervisors)
//!        │ exit cause       │                  │
//!        └─── watcher ──────┴── watcher ───────┴──► supervisor mailbox
//!
//!   Runtime: spawn(factory) → ActorHandle     NameRegistry: name → handle
//!   Bus: lifecycle events → Subscribers
//! ```
//!
//! ## Lifecycle
//! ```text
//! Supervisor::start(runtime, registry, strategy, specs)
//!   │
//!   ├─► spawn children in start order (Initializing)
//!   └─► loop: recv() one event at a time (Running)
//!         ├─ child exit → classify by ChildMode
//!         │     ├─ Permanent             → restart
//!         │     ├─ Transient + Failure   → restart
//!         │     └─ otherwise             → remove entry
//!         ├─ restart → intensity gate (sliding window)
//!         │     ├─ within budget → fan-out per RestartStrategy:
//!         │     │     stop members gracefully (bounded), spawn fresh
//!         │     │     instances — a restarted child is never the same
//!         │     │     instance
//!         │     └─ exceeded → escalate: stop everything, terminate with
//!         │                   Failure (cascades up a supervision tree)
//!         └─ shutdown request → stop children in reverse start order,
//!                               terminate with Normal
//! ```
//!
//! ## Features
//! | Area            | Description                                          | Key types / traits                          |
//! |-----------------|------------------------------------------------------|---------------------------------------------|
//! | **Actors**      | Spawnable, messageable, awaitable units.             | [`Actor`], [`ActorFn`], [`ActorHandle`]     |
//! | **Supervision** | Child modes, restart strategies, intensity windows.  | [`Supervisor`], [`ChildSpec`], [`ChildMode`], [`RestartStrategy`] |
//! | **Nesting**     | Supervisors as children of supervisors.              | [`SupervisorDef`]                           |
//! | **Registry**    | Injected name → handle lookup.                       | [`NameRegistry`], [`InMemoryRegistry`]      |
//! | **Events**      | Lifecycle events for logging/metrics/tests.          | [`Event`], [`EventKind`], [`Subscriber`]    |
//! | **Errors**      | Typed spawn/actor/supervisor errors.                 | [`SpawnError`], [`ActorError`], [`SupervisorError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use actorvisor::{
//!     exit_value, factory_fn, ChildMode, ChildSpec, InMemoryRegistry, Mailbox,
//!     RestartStrategy, Runtime, RuntimeConfig, Supervisor,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let runtime = Runtime::new(RuntimeConfig::default());
//!     let registry = InMemoryRegistry::shared();
//!
//!     // A worker that counts messages and reports the count on shutdown.
//!     let factory = factory_fn(|mut mailbox: Mailbox| async move {
//!         let mut seen: u32 = 0;
//!         loop {
//!             match mailbox.recv().await {
//!                 Ok(_msg) => seen += 1,
//!                 Err(_shutdown) => return Ok(exit_value(seen)),
//!             }
//!         }
//!     });
//!
//!     let spec = ChildSpec::new("worker", ChildMode::Permanent, factory)
//!         .with_max_restarts(5)
//!         .with_restart_window(Duration::from_secs(1));
//!
//!     let sup = Supervisor::start(&runtime, &registry, RestartStrategy::OneForOne, vec![spec])
//!         .expect("spawn supervisor");
//!
//!     if let Some(worker) = sup.get_child("worker").await {
//!         worker.send(Box::new("hello"));
//!     }
//!
//!     sup.shutdown();
//!     let cause = sup.wait().await;
//!     assert!(cause.is_normal());
//! }
//! ```

mod config;
mod error;
mod events;
mod runtime;
mod subscribers;
mod supervise;

// ---- Public re-exports ----

pub use config::RuntimeConfig;
pub use error::{ActorError, SpawnError, SupervisorError};
pub use events::{Bus, Event, EventKind};
pub use runtime::{
    exit_value, factory_fn, Actor, ActorFactory, ActorFn, ActorHandle, ActorId, ExitCause,
    ExitValue, FactoryRef, InMemoryRegistry, Mailbox, MailboxSender, Message, NameRegistry,
    RegistryRef, Runtime, ShutdownRequest,
};
pub use subscribers::Subscriber;
pub use supervise::{ChildMode, ChildSpec, RestartStrategy, Supervisor, SupervisorDef};

// Optional: a simple built-in stdout event logger (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
