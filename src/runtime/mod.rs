//! Actor runtime: spawning, mailboxes, handles, and the name registry.
//!
//! Modules:
//! - [`actor`]: the [`Actor`] capability trait, closure adapters, factories;
//! - [`mailbox`]: per-actor ordered inbox with the distinguished shutdown
//!   request;
//! - [`handle`]: actor identity, messaging, and awaitable termination;
//! - [`runtime`]: spawning with optional capacity and exit monitoring;
//! - [`registry`]: injected name → handle binding service.

mod actor;
mod handle;
mod mailbox;
mod registry;
#[allow(clippy::module_inception)]
mod runtime;

pub use actor::{factory_fn, Actor, ActorFactory, ActorFn, FactoryRef};
pub use handle::{exit_value, ActorHandle, ActorId, ExitCause, ExitValue};
pub use mailbox::{Mailbox, MailboxSender, Message, ShutdownRequest};
pub use registry::{InMemoryRegistry, NameRegistry, RegistryRef};
pub use runtime::Runtime;
