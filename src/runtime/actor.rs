//! Actor abstraction and function-backed implementation.
//!
//! [`Actor`] is the capability interface for "a thing that can be spawned,
//! messaged, and awaited": it consumes its [`Mailbox`] and runs until it
//! returns an exit value or an error. [`ActorFn`] wraps a closure for quick
//! worker definitions, and [`ActorFactory`] is the pure descriptor side —
//! each `build()` call yields a fresh, independent instance, which is what
//! makes "restart" well-defined.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ActorError;
use crate::runtime::handle::ExitValue;
use crate::runtime::mailbox::Mailbox;

/// An asynchronous unit of execution with a private inbox.
///
/// `run` consumes the instance: an actor runs exactly once. Supervised
/// restarts create a *new* instance through the child's factory.
///
/// # Example
/// ```no_run
/// use actorvisor::{exit_value, Actor, ActorError, ExitValue, Mailbox};
/// use async_trait::async_trait;
///
/// struct Echo;
///
/// #[async_trait]
/// impl Actor for Echo {
///     async fn run(self: Box<Self>, mut mailbox: Mailbox) -> Result<ExitValue, ActorError> {
///         let mut seen: u32 = 0;
///         loop {
///             match mailbox.recv().await {
///                 Ok(_msg) => seen += 1,
///                 Err(_shutdown) => return Ok(exit_value(seen)),
///             }
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Actor: Send + 'static {
    /// Runs the actor to completion.
    ///
    /// Returning `Ok` terminates with a `Normal` cause, `Err` with a
    /// `Failure` cause.
    async fn run(self: Box<Self>, mailbox: Mailbox) -> Result<ExitValue, ActorError>;
}

/// Function-backed actor.
///
/// Wraps a closure that receives the mailbox and produces the actor's
/// future. Useful for small workers and tests.
pub struct ActorFn<F> {
    f: F,
}

impl<F> ActorFn<F> {
    /// Creates a function-backed actor.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Actor for ActorFn<F>
where
    F: FnOnce(Mailbox) -> Fut + Send + 'static,
    Fut: Future<Output = Result<ExitValue, ActorError>> + Send + 'static,
{
    async fn run(self: Box<Self>, mailbox: Mailbox) -> Result<ExitValue, ActorError> {
        (self.f)(mailbox).await
    }
}

/// Pure descriptor capable of producing fresh actor instances on demand.
///
/// Factories must be side-effect-free with respect to supervisor state:
/// invoking `build` twice yields two independent instances with no shared
/// mutable state.
pub trait ActorFactory: Send + Sync + 'static {
    /// Produces a fresh instance.
    fn build(&self) -> Box<dyn Actor>;
}

impl<F> ActorFactory for F
where
    F: Fn() -> Box<dyn Actor> + Send + Sync + 'static,
{
    fn build(&self) -> Box<dyn Actor> {
        (self)()
    }
}

/// Shared factory handle, the form child descriptors carry.
pub type FactoryRef = Arc<dyn ActorFactory>;

/// Builds a [`FactoryRef`] from a closure that creates the actor's future.
///
/// The closure is cloned into every instance, so captured state must be
/// `Clone` (wrap shared state in `Arc` explicitly if instances should
/// share it).
///
/// # Example
/// ```no_run
/// use actorvisor::{exit_value, factory_fn, ActorError, Mailbox};
///
/// let factory = factory_fn(|mut mailbox: Mailbox| async move {
///     match mailbox.recv().await {
///         Ok(_msg) => Err(ActorError::fail("unexpected message")),
///         Err(_shutdown) => Ok(exit_value(())),
///     }
/// });
/// ```
pub fn factory_fn<F, Fut>(f: F) -> FactoryRef
where
    F: Fn(Mailbox) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<ExitValue, ActorError>> + Send + 'static,
{
    Arc::new(move || Box::new(ActorFn::new(f.clone())) as Box<dyn Actor>)
}
