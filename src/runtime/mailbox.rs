//! Actor mailbox: one ordered inbox per actor.
//!
//! Every actor owns a [`Mailbox`], the receiving half of its inbox. Two
//! kinds of deliveries share the channel:
//!
//! - ordinary application messages ([`Message`], an opaque `Box<dyn Any>`),
//! - the distinguished shutdown request, a control signal with its own
//!   envelope variant.
//!
//! The shutdown request is distinguished *in type* but ordered *in
//! delivery*: messages sent before it are received before it. This is what
//! lets a worker drain its pending messages and then convert the request
//! into a controlled return.
//!
//! ## Shutdown semantics
//! [`Mailbox::recv`] yields `Err(ShutdownRequest)` when the request arrives.
//! `ShutdownRequest` converts into
//! [`ActorError::UnhandledShutdown`](crate::ActorError::UnhandledShutdown),
//! so an actor that simply propagates it with `?` terminates with a
//! `Failure` cause — the runtime default. Graceful termination requires
//! matching the error and returning `Ok`:
//!
//! ```no_run
//! use actorvisor::{exit_value, ActorError, ExitValue, Mailbox};
//!
//! async fn run(mut mailbox: Mailbox) -> Result<ExitValue, ActorError> {
//!     let mut count: u32 = 0;
//!     loop {
//!         match mailbox.recv().await {
//!             Ok(_msg) => count += 1,
//!             // Controlled return: terminate with Normal(count).
//!             Err(_shutdown) => return Ok(exit_value(count)),
//!         }
//!     }
//! }
//! ```

use std::any::Any;

use tokio::sync::mpsc;

/// Opaque application message.
pub type Message = Box<dyn Any + Send>;

/// Inbox delivery: an application message or the shutdown control signal.
pub(crate) enum Envelope {
    User(Message),
    Shutdown,
}

/// The distinguished shutdown control signal, surfaced as an error so that
/// propagating it with `?` produces the runtime's default outcome
/// (termination with a `Failure` cause).
#[derive(Debug)]
pub struct ShutdownRequest;

impl From<ShutdownRequest> for crate::error::ActorError {
    fn from(_: ShutdownRequest) -> Self {
        crate::error::ActorError::UnhandledShutdown
    }
}

/// Receiving half of an actor's inbox, exclusively owned by the actor.
pub struct Mailbox {
    rx: mpsc::UnboundedReceiver<Envelope>,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl Mailbox {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<Envelope>,
        rx: mpsc::UnboundedReceiver<Envelope>,
    ) -> Self {
        Self { rx, tx }
    }

    /// Receives the next delivery in arrival order.
    ///
    /// Returns `Ok(message)` for application messages and
    /// `Err(ShutdownRequest)` once a shutdown request is reached. Suspends
    /// while the inbox is empty.
    pub async fn recv(&mut self) -> Result<Message, ShutdownRequest> {
        match self.rx.recv().await {
            Some(Envelope::User(msg)) => Ok(msg),
            // The mailbox holds a sender itself, so `None` only happens
            // after an explicit close; treat it like a shutdown request.
            Some(Envelope::Shutdown) | None => Err(ShutdownRequest),
        }
    }

    /// Returns a sender that injects messages into this actor's own inbox.
    ///
    /// Used by actors that spawn helper tasks which report back as ordinary
    /// messages (the supervisor's child watchers do exactly this).
    pub fn sender(&self) -> MailboxSender {
        MailboxSender {
            tx: self.tx.clone(),
        }
    }
}

/// Cloneable sending half of an actor's inbox.
#[derive(Clone)]
pub struct MailboxSender {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl MailboxSender {
    /// Sends a message; returns `false` if the inbox is gone.
    pub fn send(&self, msg: Message) -> bool {
        self.tx.send(Envelope::User(msg)).is_ok()
    }
}
