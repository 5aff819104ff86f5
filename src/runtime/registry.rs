//! Name registry: name → handle bindings.
//!
//! The registry is an injected collaborator, never a process-wide global,
//! so tests can substitute their own implementation. Supervisors register
//! each child under its spec name on every (re)spawn and deregister it when
//! the entry is removed.
//!
//! Lookups are eventually consistent with respect to restarts: a lookup
//! performed concurrently with a restart may legitimately observe `None`
//! between deregistration of the old instance and registration of the new
//! one.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::runtime::handle::ActorHandle;

/// Name → handle binding service.
#[async_trait]
pub trait NameRegistry: Send + Sync + 'static {
    /// Binds `name` to `handle`, replacing any existing binding.
    ///
    /// Replacing a dead binding is the expected restart path; replacement
    /// is idempotent either way.
    async fn register(&self, name: &str, handle: ActorHandle);

    /// Resolves `name` to its current handle, if bound.
    async fn lookup(&self, name: &str) -> Option<ActorHandle>;

    /// Removes the binding for `name`, if any.
    async fn unregister(&self, name: &str);
}

/// Shared registry handle, the form supervisors are constructed with.
pub type RegistryRef = Arc<dyn NameRegistry>;

/// In-memory [`NameRegistry`] backed by a `RwLock<HashMap>`.
#[derive(Default)]
pub struct InMemoryRegistry {
    bindings: RwLock<HashMap<String, ActorHandle>>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry as a [`RegistryRef`].
    pub fn shared() -> RegistryRef {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl NameRegistry for InMemoryRegistry {
    async fn register(&self, name: &str, handle: ActorHandle) {
        self.bindings
            .write()
            .await
            .insert(name.to_string(), handle);
    }

    async fn lookup(&self, name: &str) -> Option<ActorHandle> {
        self.bindings.read().await.get(name).cloned()
    }

    async fn unregister(&self, name: &str) {
        self.bindings.write().await.remove(name);
    }
}
