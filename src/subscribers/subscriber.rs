//! Core subscriber trait.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated listener task; implementations should
/// avoid blocking the async runtime (prefer async I/O and cooperative
/// waits). A slow subscriber may lag behind the bus and skip events.
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Handles a single event.
    async fn handle(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
