//! Event handler capability.

use async_trait::async_trait;

use crate::types::Event;

/// Business logic invoked with one decoded event.
///
/// Handlers run inside the worker pool, never on the router's caller. They
/// own their error reporting: nothing is returned to the pool.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handles a decoded event.
    async fn handle(&self, event: Event);
}
