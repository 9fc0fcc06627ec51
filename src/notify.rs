//! Notification callback contract between the networking layer and listeners.
//!
//! CONTRACT
//! ========
//! The networking layer invokes `on_message_received` once per inbound
//! message, on whatever task accepted the connection. Deliveries for
//! different clients may run concurrently and in any order, so
//! implementations must be safe under concurrent invocation. Nothing may
//! panic or propagate across this boundary: all failures are handled
//! internally and logged so the networking layer is never blocked or crashed
//! by a listener.

use async_trait::async_trait;

/// Listener registered with the networking layer.
///
/// The payload is an opaque string: the departing user's identifier for the
/// shutdown coordinator, an arbitrary test payload for the completion
/// barrier.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    /// Handle one inbound message.
    async fn on_message_received(&self, message: &str);
}
