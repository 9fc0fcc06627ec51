//! Network listener adapter — inbound message delivery and stop control.
//!
//! DESIGN
//! ======
//! The transport proper belongs to the networking layer; this module carries
//! the `stop()` control surface teardown needs, plus a small axum reference
//! transport. Every `POST /notify` body is handed to the registered handler
//! on the task serving that request, so deliveries are concurrent and
//! unordered — exactly the conditions [`NotificationHandler`] implementations
//! must survive.
//!
//! LIFECYCLE
//! =========
//! 1. `bind` → serve loop spawned, no handler registered yet (503)
//! 2. `register` → messages flow to the handler
//! 3. `stop` → graceful shutdown; in-flight deliveries finish

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::sync::{RwLock, watch};
use tracing::{info, warn};

use crate::notify::NotificationHandler;

/// Stop surface handed to the teardown sequence.
///
/// `stop` halts further inbound delivery; it is idempotent and never blocks
/// the caller.
pub trait ListenerControl: Send + Sync {
    fn stop(&self);
}

type HandlerSlot = Arc<RwLock<Option<Arc<dyn NotificationHandler>>>>;

/// Axum-backed inbound listener for one board server.
pub struct NetListener {
    local_addr: SocketAddr,
    handler: HandlerSlot,
    shutdown: watch::Sender<bool>,
}

impl NetListener {
    /// Bind `addr` and serve until [`ListenerControl::stop`] is called.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the address cannot be bound.
    pub async fn bind(addr: &str) -> Result<Self, std::io::Error> {
        let tcp = TcpListener::bind(addr).await?;
        let local_addr = tcp.local_addr()?;

        let handler: HandlerSlot = Arc::new(RwLock::new(None));
        let (shutdown, mut stopped) = watch::channel(false);

        let app = Router::new().route("/notify", post(notify)).with_state(handler.clone());
        tokio::spawn(async move {
            let serve = axum::serve(tcp, app).with_graceful_shutdown(async move {
                // A dropped sender also ends delivery: the handle is gone.
                let _ = stopped.wait_for(|stop| *stop).await;
            });
            if let Err(e) = serve.await {
                warn!(error = %e, "listener serve loop failed");
            }
        });

        info!(%local_addr, "listener bound");
        Ok(Self { local_addr, handler, shutdown })
    }

    /// Register the notification handler. Messages arriving before this
    /// return 503 to the sender.
    pub async fn register(&self, handler: Arc<dyn NotificationHandler>) {
        *self.handler.write().await = Some(handler);
    }

    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl ListenerControl for NetListener {
    fn stop(&self) {
        // send only fails when every receiver is gone, i.e. already stopped.
        let _ = self.shutdown.send(true);
    }
}

async fn notify(State(handler): State<HandlerSlot>, body: String) -> StatusCode {
    let Some(handler) = handler.read().await.clone() else {
        return StatusCode::SERVICE_UNAVAILABLE;
    };

    handler.on_message_received(&body).await;
    StatusCode::ACCEPTED
}

#[cfg(test)]
#[path = "listener_test.rs"]
mod tests;
