//! Completion barrier — message-count synchronization for test harnesses.
//!
//! DESIGN
//! ======
//! Asynchronous delivery makes "has everything arrived yet?" unanswerable by
//! polling. The barrier answers it by construction: it accumulates every
//! received payload in arrival order and fires a one-shot signal the moment
//! the count reaches the expected total. Append, count, compare, and fire
//! happen as one atomic unit under a single mutex; the signal sender is
//! consumed with `Option::take`, so firing twice is structurally impossible
//! even if messages keep arriving past the expected count.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, oneshot};

use crate::notify::NotificationHandler;

/// Counts received messages against an expected total and signals a waiting
/// party exactly once when satisfied. One-shot: not reusable after firing.
pub struct CompletionBarrier {
    expected: usize,
    inner: Mutex<BarrierInner>,
}

struct BarrierInner {
    received: Vec<String>,
    signal: Option<oneshot::Sender<()>>,
}

/// Waiting side of a [`CompletionBarrier`].
pub struct CompletionSignal {
    rx: oneshot::Receiver<()>,
}

impl CompletionSignal {
    /// Resolve once the barrier has fired.
    ///
    /// Returns `false` if the barrier was dropped before reaching its
    /// expected count.
    pub async fn wait(self) -> bool {
        self.rx.await.is_ok()
    }
}

impl CompletionBarrier {
    /// Create a barrier that fires after `expected` messages.
    ///
    /// A zero-count barrier is already satisfied and fires immediately.
    #[must_use]
    pub fn new(expected: usize) -> (Arc<Self>, CompletionSignal) {
        let (tx, rx) = oneshot::channel();
        let signal = if expected == 0 {
            let _ = tx.send(());
            None
        } else {
            Some(tx)
        };

        let barrier = Arc::new(Self {
            expected,
            inner: Mutex::new(BarrierInner { received: Vec::new(), signal }),
        });
        (barrier, CompletionSignal { rx })
    }

    /// The configured message count.
    #[must_use]
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Number of messages delivered so far (including any overshoot).
    pub async fn received_count(&self) -> usize {
        self.inner.lock().await.received.len()
    }

    /// Snapshot of every delivered payload in arrival order.
    pub async fn received(&self) -> Vec<String> {
        self.inner.lock().await.received.clone()
    }
}

#[async_trait]
impl NotificationHandler for CompletionBarrier {
    async fn on_message_received(&self, message: &str) {
        let mut inner = self.inner.lock().await;
        inner.received.push(message.to_owned());

        if inner.received.len() == self.expected {
            if let Some(signal) = inner.signal.take() {
                // The receiver may already be gone; firing is best-effort.
                let _ = signal.send(());
            }
        }
    }
}

#[cfg(test)]
#[path = "barrier_test.rs"]
mod tests;
