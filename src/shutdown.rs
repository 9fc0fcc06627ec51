//! Shutdown coordinator — last-client detection and board teardown.
//!
//! DESIGN
//! ======
//! The networking layer delivers each client's stop request as a raw message
//! carrying the departing user's identifier. [`StopRequestHandler`] removes
//! that user from the session roster; the caller whose removal empties the
//! set wins the ACTIVE→DRAINING claim (a single atomic unit inside
//! [`SessionState::depart`]) and alone runs the teardown sequence:
//!
//! 1. encode the board content
//! 2. persist it under the board id
//! 3. stop the inbound listener
//! 4. deregister the board with the master server
//!
//! Teardown never exits the process itself. It resolves a [`TeardownSignal`]
//! with a [`TeardownReport`]; process exit is a thin caller-side action taken
//! after the report arrives, which keeps the whole sequence unit-testable.
//!
//! ERROR HANDLING
//! ==============
//! Nothing escapes `on_message_received` — the networking layer must never be
//! crashed by a listener. Encoding and persistence failures follow the
//! configured [`PersistencePolicy`]: `BestEffort` logs and continues to
//! deregistration, `Required` aborts before the irreversible steps and
//! reopens the session so a later departure can retry. Master deregistration
//! is fire-and-forget; a failure is logged and recorded in the report.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, oneshot};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::codec::ContentCodec;
use crate::config::PersistencePolicy;
use crate::master::{self, MasterNotifier, REMOVE_BOARD_COMMAND};
use crate::notify::NotificationHandler;
use crate::session::{Departure, SessionState, Username};
use crate::store::StateStore;

// =============================================================================
// REPORT / SIGNAL
// =============================================================================

/// Outcome of one completed teardown, delivered through [`TeardownSignal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    pub board_id: Uuid,
    /// Whether the content was encoded and written successfully.
    pub persisted: bool,
    /// Whether the master acknowledged the `RemoveBoard` request.
    pub deregistered: bool,
}

/// Resolves once the board teardown has run to completion.
pub struct TeardownSignal {
    rx: oneshot::Receiver<TeardownReport>,
}

impl TeardownSignal {
    /// Wait for teardown to complete.
    ///
    /// Returns `None` if the coordinator was dropped before any teardown ran.
    pub async fn wait(self) -> Option<TeardownReport> {
        self.rx.await.ok()
    }
}

// =============================================================================
// COORDINATOR
// =============================================================================

/// Handles client stop requests and tears the board session down when the
/// last client leaves.
pub struct StopRequestHandler {
    session: Arc<SessionState>,
    codec: Arc<dyn ContentCodec>,
    store: Arc<dyn StateStore>,
    master: Arc<dyn MasterNotifier>,
    policy: PersistencePolicy,
    report: Mutex<Option<oneshot::Sender<TeardownReport>>>,
}

impl StopRequestHandler {
    #[must_use]
    pub fn new(
        session: Arc<SessionState>,
        codec: Arc<dyn ContentCodec>,
        store: Arc<dyn StateStore>,
        master: Arc<dyn MasterNotifier>,
        policy: PersistencePolicy,
    ) -> (Arc<Self>, TeardownSignal) {
        let (tx, rx) = oneshot::channel();
        let handler = Arc::new(Self { session, codec, store, master, policy, report: Mutex::new(Some(tx)) });
        (handler, TeardownSignal { rx })
    }

    /// The teardown sequence. Runs on the sole claimant of the DRAINING
    /// transition; returns `None` when a `Required` policy aborted it.
    async fn run_teardown(&self) -> Option<TeardownReport> {
        let board_id = self.session.board_id();
        info!(%board_id, "last client left; tearing down board session");

        // PHASE: ENCODE CONTENT
        // WHY: snapshot under the content lock, encode lock-free.
        let content = self.session.snapshot_content().await;
        let (payload, encoded) = match self.codec.encode(&content) {
            Ok(payload) => (payload, true),
            Err(e) => {
                error!(error = %e, %board_id, "content encoding failed");
                (self.codec.empty_payload(), false)
            }
        };
        if !encoded && self.abort_for_durability(board_id).await {
            return None;
        }

        // PHASE: PERSIST UNDER BOARD ID
        let key = board_id.to_string();
        let persisted = match self.store.store(&key, &payload).await {
            Ok(()) => {
                info!(%board_id, "board state persisted");
                encoded
            }
            Err(e) => {
                error!(error = %e, %board_id, "board state persistence failed");
                false
            }
        };
        if !persisted && self.abort_for_durability(board_id).await {
            return None;
        }

        // PHASE: STOP INBOUND DELIVERY
        self.session.listener().stop();
        info!(%board_id, "listener stopped");

        // PHASE: DEREGISTER WITH MASTER
        let address = master::master_address(self.session.master_host());
        let deregistered = match self.master.send(&address, &key, REMOVE_BOARD_COMMAND).await {
            Ok(()) => {
                info!(%board_id, %address, "board deregistered from master");
                true
            }
            Err(e) => {
                warn!(error = %e, %board_id, %address, "master deregistration failed");
                false
            }
        };

        Some(TeardownReport { board_id, persisted, deregistered })
    }

    /// Under `Required`, roll the session back to ACTIVE and report the
    /// abort. Returns whether teardown should stop here.
    async fn abort_for_durability(&self, board_id: Uuid) -> bool {
        if self.policy != PersistencePolicy::Required {
            return false;
        }
        warn!(%board_id, "teardown aborted by persistence policy; session reopened");
        self.session.reopen().await;
        true
    }
}

#[async_trait]
impl NotificationHandler for StopRequestHandler {
    async fn on_message_received(&self, message: &str) {
        info!(board_id = %self.session.board_id(), "received stop request from a client");

        let user = Username::new(message);
        match self.session.depart(&user).await {
            Departure::Removed { removed, remaining } => {
                info!(%user, removed, remaining, "client departed board");
            }
            Departure::AlreadyDraining => {
                info!(%user, "stop request ignored; session already draining");
            }
            Departure::ClaimedTeardown => {
                if let Some(report) = self.run_teardown().await {
                    // Taking the sender makes the completion signal one-shot
                    // even if a rolled-back session claims again later.
                    if let Some(tx) = self.report.lock().await.take() {
                        let _ = tx.send(report);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod tests;
