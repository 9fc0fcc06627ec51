//! Session state — the mutable runtime record of one hosted board.
//!
//! DESIGN
//! ======
//! Exactly one `SessionState` lives per board-server process. It is built at
//! startup and injected into the shutdown coordinator — never reached through
//! ambient globals. The connected-user set and the session phase share one
//! mutex so that "remove user, check emptiness, claim teardown" executes as a
//! single atomic unit: two near-simultaneous last-departures must not both
//! observe emptiness and both run the teardown sequence.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::warn;
use uuid::Uuid;

use crate::listener::ListenerControl;

// =============================================================================
// USERNAME
// =============================================================================

/// Client identifier. Compared and hashed by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Username {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

// =============================================================================
// BOARD CONTENT
// =============================================================================

/// Drawing operations keyed by object id.
///
/// The shape of the individual operations is owned by the editing path; this
/// core only hands the whole struct to the codec at teardown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardContent {
    pub operations: HashMap<Uuid, serde_json::Value>,
}

impl BoardContent {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

// =============================================================================
// PHASE / DEPARTURE
// =============================================================================

/// Lifecycle phase of a board session. The terminal state is process exit,
/// taken by the caller once teardown reports completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Accepting clients and stop requests.
    Active,
    /// Teardown claimed; further stop requests are ignored.
    Draining,
}

/// Result of one departure against the shared user set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// The set is not empty afterwards, or nothing was removed. `removed` is
    /// `false` for a non-member (a no-op, never a teardown trigger).
    Removed { removed: bool, remaining: usize },
    /// This caller emptied the set and won the ACTIVE→DRAINING claim. The
    /// claimant alone runs the teardown sequence.
    ClaimedTeardown,
    /// Another caller already claimed teardown.
    AlreadyDraining,
}

// =============================================================================
// SESSION STATE
// =============================================================================

struct UserRoster {
    connected: HashSet<Username>,
    phase: SessionPhase,
}

/// Shared runtime state of one board session.
pub struct SessionState {
    board_id: Uuid,
    master_host: String,
    users: Mutex<UserRoster>,
    content: RwLock<BoardContent>,
    listener: Arc<dyn ListenerControl>,
}

impl SessionState {
    #[must_use]
    pub fn new(board_id: Uuid, master_host: impl Into<String>, listener: Arc<dyn ListenerControl>) -> Self {
        Self {
            board_id,
            master_host: master_host.into(),
            users: Mutex::new(UserRoster { connected: HashSet::new(), phase: SessionPhase::Active }),
            content: RwLock::new(BoardContent::default()),
            listener,
        }
    }

    /// Identifier of the hosted board, stable for the process lifetime.
    #[must_use]
    pub fn board_id(&self) -> Uuid {
        self.board_id
    }

    /// Network locator of the master server, fixed at startup.
    #[must_use]
    pub fn master_host(&self) -> &str {
        &self.master_host
    }

    /// The listener control surface handed to teardown.
    #[must_use]
    pub fn listener(&self) -> &Arc<dyn ListenerControl> {
        &self.listener
    }

    /// Register a connected client. Returns `false` for a duplicate or when
    /// the session is already draining.
    pub async fn connect_user(&self, user: Username) -> bool {
        let mut roster = self.users.lock().await;
        if roster.phase == SessionPhase::Draining {
            warn!(%user, board_id = %self.board_id, "rejecting client; session is draining");
            return false;
        }
        roster.connected.insert(user)
    }

    /// Number of currently connected clients.
    pub async fn user_count(&self) -> usize {
        self.users.lock().await.connected.len()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.users.lock().await.phase
    }

    /// Remove a departing user and, if that removal empties the set, claim
    /// the ACTIVE→DRAINING transition.
    ///
    /// The whole sequence runs under one lock, so exactly one caller can ever
    /// observe [`Departure::ClaimedTeardown`]. Removing a non-member is a
    /// no-op and never claims, even when the set is already empty.
    pub async fn depart(&self, user: &Username) -> Departure {
        let mut roster = self.users.lock().await;
        if roster.phase == SessionPhase::Draining {
            return Departure::AlreadyDraining;
        }

        let removed = roster.connected.remove(user);
        if removed && roster.connected.is_empty() {
            roster.phase = SessionPhase::Draining;
            return Departure::ClaimedTeardown;
        }

        Departure::Removed { removed, remaining: roster.connected.len() }
    }

    /// Roll DRAINING back to ACTIVE.
    ///
    /// Used only when a `Required` persistence policy aborts teardown before
    /// the irreversible steps: the board stays registered and keeps accepting
    /// clients, so a later departure can retry the persist.
    pub async fn reopen(&self) {
        let mut roster = self.users.lock().await;
        roster.phase = SessionPhase::Active;
    }

    /// Clone the current content for encoding.
    pub async fn snapshot_content(&self) -> BoardContent {
        self.content.read().await.clone()
    }

    /// Record one drawing operation (editing path, out of scope for teardown).
    pub async fn insert_operation(&self, id: Uuid, operation: serde_json::Value) {
        self.content.write().await.operations.insert(id, operation);
    }

    /// Replace the whole content map (hydration at startup).
    pub async fn replace_content(&self, content: BoardContent) {
        *self.content.write().await = content;
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
