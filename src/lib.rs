//! `boardhost` — board-session shutdown core for the collaborative board
//! system.
//!
//! ARCHITECTURE
//! ============
//! Each board is hosted by exactly one board-server process, tracked by a
//! master server. The networking layer delivers inbound messages to
//! registered [`NotificationHandler`]s on whatever task accepted the
//! connection, so deliveries are concurrent and unordered.
//! [`StopRequestHandler`] listens for client stop requests, removes the
//! departing user from the shared [`SessionState`], and — when the last user
//! leaves — claims the teardown exactly once: persist the board content, stop
//! the listener, and deregister the board with the master server.
//!
//! [`CompletionBarrier`] is the test-harness counterpart of the same callback
//! contract: it counts deliveries against an expected total and signals a
//! waiting party once.
//!
//! This crate is a library; the process bootstrap wires the pieces together
//! and exits once the [`TeardownSignal`] resolves.

pub mod barrier;
pub mod codec;
pub mod config;
pub mod listener;
pub mod master;
pub mod notify;
pub mod session;
pub mod shutdown;
pub mod store;

pub use barrier::{CompletionBarrier, CompletionSignal};
pub use codec::{ContentCodec, JsonCodec};
pub use config::{MASTER_PORT, PersistencePolicy, SessionConfig};
pub use listener::{ListenerControl, NetListener};
pub use master::{HttpMasterNotifier, MasterNotifier};
pub use notify::NotificationHandler;
pub use session::{BoardContent, Departure, SessionState, Username};
pub use shutdown::{StopRequestHandler, TeardownReport, TeardownSignal};
pub use store::{FileStore, StateStore};
