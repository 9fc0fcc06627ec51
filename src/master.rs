//! Master-server notification — outbound deregistration requests.
//!
//! DESIGN
//! ======
//! The master tracks which boards are live. When a board server shuts down it
//! sends a single fire-and-forget request carrying the board id and a
//! `RemoveBoard` command tag; the teardown sequence never retries or blocks
//! on the outcome.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MASTER_PORT;

/// Command tag telling the master to drop a board registration.
pub const REMOVE_BOARD_COMMAND: &str = "RemoveBoard";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum MasterError {
    #[error("master request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("master rejected request: status {status}")]
    Rejected { status: u16 },
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

/// Outbound send primitive toward the master server.
#[async_trait]
pub trait MasterNotifier: Send + Sync {
    /// Send one command to `address` (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns a [`MasterError`] if the request cannot be delivered or the
    /// master rejects it.
    async fn send(&self, address: &str, payload: &str, command: &str) -> Result<(), MasterError>;
}

/// JSON body of a master-server request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterRequest {
    pub payload: String,
    pub command: String,
}

/// HTTP implementation posting to the master's `/notify` endpoint.
pub struct HttpMasterNotifier {
    http: reqwest::Client,
}

impl HttpMasterNotifier {
    /// # Errors
    ///
    /// Returns [`MasterError::ClientBuild`] if the HTTP client cannot be
    /// constructed.
    pub fn new() -> Result<Self, MasterError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| MasterError::ClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl MasterNotifier for HttpMasterNotifier {
    async fn send(&self, address: &str, payload: &str, command: &str) -> Result<(), MasterError> {
        let body = MasterRequest { payload: payload.to_owned(), command: command.to_owned() };
        let response = self.http.post(format!("http://{address}/notify")).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MasterError::Rejected { status: status.as_u16() });
        }
        Ok(())
    }
}

/// Master-server address from the configured host and the well-known port.
#[must_use]
pub fn master_address(host: &str) -> String {
    format!("{host}:{MASTER_PORT}")
}

#[cfg(test)]
#[path = "master_test.rs"]
mod tests;
