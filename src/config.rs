//! Runtime configuration parsed from environment variables.

use thiserror::Error;
use uuid::Uuid;

/// Well-known port the master server listens on.
pub const MASTER_PORT: u16 = 8467;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:0";
pub const DEFAULT_PERSIST_DIR: &str = "boards";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),
    #[error("config parse failed: {0}")]
    Parse(String),
}

/// What teardown does when serialization or the persistence write fails.
///
/// Deregistering a board whose content failed to persist is silent data
/// loss, so the trade-off is an explicit choice instead of a fall-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistencePolicy {
    /// Log the failure and continue the teardown (favors availability).
    #[default]
    BestEffort,
    /// Abort the teardown before the irreversible steps and reopen the
    /// session, so the board stays registered and a later departure retries
    /// the persist (favors durability).
    Required,
}

/// Per-process board-server configuration, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Identifier of the hosted board.
    pub board_id: Uuid,
    /// Host of the master server; [`MASTER_PORT`] completes the address.
    pub master_host: String,
    /// Address the inbound listener binds.
    pub bind_addr: String,
    /// Directory the file store writes board state into.
    pub persist_dir: String,
    pub policy: PersistencePolicy,
}

impl SessionConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `BOARD_ID`: UUID of the hosted board
    /// - `MASTER_HOST`: master server host
    ///
    /// Optional:
    /// - `BIND_ADDR`: default `0.0.0.0:0`
    /// - `PERSIST_DIR`: default `boards`
    /// - `PERSISTENCE_POLICY`: `best-effort` (default) or `required`
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a missing or unparseable variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let board_id = std::env::var("BOARD_ID")
            .map_err(|_| ConfigError::MissingVar("BOARD_ID"))?
            .parse::<Uuid>()
            .map_err(|e| ConfigError::Parse(format!("invalid BOARD_ID: {e}")))?;
        let master_host = std::env::var("MASTER_HOST").map_err(|_| ConfigError::MissingVar("MASTER_HOST"))?;
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let persist_dir = std::env::var("PERSIST_DIR").unwrap_or_else(|_| DEFAULT_PERSIST_DIR.to_string());
        let policy = parse_policy(std::env::var("PERSISTENCE_POLICY").ok().as_deref())?;

        Ok(Self { board_id, master_host, bind_addr, persist_dir, policy })
    }
}

fn parse_policy(raw: Option<&str>) -> Result<PersistencePolicy, ConfigError> {
    match raw.unwrap_or("best-effort") {
        "best-effort" => Ok(PersistencePolicy::BestEffort),
        "required" => Ok(PersistencePolicy::Required),
        other => Err(ConfigError::Parse(format!(
            "unsupported persistence policy '{other}' (expected 'best-effort' or 'required')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
