//! # Service Error Types
//!
//! Startup errors are fatal; dispatch errors are contained to one event.

use std::path::PathBuf;

use thiserror::Error;
use wordle_oracle_chain::LedgerError;
use wordle_oracle_core::CoreError;

/// Errors loading the oracle configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file does not exist.
    #[error("config file not found: {}", .0.display())]
    Missing(PathBuf),

    /// The config file exists but could not be read.
    #[error("cannot read {}: {reason}", path.display())]
    Unreadable {
        /// The file.
        path: PathBuf,
        /// Underlying error.
        reason: String,
    },

    /// The config file is not valid TOML or JSON.
    #[error("malformed config {}: {reason}", path.display())]
    Malformed {
        /// The file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// A required value was supplied nowhere.
    #[error("missing required setting `{0}`")]
    MissingField(&'static str),

    /// A value is present but unusable.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        /// The setting.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Why a single event could not be handled.
///
/// None of these stop the loop; the event is dropped and logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The guess arrived for a player with no assigned secret.
    #[error("no secret for player: {0}")]
    NoSecret(#[source] CoreError),

    /// The fulfilment could not be submitted or confirmed.
    #[error("fulfilment failed: {0}")]
    Submit(#[from] LedgerError),
}

/// Result type for per-event handling.
pub type DispatchResult<T> = Result<T, DispatchError>;
