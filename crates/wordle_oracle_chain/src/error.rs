//! # Ledger Error Types

use alloy::primitives::B256;
use thiserror::Error;

/// Errors talking to the ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The node could not be reached or answered with an error.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// The oracle credential could not be loaded.
    #[error("invalid oracle wallet: {0}")]
    Wallet(String),

    /// The transaction was rejected before inclusion (gas, nonce, revert on estimate).
    #[error("submission failed: {0}")]
    Submit(String),

    /// The transaction was sent but its receipt never arrived.
    #[error("confirmation failed for {tx_hash}: {reason}")]
    Confirmation {
        /// The submitted transaction.
        tx_hash: B256,
        /// Underlying error.
        reason: String,
    },

    /// The transaction was included but reverted.
    #[error("transaction {0} reverted")]
    Reverted(B256),

    /// A call exceeded the configured RPC timeout.
    #[error("{operation} timed out after {timeout_ms} ms")]
    Timeout {
        /// What was being done.
        operation: &'static str,
        /// The timeout that elapsed.
        timeout_ms: u64,
    },
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
