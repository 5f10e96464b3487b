//! # Feedback Submitter
//!
//! Writes one scored guess back to the contract and waits for inclusion.
//! Failures are logged and returned; nothing here retries.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use wordle_oracle_chain::{Address, FulfillGuess, FulfillReceipt, LedgerClient, LedgerResult};
use wordle_oracle_core::Feedback;

use crate::deadline::within;

const LOG_TARGET: &str = "oracle::submitter";

/// Sends `fulfillGuess` transactions.
#[derive(Clone)]
pub struct FeedbackSubmitter {
    ledger: Arc<dyn LedgerClient>,
    rpc_timeout: Option<Duration>,
}

impl FeedbackSubmitter {
    /// Creates a submitter. `rpc_timeout` bounds the send and the confirmation separately.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerClient>, rpc_timeout: Option<Duration>) -> Self {
        Self {
            ledger,
            rpc_timeout,
        }
    }

    /// Submits the feedback for `player` and waits until it is included.
    ///
    /// # Errors
    ///
    /// Returns the [`LedgerError`](wordle_oracle_chain::LedgerError) if the
    /// transaction is rejected, times out, or reverts.
    pub async fn submit(
        &self,
        player: Address,
        attempt: u64,
        feedback: &Feedback,
    ) -> LedgerResult<FulfillReceipt> {
        let call = FulfillGuess {
            player,
            hints: feedback.hints(),
            won: feedback.won,
            game_over: feedback.game_over,
        };

        let submitted = within(
            self.rpc_timeout,
            "fulfillGuess send",
            self.ledger.submit_fulfillment(call),
        )
        .await
        .inspect_err(|e| {
            error!(target: LOG_TARGET, %player, attempt, error = %e, "fulfillGuess rejected");
        })?;

        let tx_hash = submitted.tx_hash;
        info!(target: LOG_TARGET, %player, attempt, %tx_hash, "fulfillGuess sent");

        let receipt = within(self.rpc_timeout, "fulfillGuess receipt", submitted.confirmed())
            .await
            .inspect_err(|e| {
                error!(
                    target: LOG_TARGET,
                    %player,
                    attempt,
                    %tx_hash,
                    error = %e,
                    "fulfillGuess not confirmed"
                );
            })?;

        info!(
            target: LOG_TARGET,
            %player,
            attempt,
            %tx_hash,
            block = ?receipt.block_number,
            won = feedback.won,
            game_over = feedback.game_over,
            "feedback confirmed"
        );

        Ok(receipt)
    }
}
