//! # Ledger Client
//!
//! The three things the oracle asks of the chain: the current height, the
//! events of one kind in a block range, and a state-changing `fulfillGuess`
//! whose handle resolves once the transaction is included.

pub mod rpc;

use std::fmt;

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use futures::future::BoxFuture;
use wordle_oracle_core::WORD_LENGTH;

use crate::error::LedgerResult;
use crate::events::{EventKind, OracleEvent};

/// Half-open block range `(after, to]`.
///
/// `after` is the high-water mark (already processed); `to` is the current
/// head. Filters use the inclusive form `[after + 1, to]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockRange {
    /// Last block already processed.
    pub after: u64,
    /// Last block to process.
    pub to: u64,
}

impl BlockRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(after: u64, to: u64) -> Self {
        Self { after, to }
    }

    /// True when there is nothing new.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.to <= self.after
    }

    /// First block to fetch (inclusive).
    #[must_use]
    pub const fn first(&self) -> u64 {
        self.after.saturating_add(1)
    }

    /// Last block to fetch (inclusive).
    #[must_use]
    pub const fn last(&self) -> u64 {
        self.to
    }

    /// Number of blocks covered.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.to.saturating_sub(self.after)
    }

    /// True when `block` falls inside the range.
    #[must_use]
    pub const fn contains(&self, block: u64) -> bool {
        block > self.after && block <= self.to
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}]", self.after, self.to)
    }
}

/// Arguments of `fulfillGuess(address player, uint8[5] hints, bool won, bool gameOver)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FulfillGuess {
    /// The player whose guess is answered.
    pub player: Address,
    /// LetterStatus discriminants.
    pub hints: [u8; WORD_LENGTH],
    /// The guess matched the secret.
    pub won: bool,
    /// The game is finished.
    pub game_over: bool,
}

/// Inclusion proof-of-life for a fulfilment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FulfillReceipt {
    /// Transaction hash.
    pub tx_hash: B256,
    /// Block the transaction landed in, if the node reported it.
    pub block_number: Option<u64>,
}

/// A sent transaction whose inclusion has not been awaited yet.
pub struct SubmittedTx {
    /// Transaction hash.
    pub tx_hash: B256,
    confirmation: BoxFuture<'static, LedgerResult<FulfillReceipt>>,
}

impl SubmittedTx {
    /// Wraps a hash and the future that resolves on inclusion.
    #[must_use]
    pub fn new(tx_hash: B256, confirmation: BoxFuture<'static, LedgerResult<FulfillReceipt>>) -> Self {
        Self {
            tx_hash,
            confirmation,
        }
    }

    /// Waits until the transaction is included.
    ///
    /// # Errors
    ///
    /// Returns error if the receipt cannot be fetched or the call reverted.
    pub async fn confirmed(self) -> LedgerResult<FulfillReceipt> {
        self.confirmation.await
    }
}

impl fmt::Debug for SubmittedTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmittedTx")
            .field("tx_hash", &self.tx_hash)
            .finish_non_exhaustive()
    }
}

/// Ledger access used by the reconciliation loop.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Current block height.
    async fn block_number(&self) -> LedgerResult<u64>;

    /// Events of `kind` in `range`, in ledger order.
    async fn events(&self, kind: EventKind, range: BlockRange) -> LedgerResult<Vec<OracleEvent>>;

    /// Sends `fulfillGuess` with the oracle credential.
    async fn submit_fulfillment(&self, call: FulfillGuess) -> LedgerResult<SubmittedTx>;
}
