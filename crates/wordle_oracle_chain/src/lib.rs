//! # Wordle Oracle Chain Bridge
//!
//! Everything the oracle knows about the ledger.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐    Logs     ┌─────────────────┐
//! │  Wordle         │ ──────────▶ │  EventParser    │ ──▶ OracleEvent
//! │  Contract       │             └─────────────────┘
//! │                 │ fulfillGuess┌─────────────────┐
//! │                 │ ◀────────── │  LedgerClient   │ ◀── FulfillGuess
//! └─────────────────┘             └─────────────────┘
//! ```
//!
//! [`LedgerClient`] is the seam: [`RpcLedger`] talks JSON-RPC through alloy,
//! [`SimulatedLedger`] keeps a scripted chain in memory.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod contracts;
pub mod error;
pub mod events;
pub mod ledger;
pub mod simulator;

pub use contracts::IWordleGame;
pub use error::{LedgerError, LedgerResult};
pub use events::{
    player_id, EventKind, EventParser, GameStartedEvent, LogPosition, OracleEvent,
    PendingGuessEvent,
};
pub use ledger::rpc::RpcLedger;
pub use ledger::{BlockRange, FulfillGuess, FulfillReceipt, LedgerClient, SubmittedTx};
pub use simulator::{SimulatedLedger, SimulatedLog};

pub use alloy::primitives::{Address, B256};
