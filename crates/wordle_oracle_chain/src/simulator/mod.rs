//! # Simulated Ledger
//!
//! An in-memory chain for tests and dry runs. Blocks are mined on demand,
//! events are stored as raw logs and re-parsed on fetch, and failures can be
//! scripted per call.

use std::collections::HashSet;

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use wordle_oracle_core::{encode_word, Word, WORD_LENGTH};

use crate::error::{LedgerError, LedgerResult};
use crate::events::{
    encode_log, EventKind, EventParser, GameStartedEvent, LogPosition, OracleEvent,
    PendingGuessEvent,
};
use crate::ledger::{BlockRange, FulfillGuess, FulfillReceipt, LedgerClient, SubmittedTx};

/// A log to be mined into a simulated block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulatedLog {
    /// `GameStarted(player)`
    GameStarted(Address),
    /// `PendingGuess(player, guess, attempt)`
    PendingGuess(Address, [u8; WORD_LENGTH], u64),
}

impl SimulatedLog {
    /// A pending guess for a valid word.
    #[must_use]
    pub const fn guess(player: Address, word: &Word, attempt: u64) -> Self {
        Self::PendingGuess(player, encode_word(word), attempt)
    }
}

struct RawLog {
    position: LogPosition,
    topics: Vec<B256>,
    data: Vec<u8>,
}

#[derive(Default)]
struct ChainState {
    head: u64,
    logs: Vec<RawLog>,
    block_number_failures: u32,
    event_fetch_failures: u32,
    rejecting: HashSet<Address>,
    reverting: HashSet<Address>,
    fulfilled: Vec<FulfillGuess>,
    next_tx: u64,
}

/// Scriptable in-memory ledger.
///
/// # Example
///
/// ```
/// use wordle_oracle_chain::{Address, SimulatedLedger, SimulatedLog};
///
/// let ledger = SimulatedLedger::new(100);
/// let block = ledger.mine(&[SimulatedLog::GameStarted(Address::repeat_byte(1))]);
/// assert_eq!(block, 101);
/// ```
#[derive(Default)]
pub struct SimulatedLedger {
    state: Mutex<ChainState>,
}

impl SimulatedLedger {
    /// Creates a chain whose head is `head`.
    #[must_use]
    pub fn new(head: u64) -> Self {
        Self {
            state: Mutex::new(ChainState {
                head,
                ..ChainState::default()
            }),
        }
    }

    /// Mines one block containing `logs` in order. Returns the new head.
    pub fn mine(&self, logs: &[SimulatedLog]) -> u64 {
        let mut state = self.state.lock();
        state.head += 1;
        let block_number = state.head;

        for (log_index, log) in (0u64..).zip(logs) {
            let position = LogPosition::new(block_number, log_index);
            let event = match *log {
                SimulatedLog::GameStarted(player) => {
                    OracleEvent::GameStarted(GameStartedEvent { player, position })
                }
                SimulatedLog::PendingGuess(player, guess, attempt) => {
                    OracleEvent::PendingGuess(PendingGuessEvent {
                        player,
                        guess,
                        attempt,
                        position,
                    })
                }
            };
            let (topics, data) = encode_log(&event);
            state.logs.push(RawLog {
                position,
                topics,
                data,
            });
        }

        block_number
    }

    /// Mines `count` empty blocks. Returns the new head.
    pub fn mine_empty(&self, count: u64) -> u64 {
        let mut state = self.state.lock();
        state.head += count;
        state.head
    }

    /// Current head.
    #[must_use]
    pub fn head(&self) -> u64 {
        self.state.lock().head
    }

    /// Makes the next `count` height queries fail.
    pub fn fail_block_number(&self, count: u32) {
        self.state.lock().block_number_failures = count;
    }

    /// Makes the next `count` event queries fail.
    pub fn fail_event_fetches(&self, count: u32) {
        self.state.lock().event_fetch_failures = count;
    }

    /// Rejects every submission for `player` before it is sent.
    pub fn reject_submissions_for(&self, player: Address) {
        self.state.lock().rejecting.insert(player);
    }

    /// Accepts submissions for `player` but reverts them on inclusion.
    pub fn revert_submissions_for(&self, player: Address) {
        self.state.lock().reverting.insert(player);
    }

    /// Fulfilments that were included successfully, in submission order.
    #[must_use]
    pub fn fulfillments(&self) -> Vec<FulfillGuess> {
        self.state.lock().fulfilled.clone()
    }
}

#[async_trait]
impl LedgerClient for SimulatedLedger {
    async fn block_number(&self) -> LedgerResult<u64> {
        let mut state = self.state.lock();
        if state.block_number_failures > 0 {
            state.block_number_failures -= 1;
            return Err(LedgerError::Rpc("simulated: eth_blockNumber failed".to_string()));
        }
        Ok(state.head)
    }

    async fn events(&self, kind: EventKind, range: BlockRange) -> LedgerResult<Vec<OracleEvent>> {
        let mut state = self.state.lock();
        if state.event_fetch_failures > 0 {
            state.event_fetch_failures -= 1;
            return Err(LedgerError::Rpc("simulated: eth_getLogs failed".to_string()));
        }

        let signature = kind.signature();
        let mut events: Vec<OracleEvent> = state
            .logs
            .iter()
            .filter(|log| range.contains(log.position.block_number))
            .filter(|log| log.topics.first() == Some(&signature))
            .filter_map(|log| EventParser::parse(&log.topics, &log.data, log.position))
            .collect();
        events.sort_by_key(OracleEvent::position);
        Ok(events)
    }

    async fn submit_fulfillment(&self, call: FulfillGuess) -> LedgerResult<SubmittedTx> {
        let mut state = self.state.lock();
        if state.rejecting.contains(&call.player) {
            return Err(LedgerError::Submit(
                "simulated: insufficient funds for gas".to_string(),
            ));
        }

        state.next_tx += 1;
        let tx_hash = B256::left_padding_from(&state.next_tx.to_be_bytes());
        let block_number = state.head;

        let outcome = if state.reverting.contains(&call.player) {
            Err(LedgerError::Reverted(tx_hash))
        } else {
            state.fulfilled.push(call);
            Ok(FulfillReceipt {
                tx_hash,
                block_number: Some(block_number),
            })
        };

        Ok(SubmittedTx::new(tx_hash, async move { outcome }.boxed()))
    }
}
