//! # Oracle Events
//!
//! Game-lifecycle events and parsing from raw log data.
//!
//! The contract indexes `player`, but older deployments emitted it as plain
//! data. The parser accepts both layouts.

use std::fmt;

use alloy::primitives::{Address, B256};
use alloy::sol_types::SolEvent;
use wordle_oracle_core::{PlayerId, WORD_LENGTH};

use crate::contracts::IWordleGame;

/// ABI word size.
const WORD: usize = 32;

/// The two event kinds the oracle consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `GameStarted(address player)`
    GameStarted,
    /// `PendingGuess(address player, bytes5 guess, uint256 attempt)`
    PendingGuess,
}

impl EventKind {
    /// Every kind, in the order the oracle queries them.
    pub const ALL: [Self; 2] = [Self::GameStarted, Self::PendingGuess];

    /// The event's topic0.
    #[must_use]
    pub const fn signature(self) -> B256 {
        match self {
            Self::GameStarted => IWordleGame::GameStarted::SIGNATURE_HASH,
            Self::PendingGuess => IWordleGame::PendingGuess::SIGNATURE_HASH,
        }
    }

    /// Matches a topic0 against the known kinds.
    #[must_use]
    pub fn from_signature(topic0: &B256) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.signature() == *topic0)
    }

    /// Event name, for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GameStarted => "GameStarted",
            Self::PendingGuess => "PendingGuess",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a log sits in the ledger. Ordering is ledger order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogPosition {
    /// Block containing the log.
    pub block_number: u64,
    /// Index of the log within its block.
    pub log_index: u64,
}

impl LogPosition {
    /// Creates a position.
    #[must_use]
    pub const fn new(block_number: u64, log_index: u64) -> Self {
        Self {
            block_number,
            log_index,
        }
    }
}

impl fmt::Display for LogPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_number, self.log_index)
    }
}

/// A player started a new game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameStartedEvent {
    /// The player.
    pub player: Address,
    /// Ledger position.
    pub position: LogPosition,
}

/// A player submitted a guess that needs feedback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingGuessEvent {
    /// The player.
    pub player: Address,
    /// The guess in its raw bytes5 form.
    pub guess: [u8; WORD_LENGTH],
    /// Zero-based attempt index (0..=5). Saturates if the ledger sent more than 64 bits.
    pub attempt: u64,
    /// Ledger position.
    pub position: LogPosition,
}

/// Any event the oracle acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OracleEvent {
    /// Assign a secret.
    GameStarted(GameStartedEvent),
    /// Score and write back.
    PendingGuess(PendingGuessEvent),
}

impl OracleEvent {
    /// Ledger position of the underlying log.
    #[must_use]
    pub const fn position(&self) -> LogPosition {
        match self {
            Self::GameStarted(e) => e.position,
            Self::PendingGuess(e) => e.position,
        }
    }

    /// The event kind.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::GameStarted(_) => EventKind::GameStarted,
            Self::PendingGuess(_) => EventKind::PendingGuess,
        }
    }

    /// The player the event belongs to.
    #[must_use]
    pub const fn player(&self) -> Address {
        match self {
            Self::GameStarted(e) => e.player,
            Self::PendingGuess(e) => e.player,
        }
    }
}

/// Registry key for a chain address.
#[must_use]
pub fn player_id(address: &Address) -> PlayerId {
    PlayerId::new(&address.to_string())
}

/// Event parser for raw log data.
///
/// Parses directly from topic and data bytes; anything short or unknown
/// yields `None`.
pub struct EventParser;

impl EventParser {
    /// Parses a log of either kind, dispatching on topic0.
    #[must_use]
    pub fn parse(topics: &[B256], data: &[u8], position: LogPosition) -> Option<OracleEvent> {
        match EventKind::from_signature(topics.first()?)? {
            EventKind::GameStarted => {
                Self::parse_game_started(topics, data, position).map(OracleEvent::GameStarted)
            }
            EventKind::PendingGuess => {
                Self::parse_pending_guess(topics, data, position).map(OracleEvent::PendingGuess)
            }
        }
    }

    /// Parses a `GameStarted` log.
    #[must_use]
    pub fn parse_game_started(
        topics: &[B256],
        data: &[u8],
        position: LogPosition,
    ) -> Option<GameStartedEvent> {
        let player = match topics.get(1) {
            Some(topic) => address_from_word(topic.as_slice())?,
            None => address_from_word(data.get(..WORD)?)?,
        };

        Some(GameStartedEvent { player, position })
    }

    /// Parses a `PendingGuess` log.
    ///
    /// Data layout with indexed player: `guess(32) | attempt(32)`.
    /// Without: `player(32) | guess(32) | attempt(32)`.
    #[must_use]
    pub fn parse_pending_guess(
        topics: &[B256],
        data: &[u8],
        position: LogPosition,
    ) -> Option<PendingGuessEvent> {
        let (player, body) = match topics.get(1) {
            Some(topic) => (address_from_word(topic.as_slice())?, data),
            None => (
                address_from_word(data.get(..WORD)?)?,
                data.get(WORD..)?,
            ),
        };

        if body.len() < 2 * WORD {
            return None;
        }

        // bytes5 is left-aligned in its word
        let mut guess = [0u8; WORD_LENGTH];
        guess.copy_from_slice(&body[..WORD_LENGTH]);

        let attempt = u64_from_word(&body[WORD..2 * WORD]);

        Some(PendingGuessEvent {
            player,
            guess,
            attempt,
            position,
        })
    }
}

/// An address occupies the low 20 bytes of a word.
fn address_from_word(word: &[u8]) -> Option<Address> {
    if word.len() != WORD {
        return None;
    }
    Some(Address::from_slice(&word[12..WORD]))
}

fn u64_from_word(word: &[u8]) -> u64 {
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return u64::MAX;
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[WORD - 8..WORD]);
    u64::from_be_bytes(low)
}

/// Encodes events back into `(topics, data)`; the simulator emits logs this way.
pub(crate) fn encode_log(event: &OracleEvent) -> (Vec<B256>, Vec<u8>) {
    match event {
        OracleEvent::GameStarted(e) => (
            vec![EventKind::GameStarted.signature(), e.player.into_word()],
            Vec::new(),
        ),
        OracleEvent::PendingGuess(e) => {
            let mut data = vec![0u8; 2 * WORD];
            data[..WORD_LENGTH].copy_from_slice(&e.guess);
            data[2 * WORD - 8..].copy_from_slice(&e.attempt.to_be_bytes());
            (
                vec![EventKind::PendingGuess.signature(), e.player.into_word()],
                data,
            )
        }
    }
}
