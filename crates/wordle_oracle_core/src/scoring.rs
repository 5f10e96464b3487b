//! # Scoring Engine
//!
//! Positional feedback for a guess against a secret.
//!
//! ## Algorithm
//!
//! Two passes over the five positions:
//!
//! 1. Exact matches become `Correct` and consume both the guess and the
//!    secret position.
//! 2. Every unconsumed guess letter takes the first unconsumed secret position
//!    holding the same letter (ascending order) and becomes `Present`.
//!
//! Everything else stays `Absent`. The consumption bookkeeping is what keeps a
//! doubled guess letter from scoring twice against a single secret letter.

use crate::error::{CoreError, CoreResult};
use crate::word::{Word, WORD_LENGTH};

/// Maximum number of guesses per game.
pub const MAX_ATTEMPTS: u64 = 6;

/// Zero-based index of the final guess.
pub const LAST_ATTEMPT_INDEX: u64 = MAX_ATTEMPTS - 1;

/// Per-letter feedback.
///
/// The discriminants mirror the contract's `LetterStatus` enum and are written
/// on-chain as `uint8`. Never reorder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LetterStatus {
    /// Right letter, right position.
    Correct = 0,
    /// Letter occurs elsewhere in the secret.
    Present = 1,
    /// Letter does not occur (or all occurrences are consumed).
    Absent = 2,
    /// No letter yet. Only the contract uses this.
    Empty = 3,
}

impl LetterStatus {
    /// Returns the on-chain discriminant.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts an on-chain discriminant back into a status.
    ///
    /// # Errors
    ///
    /// Returns error for discriminants outside the enum.
    pub fn from_u8(value: u8) -> CoreResult<Self> {
        match value {
            0 => Ok(Self::Correct),
            1 => Ok(Self::Present),
            2 => Ok(Self::Absent),
            3 => Ok(Self::Empty),
            other => Err(CoreError::UnknownStatus(other)),
        }
    }

    /// Display name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Correct => "Correct",
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Empty => "Empty",
        }
    }
}

/// Scores `guess` against `secret`.
///
/// Both words are uppercase by construction, so comparison is
/// case-insensitive with respect to the original input.
#[must_use]
pub fn score(guess: &Word, secret: &Word) -> [LetterStatus; WORD_LENGTH] {
    let guess = guess.letters();
    let secret = secret.letters();

    let mut statuses = [LetterStatus::Absent; WORD_LENGTH];
    let mut secret_used = [false; WORD_LENGTH];
    let mut guess_used = [false; WORD_LENGTH];

    for i in 0..WORD_LENGTH {
        if guess[i] == secret[i] {
            statuses[i] = LetterStatus::Correct;
            secret_used[i] = true;
            guess_used[i] = true;
        }
    }

    for i in 0..WORD_LENGTH {
        if guess_used[i] {
            continue;
        }
        for j in 0..WORD_LENGTH {
            if !secret_used[j] && guess[i] == secret[j] {
                statuses[i] = LetterStatus::Present;
                secret_used[j] = true;
                break;
            }
        }
    }

    statuses
}

/// Feedback for one guess, ready to be written back on-chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Feedback {
    /// Per-position statuses, aligned with the guess.
    pub statuses: [LetterStatus; WORD_LENGTH],
    /// The guess equals the secret.
    pub won: bool,
    /// The game ends with this guess.
    pub game_over: bool,
}

impl Feedback {
    /// Scores a guess and applies the game-over policy.
    ///
    /// `attempt` is the zero-based index reported by the ledger; the game is
    /// over when the guess wins or when the sixth attempt (index 5) was used.
    #[must_use]
    pub fn evaluate(guess: &Word, secret: &Word, attempt: u64) -> Self {
        let statuses = score(guess, secret);
        let won = guess == secret;
        Self {
            statuses,
            won,
            game_over: won || attempt >= LAST_ATTEMPT_INDEX,
        }
    }

    /// Feedback for a guess that is not a five-letter word: every position
    /// Absent, never a win, and the same game-over rule as a scored miss.
    #[must_use]
    pub const fn unscorable(attempt: u64) -> Self {
        Self {
            statuses: [LetterStatus::Absent; WORD_LENGTH],
            won: false,
            game_over: attempt >= LAST_ATTEMPT_INDEX,
        }
    }

    /// Returns the statuses as the contract's `uint8[5]`.
    #[must_use]
    pub fn hints(&self) -> [u8; WORD_LENGTH] {
        self.statuses.map(LetterStatus::as_u8)
    }

    /// Comma-separated status names, for logs.
    #[must_use]
    pub fn describe(&self) -> String {
        self.statuses
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
