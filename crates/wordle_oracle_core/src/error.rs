//! # Core Error Types
//!
//! All errors that can occur while validating words, scoring guesses and
//! looking up secrets.

use thiserror::Error;

/// Errors that can occur in the oracle core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A word did not have exactly five characters.
    #[error("word must have exactly {expected} letters, got {actual}")]
    InvalidLength {
        /// The required length.
        expected: usize,
        /// The length that was supplied.
        actual: usize,
    },

    /// A word contained something other than an ASCII letter.
    #[error("word contains non-alphabetic character {character:?} at position {position}")]
    InvalidCharacter {
        /// The offending character.
        character: char,
        /// Zero-based position of the character.
        position: usize,
    },

    /// A status discriminant outside the on-chain enum.
    #[error("unknown letter status discriminant: {0}")]
    UnknownStatus(u8),

    /// No secret is assigned to the player.
    #[error("no secret word assigned to player {0}")]
    SecretNotFound(String),

    /// A word list with nothing in it.
    #[error("word list is empty")]
    EmptyWordList,
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
