//! # Wordle Oracle Core
//!
//! The off-chain half of a commit-style guessing game: the contract never sees
//! the secret word, so everything that needs it lives here.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐   assign    ┌─────────────────┐
//! │  WordSource     │ ──────────▶ │  SecretRegistry │
//! │  (closed list)  │             │  player -> word │
//! └─────────────────┘             └────────┬────────┘
//!                                          │ lookup
//!                                          ▼
//! ┌─────────────────┐   decode    ┌─────────────────┐
//! │  bytes5 guess   │ ──────────▶ │  Scoring Engine │ ──▶ [LetterStatus; 5]
//! └─────────────────┘             └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `word`: validated five-letter words and the bytes5 codec
//! - `scoring`: the two-pass feedback algorithm and game-over policy
//! - `registry`: per-player secrets
//! - `words`: secret selection policy

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod registry;
pub mod scoring;
pub mod word;
pub mod words;

pub use error::{CoreError, CoreResult};
pub use registry::{PlayerId, SecretRegistry};
pub use scoring::{
    score, Feedback, LetterStatus, LAST_ATTEMPT_INDEX, MAX_ATTEMPTS,
};
pub use word::{decode_word_bytes, encode_word, Word, WORD_LENGTH};
pub use words::{WordList, WordSource, DEFAULT_WORDS};
