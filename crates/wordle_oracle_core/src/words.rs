//! # Word Sources
//!
//! Secret selection policy. The registry only ever sees a [`Word`], so the
//! policy can change (bigger corpus, commit/reveal) without touching
//! `assign`/`lookup`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{CoreError, CoreResult};
use crate::word::Word;

/// The built-in closed word list.
pub const DEFAULT_WORDS: [&str; 20] = [
    "REACT", "CHAIN", "BLOCK", "SMART", "TOKEN", "WORLD", "HELLO", "SNAKE", "GRAPE", "LEMON",
    "APPLE", "BRAIN", "CLOUD", "DANCE", "EAGLE", "FLAME", "GHOST", "HEART", "JUICE", "KNIFE",
];

/// Supplies secrets for new games.
pub trait WordSource: Send + Sync {
    /// Picks the secret for a new game.
    fn pick(&mut self) -> Word;
}

/// Uniform random selection from a closed list.
pub struct WordList {
    words: Vec<Word>,
    rng: StdRng,
}

impl WordList {
    /// Builds a list from raw words, seeded from OS entropy.
    ///
    /// Words are normalised to uppercase and deduplicated, keeping first
    /// occurrence order.
    ///
    /// # Errors
    ///
    /// Returns error if any word is invalid or the list is empty.
    pub fn new<S: AsRef<str>>(words: &[S]) -> CoreResult<Self> {
        Self::with_rng(words, StdRng::from_entropy())
    }

    /// Same as [`WordList::new`] with a fixed seed, for reproducible runs.
    ///
    /// # Errors
    ///
    /// Returns error if any word is invalid or the list is empty.
    pub fn seeded<S: AsRef<str>>(words: &[S], seed: u64) -> CoreResult<Self> {
        Self::with_rng(words, StdRng::seed_from_u64(seed))
    }

    /// The built-in list, seeded from OS entropy.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            words: builtin_words(),
            rng: StdRng::from_entropy(),
        }
    }

    fn with_rng<S: AsRef<str>>(words: &[S], rng: StdRng) -> CoreResult<Self> {
        let mut parsed: Vec<Word> = Vec::with_capacity(words.len());
        for raw in words {
            let word = Word::parse(raw.as_ref().trim())?;
            if !parsed.contains(&word) {
                parsed.push(word);
            }
        }
        if parsed.is_empty() {
            return Err(CoreError::EmptyWordList);
        }
        Ok(Self { words: parsed, rng })
    }

    /// Number of distinct candidate words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false: empty lists are rejected at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns true if `word` is a candidate.
    #[must_use]
    pub fn contains(&self, word: &Word) -> bool {
        self.words.contains(word)
    }
}

impl WordSource for WordList {
    fn pick(&mut self) -> Word {
        // Non-empty by construction.
        *self
            .words
            .choose(&mut self.rng)
            .unwrap_or(&self.words[0])
    }
}

fn builtin_words() -> Vec<Word> {
    DEFAULT_WORDS
        .iter()
        .filter_map(|w| Word::parse(w).ok())
        .collect()
}
