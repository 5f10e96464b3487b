//! # Secret Registry
//!
//! Process-lifetime map from player to the secret of their current game.
//! Nothing is persisted: a restart forgets every in-flight secret.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::word::Word;

/// Normalised player identity.
///
/// Chain addresses arrive in mixed (checksummed) case; keys are trimmed and
/// lowercased so every spelling of one address hits the same entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates a normalised player key.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_lowercase())
    }

    /// Returns the normalised key.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for log lines (`0x1234abcd…`).
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..10).unwrap_or(&self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Player -> secret word.
///
/// Last write wins. A single global lock guards the map; throughput is a few
/// events per block, so per-key locking would buy nothing.
#[derive(Default)]
pub struct SecretRegistry {
    secrets: RwLock<HashMap<PlayerId, Word>>,
}

impl SecretRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the secret for `player`, replacing any previous one.
    ///
    /// Returns the replaced secret, if there was one.
    pub fn assign(&self, player: &PlayerId, word: Word) -> Option<Word> {
        self.secrets.write().insert(player.clone(), word)
    }

    /// Looks up the secret for `player`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SecretNotFound`] when no game was seen for the player.
    pub fn lookup(&self, player: &PlayerId) -> CoreResult<Word> {
        self.secrets
            .read()
            .get(player)
            .copied()
            .ok_or_else(|| CoreError::SecretNotFound(player.to_string()))
    }

    /// Number of players with a secret.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    /// Returns true if no secret is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.read().is_empty()
    }
}

// Secrets must not end up in logs.
impl fmt::Debug for SecretRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretRegistry")
            .field("players", &self.len())
            .finish()
    }
}
