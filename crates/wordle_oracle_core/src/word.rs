//! # Words and the bytes5 Codec
//!
//! Guesses travel on the ledger as a fixed 5-byte value. The all-zero value
//! means "no guess" and decoding never fails: anything undecodable becomes the
//! empty string.

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Number of letters in every word.
pub const WORD_LENGTH: usize = 5;

/// A validated five-letter word, stored as uppercase ASCII.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Word([u8; WORD_LENGTH]);

impl Word {
    /// Parses a word, normalising it to uppercase.
    ///
    /// # Errors
    ///
    /// Returns error if the input is not exactly five ASCII letters.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let actual = input.chars().count();
        if actual != WORD_LENGTH {
            return Err(CoreError::InvalidLength {
                expected: WORD_LENGTH,
                actual,
            });
        }

        let mut letters = [0u8; WORD_LENGTH];
        for (position, character) in input.chars().enumerate() {
            if !character.is_ascii_alphabetic() {
                return Err(CoreError::InvalidCharacter {
                    character,
                    position,
                });
            }
            // ASCII letters are one byte each.
            letters[position] = character.to_ascii_uppercase() as u8;
        }

        Ok(Self(letters))
    }

    /// Returns the uppercase letters.
    #[inline]
    #[must_use]
    pub const fn letters(&self) -> &[u8; WORD_LENGTH] {
        &self.0
    }

    /// Returns the word as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl FromStr for Word {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encodes a word into its on-chain bytes5 form.
#[inline]
#[must_use]
pub const fn encode_word(word: &Word) -> [u8; WORD_LENGTH] {
    word.0
}

/// Decodes an on-chain bytes5 value.
///
/// - all-zero decodes to `""`
/// - invalid UTF-8 decodes to `""`
/// - leading whitespace and trailing whitespace or NUL padding are dropped
///
/// The result is not validated; callers parse it with [`Word::parse`].
#[must_use]
pub fn decode_word_bytes(raw: &[u8; WORD_LENGTH]) -> String {
    if raw.iter().all(|b| *b == 0) {
        return String::new();
    }

    match std::str::from_utf8(raw) {
        Ok(text) => text
            .trim_end_matches(|c: char| c.is_whitespace() || c == '\0')
            .trim_start()
            .to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalises_case() {
        let word = Word::parse("rEaCt").unwrap();
        assert_eq!(word.as_str(), "REACT");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            Word::parse("TOOLONG"),
            Err(CoreError::InvalidLength {
                expected: 5,
                actual: 7
            })
        );
        assert_eq!(
            Word::parse("AB1DE"),
            Err(CoreError::InvalidCharacter {
                character: '1',
                position: 2
            })
        );
        assert!(Word::parse("").is_err());
        assert!(Word::parse("ÄBCDE").is_err());
    }

    #[test]
    fn test_codec_round_trip() {
        for text in ["REACT", "CHAIN", "ZZZZZ", "AAAAA", "KNIFE"] {
            let word = Word::parse(text).unwrap();
            let decoded = decode_word_bytes(&encode_word(&word));
            assert_eq!(decoded, text);
            assert_eq!(Word::parse(&decoded).unwrap(), word);
        }
    }

    #[test]
    fn test_codec_round_trip_every_letter_every_position() {
        for position in 0..WORD_LENGTH {
            for letter in b'A'..=b'Z' {
                let mut bytes = *b"QUERY";
                bytes[position] = letter;
                let text = std::str::from_utf8(&bytes).unwrap();

                let word = Word::parse(text).unwrap();
                assert_eq!(encode_word(&word), bytes);
                assert_eq!(decode_word_bytes(&encode_word(&word)), text);
            }
        }
    }

    #[test]
    fn test_zero_value_decodes_to_empty() {
        assert_eq!(decode_word_bytes(&[0u8; 5]), "");
    }

    #[test]
    fn test_decode_strips_padding() {
        assert_eq!(decode_word_bytes(b"ABC  "), "ABC");
        assert_eq!(decode_word_bytes(b"ABCD\0"), "ABCD");
        assert_eq!(decode_word_bytes(b" ABCD"), "ABCD");
    }

    #[test]
    fn test_decode_invalid_utf8_is_empty() {
        assert_eq!(decode_word_bytes(&[0xff, 0xfe, 0x41, 0x42, 0x43]), "");
    }
}
