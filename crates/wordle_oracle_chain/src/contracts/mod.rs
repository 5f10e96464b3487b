//! # Contract Definitions
//!
//! The Wordle game contract surface consumed by the oracle. This is a fixed
//! external interface; the oracle does not own the contract.

// The sol! macro generates code that we can't document, so allow missing_docs
#![allow(missing_docs)]

use alloy::sol;

sol! {
    /// The Wordle game contract.
    ///
    /// Players call `startGame`/`submitGuess`; the contract cannot score a guess
    /// because the secret never goes on-chain, so it emits `PendingGuess` and
    /// waits for the oracle's `fulfillGuess`.
    #[sol(rpc)]
    #[derive(Debug)]
    interface IWordleGame {
        /// Emitted when a player starts a new game.
        event GameStarted(address indexed player);

        /// Emitted when a guess is waiting for feedback.
        event PendingGuess(address indexed player, bytes5 guess, uint256 attempt);

        /// Writes feedback for the player's pending guess (oracle only).
        ///
        /// `hints` uses the LetterStatus enum: Correct=0, Present=1, Absent=2, Empty=3.
        function fulfillGuess(address player, uint8[5] hints, bool won, bool gameOver) external;
    }
}
