//! # Wordle Oracle
//!
//! The long-running service: watches the game contract, assigns secrets,
//! scores guesses and writes feedback back.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐  poll   ┌─────────────────┐  score  ┌─────────────────┐
//! │  LedgerClient   │ ──────▶ │   Reconciler    │ ──────▶ │    Submitter    │
//! │  (height, logs) │         │  high-water mark│         │  fulfillGuess   │
//! └─────────────────┘         └────────┬────────┘         └────────┬────────┘
//!          ▲                           │ assign / lookup           │
//!          │                           ▼                           │
//!          │                  ┌─────────────────┐                  │
//!          │                  │ SecretRegistry  │                  │
//!          │                  └─────────────────┘                  │
//!          └───────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: file, environment and CLI settings
//! - `reconcile`: the poll, dispatch, advance loop
//! - `submitter`: one confirmed `fulfillGuess` per scored guess
//! - `telemetry`: tracing subscriber setup

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod reconcile;
pub mod submitter;
pub mod telemetry;

mod deadline;

pub use config::{ConfigOverrides, OracleConfig, DEFAULT_CONFIG_PATH, DEFAULT_POLL_INTERVAL_MS};
pub use error::{ConfigError, DispatchError, DispatchResult};
pub use reconcile::{CycleOutcome, LoopPhase, Reconciler, ReconcilerStats};
pub use submitter::FeedbackSubmitter;
