//! # Reconciliation Loop
//!
//! Polls the ledger, dispatches every new event in ledger order and advances
//! the high-water mark.
//!
//! ```text
//!        ┌─────────┐  tick   ┌─────────┐ events  ┌─────────────┐        ┌───────────┐
//!   ──▶  │  Idle   │ ──────▶ │ Polling │ ──────▶ │ Dispatching │ ─────▶ │ Advancing │ ──┐
//!        └─────────┘         └─────────┘         └─────────────┘        └───────────┘   │
//!             ▲                   │ fetch failed                                        │
//!             └───────────────────┴─────────────────────────────────────────────────────┘
//! ```
//!
//! A failed fetch leaves the mark untouched so the same range is retried.
//! Once a range has been fetched the mark advances, even when individual
//! events fail: each event is processed at most once.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wordle_oracle_chain::{
    player_id, BlockRange, EventKind, GameStartedEvent, LedgerClient, LedgerError, LedgerResult,
    OracleEvent, PendingGuessEvent,
};
use wordle_oracle_core::{decode_word_bytes, Feedback, SecretRegistry, Word, WordSource};

use crate::deadline::within;
use crate::error::{DispatchError, DispatchResult};
use crate::submitter::FeedbackSubmitter;

const LOG_TARGET: &str = "oracle::reconcile";

/// Where the loop is within a cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopPhase {
    /// Waiting for the next tick.
    #[default]
    Idle,
    /// Reading the head and fetching events.
    Polling,
    /// Handling fetched events one by one.
    Dispatching,
    /// Moving the high-water mark.
    Advancing,
}

impl fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Polling => "polling",
            Self::Dispatching => "dispatching",
            Self::Advancing => "advancing",
        };
        f.write_str(name)
    }
}

/// Counters shared with whoever holds the handle from [`Reconciler::stats`].
#[derive(Debug, Default)]
pub struct ReconcilerStats {
    /// Cycles started.
    pub cycles: AtomicU64,
    /// Cycles with no new block.
    pub idle_cycles: AtomicU64,
    /// Cycles abandoned because the ledger could not be read.
    pub fetch_failures: AtomicU64,
    /// Events handed to a handler.
    pub events_dispatched: AtomicU64,
    /// Events dropped by their handler.
    pub dispatch_failures: AtomicU64,
    /// Secrets assigned.
    pub games_started: AtomicU64,
    /// Fulfilments confirmed on-chain.
    pub fulfilments: AtomicU64,
}

impl ReconcilerStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads a counter.
    #[must_use]
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

/// Result of one cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The head has not moved past the high-water mark.
    Idle,
    /// The range was fetched and every event was attempted.
    Processed {
        /// Blocks covered.
        range: BlockRange,
        /// Events dispatched.
        events: usize,
        /// Events that were dropped.
        failures: usize,
    },
    /// The head or the events could not be read. The mark did not move.
    FetchFailed(LedgerError),
}

/// The oracle's main loop.
pub struct Reconciler {
    ledger: Arc<dyn LedgerClient>,
    registry: Arc<SecretRegistry>,
    words: Box<dyn WordSource>,
    submitter: FeedbackSubmitter,
    high_water: u64,
    phase: LoopPhase,
    rpc_timeout: Option<Duration>,
    stats: Arc<ReconcilerStats>,
}

impl Reconciler {
    /// Creates a loop that considers every block up to `start_block` processed.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerClient>, words: Box<dyn WordSource>, start_block: u64) -> Self {
        Self {
            submitter: FeedbackSubmitter::new(Arc::clone(&ledger), None),
            ledger,
            registry: Arc::new(SecretRegistry::new()),
            words,
            high_water: start_block,
            phase: LoopPhase::Idle,
            rpc_timeout: None,
            stats: Arc::new(ReconcilerStats::default()),
        }
    }

    /// Starts from the ledger's current head. Events already on-chain are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if the head cannot be read.
    pub async fn from_head(
        ledger: Arc<dyn LedgerClient>,
        words: Box<dyn WordSource>,
    ) -> LedgerResult<Self> {
        let head = ledger.block_number().await?;
        Ok(Self::new(ledger, words, head))
    }

    /// Shares `registry` with the loop instead of a private one.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<SecretRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Bounds every ledger call by `timeout`.
    #[must_use]
    pub fn with_rpc_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.rpc_timeout = timeout;
        self.submitter = FeedbackSubmitter::new(Arc::clone(&self.ledger), timeout);
        self
    }

    /// Last block whose events have been handled.
    #[must_use]
    pub const fn high_water_mark(&self) -> u64 {
        self.high_water
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Shared secret registry.
    #[must_use]
    pub fn registry(&self) -> Arc<SecretRegistry> {
        Arc::clone(&self.registry)
    }

    /// Shared counters.
    #[must_use]
    pub fn stats(&self) -> Arc<ReconcilerStats> {
        Arc::clone(&self.stats)
    }

    /// Runs cycles every `poll_interval` until `shutdown` fires.
    ///
    /// A cycle in progress always completes. Returns the final high-water mark.
    pub async fn run(mut self, poll_interval: Duration, shutdown: CancellationToken) -> u64 {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            target: LOG_TARGET,
            from_block = self.high_water,
            poll_ms = u64::try_from(poll_interval.as_millis()).unwrap_or(u64::MAX),
            "oracle loop started"
        );

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.run_cycle().await;
        }

        info!(
            target: LOG_TARGET,
            high_water = self.high_water,
            cycles = ReconcilerStats::get(&self.stats.cycles),
            fulfilments = ReconcilerStats::get(&self.stats.fulfilments),
            dropped = ReconcilerStats::get(&self.stats.dispatch_failures),
            "oracle loop stopped"
        );

        self.high_water
    }

    /// Performs one poll, dispatch and advance.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        ReconcilerStats::bump(&self.stats.cycles);
        self.phase = LoopPhase::Polling;

        let outcome = match self.poll().await {
            Ok(None) => {
                ReconcilerStats::bump(&self.stats.idle_cycles);
                CycleOutcome::Idle
            }
            Ok(Some((range, events))) => {
                self.phase = LoopPhase::Dispatching;
                let failures = self.dispatch_all(&events).await;

                self.phase = LoopPhase::Advancing;
                self.high_water = range.to;
                debug!(target: LOG_TARGET, %range, events = events.len(), failures, "range processed");

                CycleOutcome::Processed {
                    range,
                    events: events.len(),
                    failures,
                }
            }
            Err(e) => {
                ReconcilerStats::bump(&self.stats.fetch_failures);
                warn!(
                    target: LOG_TARGET,
                    high_water = self.high_water,
                    error = %e,
                    "poll failed, retrying next tick"
                );
                CycleOutcome::FetchFailed(e)
            }
        };

        self.phase = LoopPhase::Idle;
        outcome
    }

    /// Reads the head and, if it moved, both event kinds merged in ledger order.
    async fn poll(&self) -> LedgerResult<Option<(BlockRange, Vec<OracleEvent>)>> {
        let head = within(self.rpc_timeout, "eth_blockNumber", self.ledger.block_number()).await?;
        let range = BlockRange::new(self.high_water, head);
        if range.is_empty() {
            return Ok(None);
        }

        let mut events = Vec::new();
        for kind in EventKind::ALL {
            let batch = within(self.rpc_timeout, "eth_getLogs", self.ledger.events(kind, range)).await?;
            events.extend(batch.into_iter().filter(|e| range.contains(e.position().block_number)));
        }
        events.sort_by_key(OracleEvent::position);

        Ok(Some((range, events)))
    }

    async fn dispatch_all(&mut self, events: &[OracleEvent]) -> usize {
        let mut failures = 0;
        for event in events {
            ReconcilerStats::bump(&self.stats.events_dispatched);
            if let Err(e) = self.dispatch(event).await {
                failures += 1;
                ReconcilerStats::bump(&self.stats.dispatch_failures);
                self.report_dropped(event, &e);
            }
        }
        failures
    }

    async fn dispatch(&mut self, event: &OracleEvent) -> DispatchResult<()> {
        match event {
            OracleEvent::GameStarted(started) => {
                self.on_game_started(started);
                Ok(())
            }
            OracleEvent::PendingGuess(guess) => self.on_pending_guess(guess).await,
        }
    }

    fn on_game_started(&mut self, event: &GameStartedEvent) {
        let player = player_id(&event.player);
        let secret = self.words.pick();
        let replaced = self.registry.assign(&player, secret).is_some();
        ReconcilerStats::bump(&self.stats.games_started);

        info!(
            target: LOG_TARGET,
            player = %player,
            position = %event.position,
            replaced,
            "secret assigned"
        );
        debug!(target: LOG_TARGET, player = %player, %secret, "secret word");
    }

    async fn on_pending_guess(&self, event: &PendingGuessEvent) -> DispatchResult<()> {
        let player = player_id(&event.player);
        let secret = self.registry.lookup(&player).map_err(DispatchError::NoSecret)?;

        let text = decode_word_bytes(&event.guess);
        let feedback = match Word::parse(&text) {
            Ok(guess) => {
                let feedback = Feedback::evaluate(&guess, &secret, event.attempt);
                info!(
                    target: LOG_TARGET,
                    player = %player,
                    attempt = event.attempt,
                    %guess,
                    hints = %feedback.describe(),
                    won = feedback.won,
                    game_over = feedback.game_over,
                    "guess scored"
                );
                feedback
            }
            Err(e) => {
                // The contract still waits on this attempt, so answer it.
                let feedback = Feedback::unscorable(event.attempt);
                error!(
                    target: LOG_TARGET,
                    player = %player,
                    attempt = event.attempt,
                    guess = ?text,
                    error = %e,
                    game_over = feedback.game_over,
                    "unscorable guess, answering all Absent"
                );
                feedback
            }
        };

        self.submitter
            .submit(event.player, event.attempt, &feedback)
            .await?;
        ReconcilerStats::bump(&self.stats.fulfilments);
        Ok(())
    }

    fn report_dropped(&self, event: &OracleEvent, err: &DispatchError) {
        let attempt = match event {
            OracleEvent::PendingGuess(guess) => Some(guess.attempt),
            OracleEvent::GameStarted(_) => None,
        };
        // The mark still advances; this event will not be seen again.
        error!(
            target: LOG_TARGET,
            kind = %event.kind(),
            player = %event.player(),
            attempt = ?attempt,
            position = %event.position(),
            error = %err,
            "event dropped, operator attention required"
        );
    }
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("high_water", &self.high_water)
            .field("phase", &self.phase)
            .field("rpc_timeout", &self.rpc_timeout)
            .field("games", &self.registry.len())
            .finish_non_exhaustive()
    }
}
