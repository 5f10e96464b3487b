//! # Reconciliation Loop Tests
//!
//! Drives the [`Reconciler`] against a scripted in-memory chain.
//!
//! Run with: cargo test -p wordle_oracle --test reconcile_test

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wordle_oracle::{CycleOutcome, Reconciler, ReconcilerStats};
use wordle_oracle_chain::{player_id, Address, BlockRange, SimulatedLedger, SimulatedLog};
use wordle_oracle_core::{Word, WordSource};

/// Hands out secrets in a fixed order, repeating the last one.
struct Scripted(VecDeque<Word>);

impl Scripted {
    fn new(words: &[&str]) -> Box<Self> {
        Box::new(Self(words.iter().map(|w| Word::parse(w).unwrap()).collect()))
    }
}

impl WordSource for Scripted {
    fn pick(&mut self) -> Word {
        if self.0.len() > 1 {
            self.0.pop_front().unwrap()
        } else {
            self.0[0]
        }
    }
}

fn word(text: &str) -> Word {
    Word::parse(text).unwrap()
}

fn alice() -> Address {
    Address::repeat_byte(0xa1)
}

fn bob() -> Address {
    Address::repeat_byte(0xb0)
}

fn oracle(ledger: &Arc<SimulatedLedger>, secrets: &[&str]) -> Reconciler {
    Reconciler::new(ledger.clone(), Scripted::new(secrets), ledger.head())
}

// ============================================================================
// ORDERING
// ============================================================================

#[tokio::test]
async fn verify_start_and_guess_in_one_range() {
    let ledger = Arc::new(SimulatedLedger::new(100));
    let mut oracle = oracle(&ledger, &["REACT"]);

    ledger.mine(&[
        SimulatedLog::GameStarted(alice()),
        SimulatedLog::guess(alice(), &word("TRACE"), 0),
    ]);

    let outcome = oracle.run_cycle().await;
    assert_eq!(
        outcome,
        CycleOutcome::Processed {
            range: BlockRange::new(100, 101),
            events: 2,
            failures: 0,
        }
    );

    let written = ledger.fulfillments();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].player, alice());
    assert_eq!(written[0].hints, [1, 1, 0, 0, 1]);
    assert!(!written[0].won);
    assert!(!written[0].game_over);
}

#[tokio::test]
async fn verify_events_merged_in_ledger_order() {
    let ledger = Arc::new(SimulatedLedger::new(0));
    let mut oracle = oracle(&ledger, &["REACT", "GHOST"]);

    // The guess sits between two starts and must see the first secret.
    ledger.mine(&[SimulatedLog::GameStarted(alice())]);
    ledger.mine(&[SimulatedLog::guess(alice(), &word("GHOST"), 0)]);
    ledger.mine(&[SimulatedLog::GameStarted(alice())]);

    oracle.run_cycle().await;

    let written = ledger.fulfillments();
    assert_eq!(written.len(), 1);
    assert!(!written[0].won);
    assert_eq!(oracle.registry().lookup(&player_id(&alice())).unwrap(), word("GHOST"));
}

#[tokio::test]
async fn verify_restart_replaces_secret() {
    let ledger = Arc::new(SimulatedLedger::new(0));
    let mut oracle = oracle(&ledger, &["REACT", "GHOST"]);

    ledger.mine(&[SimulatedLog::GameStarted(alice())]);
    ledger.mine(&[SimulatedLog::GameStarted(alice())]);
    ledger.mine(&[SimulatedLog::guess(alice(), &word("GHOST"), 0)]);

    oracle.run_cycle().await;

    let written = ledger.fulfillments();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].hints, [0; 5]);
    assert!(written[0].won);
    assert!(written[0].game_over);
    assert_eq!(oracle.registry().len(), 1);
}

// ============================================================================
// HIGH-WATER MARK
// ============================================================================

#[tokio::test]
async fn verify_idle_when_head_has_not_moved() {
    let ledger = Arc::new(SimulatedLedger::new(7));
    let mut oracle = oracle(&ledger, &["REACT"]);

    assert_eq!(oracle.run_cycle().await, CycleOutcome::Idle);
    assert_eq!(oracle.high_water_mark(), 7);
    assert_eq!(ReconcilerStats::get(&oracle.stats().idle_cycles), 1);
}

#[tokio::test]
async fn verify_fetch_failure_keeps_mark() {
    let ledger = Arc::new(SimulatedLedger::new(10));
    let mut oracle = oracle(&ledger, &["REACT"]);

    ledger.mine(&[SimulatedLog::GameStarted(alice())]);
    ledger.mine_empty(8);
    ledger.mine(&[SimulatedLog::guess(alice(), &word("REACT"), 0)]);
    assert_eq!(ledger.head(), 20);

    ledger.fail_block_number(1);
    assert!(matches!(oracle.run_cycle().await, CycleOutcome::FetchFailed(_)));
    assert_eq!(oracle.high_water_mark(), 10);

    ledger.fail_event_fetches(1);
    assert!(matches!(oracle.run_cycle().await, CycleOutcome::FetchFailed(_)));
    assert_eq!(oracle.high_water_mark(), 10);
    assert!(oracle.registry().is_empty());

    let outcome = oracle.run_cycle().await;
    assert_eq!(
        outcome,
        CycleOutcome::Processed {
            range: BlockRange::new(10, 20),
            events: 2,
            failures: 0,
        }
    );
    assert_eq!(oracle.high_water_mark(), 20);
    assert_eq!(ledger.fulfillments().len(), 1);
    assert_eq!(ReconcilerStats::get(&oracle.stats().fetch_failures), 2);
}

#[tokio::test]
async fn verify_mark_advances_past_failed_events() {
    let ledger = Arc::new(SimulatedLedger::new(10));
    let mut oracle = oracle(&ledger, &["REACT"]);

    // Bob never started a game.
    ledger.mine(&[SimulatedLog::guess(bob(), &word("CHAIN"), 0)]);
    ledger.mine_empty(9);

    let outcome = oracle.run_cycle().await;
    assert!(matches!(outcome, CycleOutcome::Processed { events: 1, failures: 1, .. }));
    assert_eq!(oracle.high_water_mark(), 20);
    assert!(ledger.fulfillments().is_empty());

    // Not retried.
    assert_eq!(oracle.run_cycle().await, CycleOutcome::Idle);
    assert!(ledger.fulfillments().is_empty());
}

#[tokio::test]
async fn verify_history_before_start_is_ignored() {
    let ledger = Arc::new(SimulatedLedger::new(0));
    ledger.mine(&[SimulatedLog::GameStarted(alice())]);

    let mut oracle = oracle(&ledger, &["REACT"]);
    ledger.mine(&[SimulatedLog::guess(alice(), &word("REACT"), 0)]);

    let outcome = oracle.run_cycle().await;
    assert!(matches!(outcome, CycleOutcome::Processed { events: 1, failures: 1, .. }));
    assert!(oracle.registry().is_empty());
}

// ============================================================================
// FAULT ISOLATION
// ============================================================================

#[tokio::test]
async fn verify_submit_failure_does_not_block_others() {
    let ledger = Arc::new(SimulatedLedger::new(0));
    let mut oracle = oracle(&ledger, &["REACT"]);
    ledger.reject_submissions_for(alice());

    ledger.mine(&[
        SimulatedLog::GameStarted(alice()),
        SimulatedLog::GameStarted(bob()),
    ]);
    ledger.mine(&[
        SimulatedLog::guess(alice(), &word("REACT"), 0),
        SimulatedLog::guess(bob(), &word("CRATE"), 0),
    ]);

    let outcome = oracle.run_cycle().await;
    assert!(matches!(outcome, CycleOutcome::Processed { events: 4, failures: 1, .. }));

    let written = ledger.fulfillments();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].player, bob());

    let stats = oracle.stats();
    assert_eq!(ReconcilerStats::get(&stats.fulfilments), 1);
    assert_eq!(ReconcilerStats::get(&stats.dispatch_failures), 1);
    assert_eq!(ReconcilerStats::get(&stats.games_started), 2);
}

#[tokio::test]
async fn verify_reverted_fulfilment_is_dropped() {
    let ledger = Arc::new(SimulatedLedger::new(0));
    let mut oracle = oracle(&ledger, &["REACT"]);
    ledger.revert_submissions_for(alice());

    ledger.mine(&[
        SimulatedLog::GameStarted(alice()),
        SimulatedLog::guess(alice(), &word("REACT"), 0),
    ]);

    let outcome = oracle.run_cycle().await;
    assert!(matches!(outcome, CycleOutcome::Processed { events: 2, failures: 1, .. }));
    assert_eq!(oracle.high_water_mark(), 1);
}

// ============================================================================
// GAME-OVER POLICY
// ============================================================================

#[tokio::test]
async fn verify_unscorable_last_guess_ends_game() {
    let ledger = Arc::new(SimulatedLedger::new(0));
    let mut oracle = oracle(&ledger, &["REACT"]);

    ledger.mine(&[
        SimulatedLog::GameStarted(alice()),
        SimulatedLog::PendingGuess(alice(), [0; 5], 5),
        SimulatedLog::PendingGuess(alice(), *b"ABC  ", 5),
    ]);

    let outcome = oracle.run_cycle().await;
    assert_eq!(
        outcome,
        CycleOutcome::Processed {
            range: BlockRange::new(0, 1),
            events: 3,
            failures: 0,
        }
    );

    let written = ledger.fulfillments();
    assert_eq!(written.len(), 2);
    for call in &written {
        assert_eq!(call.player, alice());
        assert_eq!(call.hints, [2; 5]);
        assert!(!call.won);
        assert!(call.game_over);
    }
}

#[tokio::test]
async fn verify_last_attempt_ends_game() {
    let ledger = Arc::new(SimulatedLedger::new(0));
    let mut oracle = oracle(&ledger, &["REACT"]);

    ledger.mine(&[SimulatedLog::GameStarted(alice())]);
    ledger.mine(&[SimulatedLog::guess(alice(), &word("GHOST"), 4)]);
    ledger.mine(&[SimulatedLog::guess(alice(), &word("GHOST"), 5)]);

    oracle.run_cycle().await;

    let written = ledger.fulfillments();
    assert_eq!(written.len(), 2);
    assert!(!written[0].won && !written[0].game_over);
    assert!(!written[1].won && written[1].game_over);
    // G H O S T vs R E A C T: only T matches, in place.
    assert_eq!(written[1].hints, [2, 2, 2, 2, 0]);
}

// ============================================================================
// RUN LOOP
// ============================================================================

#[tokio::test]
async fn verify_run_until_shutdown() {
    let ledger = Arc::new(SimulatedLedger::new(0));
    let oracle = oracle(&ledger, &["REACT"]);
    let stats = oracle.stats();
    let shutdown = CancellationToken::new();

    let task = tokio::spawn(oracle.run(Duration::from_millis(5), shutdown.clone()));

    ledger.mine(&[SimulatedLog::GameStarted(alice())]);
    ledger.mine(&[SimulatedLog::guess(alice(), &word("REACT"), 0)]);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while ledger.fulfillments().is_empty() {
        assert!(tokio::time::Instant::now() < deadline, "oracle never fulfilled");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    shutdown.cancel();
    let high_water = task.await.unwrap();
    assert_eq!(high_water, 2);
    assert!(ReconcilerStats::get(&stats.cycles) >= 1);
    assert!(ledger.fulfillments()[0].won);
}
