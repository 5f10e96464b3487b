//! Wordle oracle daemon.
//!
//! Exit codes: `0` clean shutdown, `2` bad configuration, `1` startup failure.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use wordle_oracle::telemetry::init_tracing;
use wordle_oracle::{ConfigOverrides, OracleConfig, Reconciler, DEFAULT_POLL_INTERVAL_MS};
use wordle_oracle_chain::{Address, LedgerClient, RpcLedger, SimulatedLedger, SimulatedLog};
use wordle_oracle_core::{SecretRegistry, Word, WordList, DEFAULT_WORDS};

const LOG_TARGET: &str = "bin::wordle_oracle";

const EXIT_CONFIG: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "wordle_oracle")]
#[command(about = "Score Wordle guesses off-chain and write feedback to the game contract", long_about = None)]
struct Args {
    /// Config file (TOML, or the deploy script's JSON). Defaults to ./oracle.toml when present.
    #[arg(long, short = 'c', env = "ORACLE_CONFIG")]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint
    #[arg(long, env = "ORACLE_RPC_URL")]
    rpc_url: Option<String>,

    /// Game contract address
    #[arg(long, env = "ORACLE_CONTRACT_ADDRESS")]
    contract_address: Option<String>,

    /// Oracle signing key (hex)
    #[arg(long, env = "ORACLE_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Poll period in milliseconds
    #[arg(long, env = "ORACLE_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// Per-call RPC timeout in milliseconds
    #[arg(long, env = "ORACLE_RPC_TIMEOUT_MS")]
    rpc_timeout_ms: Option<u64>,

    /// Treat every block up to this one as processed instead of the current head
    #[arg(long)]
    start_block: Option<u64>,

    /// Toggle structured (JSON) logs
    #[arg(long, env = "ORACLE_LOG_JSON", default_value_t = false)]
    log_json: bool,

    /// Run one scripted game against an in-memory chain and exit
    #[arg(long, default_value_t = false)]
    simulate: bool,

    /// Seed for secret selection (simulation only)
    #[arg(long, requires = "simulate")]
    seed: Option<u64>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            rpc_url: self.rpc_url.clone(),
            contract_address: self.contract_address.clone(),
            private_key: self.private_key.clone(),
            poll_interval_ms: self.poll_interval_ms,
            rpc_timeout_ms: self.rpc_timeout_ms,
            start_block: self.start_block,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    if let Err(err) = init_tracing(args.log_json) {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    if args.simulate {
        return match simulate(&args, shutdown).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!(target: LOG_TARGET, error = %format!("{err:#}"), "simulation failed");
                ExitCode::FAILURE
            }
        };
    }

    let config = match OracleConfig::load(args.config.as_deref(), args.overrides()) {
        Ok(config) => config,
        Err(err) => {
            error!(target: LOG_TARGET, error = %err, "configuration error");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    match serve(config, shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: LOG_TARGET, error = %format!("{err:#}"), "oracle failed to start");
            ExitCode::FAILURE
        }
    }
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!(target: LOG_TARGET, "shutdown requested"),
            Err(err) => warn!(target: LOG_TARGET, error = %err, "cannot listen for ctrl-c"),
        }
        shutdown.cancel();
    });
}

async fn serve(config: OracleConfig, shutdown: CancellationToken) -> Result<()> {
    info!(target: LOG_TARGET, ?config, "starting oracle");

    let words = match &config.word_list {
        Some(list) => WordList::new(list.as_slice()).context("invalid word list")?,
        None => WordList::builtin(),
    };

    let ledger = RpcLedger::connect(
        config.rpc_url.clone(),
        config.contract_address,
        &config.private_key,
    )
    .await
    .context("failed to connect to ledger")?;
    info!(
        target: LOG_TARGET,
        oracle = %ledger.oracle_address(),
        chain_id = ledger.chain_id(),
        "oracle identity loaded"
    );
    let ledger: Arc<dyn LedgerClient> = Arc::new(ledger);

    let registry = Arc::new(SecretRegistry::new());
    let reconciler = match config.start_block {
        Some(block) => Reconciler::new(ledger, Box::new(words), block),
        None => Reconciler::from_head(ledger, Box::new(words))
            .await
            .context("failed to read starting block")?,
    }
    .with_registry(registry)
    .with_rpc_timeout(config.rpc_timeout);

    reconciler.run(config.poll_interval, shutdown).await;
    Ok(())
}

/// Plays one game on an in-memory chain: two misses, then the secret.
async fn simulate(args: &Args, shutdown: CancellationToken) -> Result<()> {
    let seed = args.seed.unwrap_or(0);
    let poll = Duration::from_millis(args.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS));
    let words = WordList::seeded(&DEFAULT_WORDS, seed).context("invalid word list")?;

    let chain = Arc::new(SimulatedLedger::new(0));
    let registry = Arc::new(SecretRegistry::new());
    let reconciler =
        Reconciler::new(chain.clone(), Box::new(words), 0).with_registry(Arc::clone(&registry));

    info!(target: LOG_TARGET, seed, "simulation started");
    let oracle = tokio::spawn(reconciler.run(poll, shutdown.clone()));

    let player = Address::repeat_byte(0x42);
    let script = play_script(&chain, &registry, player, poll, &shutdown).await;
    shutdown.cancel();
    let high_water = oracle.await.context("oracle task panicked")?;
    script?;

    for (attempt, call) in chain.fulfillments().iter().enumerate() {
        info!(
            target: LOG_TARGET,
            attempt,
            hints = ?call.hints,
            won = call.won,
            game_over = call.game_over,
            "fulfilment on chain"
        );
    }
    info!(target: LOG_TARGET, high_water, "simulation finished");
    Ok(())
}

async fn play_script(
    chain: &SimulatedLedger,
    registry: &SecretRegistry,
    player: Address,
    poll: Duration,
    shutdown: &CancellationToken,
) -> Result<()> {
    let id = wordle_oracle_chain::player_id(&player);

    chain.mine(&[SimulatedLog::GameStarted(player)]);
    let secret = loop {
        if let Ok(secret) = registry.lookup(&id) {
            break secret;
        }
        tokio::select! {
            () = shutdown.cancelled() => anyhow::bail!("interrupted"),
            () = tokio::time::sleep(poll) => {}
        }
    };

    let mut guesses = Vec::new();
    for candidate in ["CRANE", "PIOUS"] {
        let word = Word::parse(candidate)?;
        if word != secret {
            guesses.push(word);
        }
    }
    guesses.push(secret);

    for (attempt, guess) in (0u64..).zip(&guesses) {
        chain.mine(&[SimulatedLog::guess(player, guess, attempt)]);
        let expected = usize::try_from(attempt + 1)?;
        while chain.fulfillments().len() < expected {
            tokio::select! {
                () = shutdown.cancelled() => anyhow::bail!("interrupted"),
                () = tokio::time::sleep(poll) => {}
            }
        }
    }

    Ok(())
}
