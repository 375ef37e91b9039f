//! EMACross CLI — EMA snapshots, crossover signals and stop-loss levels.
//!
//! Commands:
//! - `ema` — multi-period EMA snapshot of a bar file, or its full history
//! - `evaluate` — run one instrument's state machine and persist the new state
//! - `scan` — evaluate every instrument of a watchlist
//! - `stop-loss` — stop price for an open long
//!
//! Results go to stdout as JSON; logs go to stderr.

mod store;
mod watchlist;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info, Level};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

use emacross_core::data::load_bars;
use emacross_core::risk::stop_loss_levels;
use emacross_core::{
    compute_ema_snapshot, compute_multi_ema_series, compute_multi_ema_snapshot, compute_stop_loss,
    evaluate_signal, BotState, SignalResult, StrategyConfig,
};

use crate::store::StateStore;
use crate::watchlist::Watchlist;

#[derive(Parser)]
#[command(
    name = "emacross",
    about = "EMACross CLI — EMA crossover signals with price confirmation"
)]
struct Cli {
    /// Log at DEBUG instead of INFO.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the multi-period EMA snapshot of a bar file.
    Ema {
        /// Bar file (.json or .csv).
        #[arg(long)]
        bars: PathBuf,

        /// Comma-separated periods. Defaults to the configured multi_periods.
        #[arg(long, value_delimiter = ',')]
        periods: Option<Vec<usize>>,

        /// Strategy config (TOML).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print every bar's EMAs instead of the last two.
        #[arg(long, default_value_t = false)]
        series: bool,
    },
    /// Evaluate one instrument and persist its new state.
    Evaluate {
        /// Instrument symbol, the key in the state file.
        #[arg(long)]
        symbol: String,

        /// Bar file (.json or .csv).
        #[arg(long)]
        bars: PathBuf,

        /// State file. Defaults to ./state.json.
        #[arg(long, default_value = "state.json")]
        state: PathBuf,

        /// Live price. Defaults to the last close.
        #[arg(long)]
        price: Option<f64>,

        /// Strategy config (TOML).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Evaluate every instrument of a watchlist.
    Scan {
        /// Watchlist file (TOML).
        #[arg(long)]
        watchlist: PathBuf,

        /// State file. Defaults to ./state.json.
        #[arg(long, default_value = "state.json")]
        state: PathBuf,

        /// Strategy config (TOML).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Stop price for a long position.
    StopLoss {
        /// Entry price.
        #[arg(long)]
        entry: f64,

        /// Current slow EMA.
        #[arg(long)]
        slow_ema: f64,

        /// Percent-below-entry floor.
        #[arg(long, default_value_t = 2.0)]
        percent: f64,
    },
}

/// One instrument's evaluation as printed by `evaluate` and `scan`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Evaluation {
    symbol: String,
    #[serde(flatten)]
    result: SignalResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_loss: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ScanFailure {
    symbol: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct ScanReport {
    evaluations: Vec<Evaluation>,
    failures: Vec<ScanFailure>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Ema {
            bars,
            periods,
            config,
            series,
        } => run_ema(&bars, periods, config.as_deref(), series),
        Commands::Evaluate {
            symbol,
            bars,
            state,
            price,
            config,
        } => run_evaluate(&symbol, &bars, &state, price, config.as_deref()),
        Commands::Scan {
            watchlist,
            state,
            config,
        } => run_scan(&watchlist, &state, config.as_deref()),
        Commands::StopLoss {
            entry,
            slow_ema,
            percent,
        } => run_stop_loss(entry, slow_ema, percent),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(Targets::new().with_default(level));
    tracing_subscriber::registry().with(fmt_layer).init();
}

fn load_config(path: Option<&Path>) -> Result<StrategyConfig> {
    match path {
        Some(path) => StrategyConfig::from_file(path)
            .with_context(|| format!("loading strategy config {}", path.display())),
        None => Ok(StrategyConfig::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_ema(
    bars_path: &Path,
    periods: Option<Vec<usize>>,
    config: Option<&Path>,
    series: bool,
) -> Result<()> {
    let config = load_config(config)?;
    let periods = periods.unwrap_or(config.multi_periods);
    let bars = load_bars(bars_path)?;
    let context = || format!("computing EMAs for {}", bars_path.display());
    if series {
        print_json(&compute_multi_ema_series(&bars, &periods).with_context(context)?)
    } else {
        print_json(&compute_multi_ema_snapshot(&bars, &periods).with_context(context)?)
    }
}

/// Load bars, run the state machine once, and attach the stop-loss when the
/// resulting state holds a position.
fn evaluate_instrument(
    symbol: &str,
    bars_path: &Path,
    price: Option<f64>,
    state: &BotState,
    config: &StrategyConfig,
) -> Result<Evaluation> {
    let bars = load_bars(bars_path).with_context(|| format!("loading bars for {symbol}"))?;
    let snapshot = compute_ema_snapshot(&bars, config.fast_period, config.slow_period)
        .with_context(|| format!("computing EMA snapshot for {symbol}"))?;

    let price = price.unwrap_or(snapshot.current.close);
    if !price.is_finite() || price <= 0.0 {
        bail!("price for {symbol} must be a positive number, got {price}");
    }

    let result = evaluate_signal(&snapshot, state, config.confirmation_percent, price);
    let stop_loss = match (result.new_state.entry_price(), snapshot.current.ema_slow) {
        (Some(entry), Some(slow_ema)) => {
            Some(compute_stop_loss(entry, slow_ema, config.stop_loss_percent))
        }
        _ => None,
    };

    Ok(Evaluation {
        symbol: symbol.to_string(),
        result,
        stop_loss,
    })
}

fn run_evaluate(
    symbol: &str,
    bars_path: &Path,
    state_path: &Path,
    price: Option<f64>,
    config: Option<&Path>,
) -> Result<()> {
    let config = load_config(config)?;
    let mut store = StateStore::open(state_path)?;

    let evaluation = evaluate_instrument(symbol, bars_path, price, &store.get(symbol), &config)?;
    store.set(symbol, evaluation.result.new_state.clone());
    store.save()?;

    print_json(&evaluation)
}

fn run_scan(watchlist_path: &Path, state_path: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let watchlist = Watchlist::from_file(watchlist_path)?;
    let mut store = StateStore::open(state_path)?;

    // Read every state up front; the parallel pass only reads.
    let jobs: Vec<_> = watchlist
        .instruments
        .iter()
        .map(|instrument| (instrument, store.get(&instrument.symbol)))
        .collect();

    let outcomes: Vec<(String, Result<Evaluation>)> = jobs
        .par_iter()
        .map(|(instrument, state)| {
            let outcome = evaluate_instrument(
                &instrument.symbol,
                &instrument.bars,
                instrument.price,
                state,
                &config,
            );
            (instrument.symbol.clone(), outcome)
        })
        .collect();

    let mut report = ScanReport {
        evaluations: Vec::new(),
        failures: Vec::new(),
    };
    for (symbol, outcome) in outcomes {
        match outcome {
            Ok(evaluation) => {
                store.set(&symbol, evaluation.result.new_state.clone());
                report.evaluations.push(evaluation);
            }
            Err(e) => {
                error!(%symbol, error = %format!("{e:#}"), "evaluation failed");
                report.failures.push(ScanFailure {
                    symbol,
                    error: format!("{e:#}"),
                });
            }
        }
    }

    store.save()?;
    info!(
        evaluated = report.evaluations.len(),
        failed = report.failures.len(),
        tracked = store.len(),
        "scan complete"
    );
    print_json(&report)?;

    if !report.failures.is_empty() {
        bail!(
            "{} of {} instruments failed",
            report.failures.len(),
            watchlist.instruments.len()
        );
    }
    Ok(())
}

fn run_stop_loss(entry: f64, slow_ema: f64, percent: f64) -> Result<()> {
    if !entry.is_finite() || !slow_ema.is_finite() {
        bail!("entry and slow EMA must be finite numbers");
    }
    if !percent.is_finite() || !(0.0..100.0).contains(&percent) {
        bail!("stop-loss percent must be in [0, 100), got {percent}");
    }
    print_json(&stop_loss_levels(entry, slow_ema, percent))
}
