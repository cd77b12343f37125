//! VwapLab CLI — run, backtest, and data inspection commands.
//!
//! Commands:
//! - `run` — train a linear scheduler from a TOML config and backtest it on
//!   the held-out sessions
//! - `backtest` — evaluate a fixed baseline scheduler under the same config
//!   and data split
//! - `data` — inspect a bar CSV: session counts, date range, window
//!   eligibility

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use vwaplab_core::domain::partition_sessions;
use vwaplab_core::scheduler::UniformScheduler;
use vwaplab_core::window::WindowConfig;
use vwaplab_runner::runner::{load_run_bars, run_baseline, run_pipeline};
use vwaplab_runner::{load_bars, save_artifacts, BacktestReport, RunConfig, StdoutProgress};

#[derive(Parser)]
#[command(
    name = "vwaplab",
    about = "VwapLab CLI — VWAP execution scheduling engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a scheduler from a TOML config and backtest it on held-out sessions.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Generate synthetic sessions instead of reading the configured CSV.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Evaluate a fixed baseline scheduler under the same config and data split.
    Backtest {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Baseline scheduler name. Valid: uniform.
        #[arg(long, default_value = "uniform")]
        scheduler: String,

        /// Generate synthetic sessions instead of reading the configured CSV.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Inspect a bar CSV: bar/session counts, date range, window eligibility.
    Data {
        /// Path to a headered bar CSV (timestamp, avg_price, volume).
        #[arg(long)]
        path: PathBuf,

        /// Lookback bars for the eligibility check.
        #[arg(long, default_value_t = 120)]
        lookback: usize,

        /// Horizon bars for the eligibility check.
        #[arg(long, default_value_t = 30)]
        horizon: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            synthetic,
            output_dir,
        } => run_cmd(&config, synthetic, &output_dir),
        Commands::Backtest {
            config,
            scheduler,
            synthetic,
            output_dir,
        } => backtest_cmd(&config, &scheduler, synthetic, &output_dir),
        Commands::Data {
            path,
            lookback,
            horizon,
        } => data_cmd(&path, lookback, horizon),
    }
}

fn run_cmd(config_path: &PathBuf, synthetic: bool, output_dir: &PathBuf) -> Result<()> {
    let config = RunConfig::from_file(config_path)?;
    let bars = load_run_bars(&config, synthetic)?;

    let report = run_pipeline(&config, &bars, synthetic, Some(&StdoutProgress))?;
    print_summary(&report);

    let run_dir = save_artifacts(&report, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn backtest_cmd(
    config_path: &PathBuf,
    scheduler_name: &str,
    synthetic: bool,
    output_dir: &PathBuf,
) -> Result<()> {
    let config = RunConfig::from_file(config_path)?;
    let window = config.window()?;

    let scheduler = match scheduler_name {
        "uniform" => UniformScheduler::new(window.horizon()),
        _ => bail!("unknown scheduler '{scheduler_name}'. Valid: uniform"),
    };

    let bars = load_run_bars(&config, synthetic)?;
    let report = run_baseline(&config, &bars, &scheduler, synthetic)?;
    print_summary(&report);

    let run_dir = save_artifacts(&report, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn data_cmd(path: &PathBuf, lookback: usize, horizon: usize) -> Result<()> {
    let window = WindowConfig::new(lookback, horizon)?;
    let bars = load_bars(path)?;
    let sessions = partition_sessions(&bars);

    let eligible = sessions
        .iter()
        .filter(|s| s.len() >= window.min_session_len())
        .count();
    let pairs: usize = sessions.iter().map(|s| window.pair_count(s.len())).sum();

    println!("File:            {}", path.display());
    println!("Bars:            {}", bars.len());
    println!("Sessions:        {}", sessions.len());
    if let (Some(first), Some(last)) = (sessions.first(), sessions.last()) {
        println!("Date Range:      {} to {}", first.date, last.date);
    }
    println!("Window:          {lookback} lookback / {horizon} horizon");
    println!("Eligible:        {eligible} of {} sessions", sessions.len());
    println!("Training Pairs:  {pairs}");
    Ok(())
}

fn print_summary(report: &BacktestReport) {
    let s = &report.summary;
    println!();
    println!("=== VWAP Backtest ===");
    println!(
        "Run ID:         {}",
        &report.run_id[..report.run_id.len().min(12)]
    );
    println!("Scheduler:      {}", report.scheduler);
    println!(
        "Window:         {} lookback / {} horizon",
        report.config.schedule.lookback, report.config.schedule.horizon
    );
    println!(
        "Order Size:     {:.0} shares",
        report.config.execution.total_shares
    );
    println!(
        "Sessions:       {} evaluated, {} skipped",
        s.sessions, report.sessions_skipped
    );
    if let Some(last) = report.train_history.last() {
        match last.val_loss {
            Some(val) => println!(
                "Final Loss:     train {:.6e}, val {:.6e}",
                last.train_loss, val
            ),
            None => println!("Final Loss:     train {:.6e}", last.train_loss),
        }
    }
    println!();
    println!("--- Slippage (bps) ---");
    println!("Mean:           {:.2}", s.mean_bps);
    println!("Median:         {:.2}", s.median_bps);
    println!("Std Dev:        {:.2}", s.std_bps);
    println!("Mean Abs:       {:.2}", s.mean_abs_bps);
    println!("Min / Max:      {:.2} / {:.2}", s.min_bps, s.max_bps);
    println!(
        "Underperformed: {:.1}% of sessions",
        s.positive_share * 100.0
    );
    if report.synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}
