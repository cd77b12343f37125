//! VwapLab Runner — orchestration around the core engine.
//!
//! Everything between a config file and a results directory:
//! - TOML run configuration with startup validation and blake3 run ids
//! - Minute-bar CSV loading, dataset hashing, deterministic synthetic data
//! - Training harness (epochs, shuffled minibatches, validation split)
//! - Session-parallel backtest of a trained scheduler on held-out days
//! - Summary metrics and artifact export (manifest, records, summary, report)

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod train;

pub use config::{ConfigError, RunConfig, RunId};
pub use data_loader::{
    dataset_hash, generate_synthetic_days, load_bars, split_sessions, write_bars_csv, LoadError,
};
pub use export::{load_artifacts, save_artifacts};
pub use metrics::SlippageSummary;
pub use runner::{
    backtest_sessions, load_run_bars, run_baseline, run_pipeline, BacktestReport, RunError,
    SCHEMA_VERSION,
};
pub use train::{
    train_scheduler, EpochStats, StdoutProgress, TrainError, TrainOptions, TrainProgress,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn run_config_is_send_sync() {
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
    }

    #[test]
    fn backtest_report_is_send_sync() {
        assert_send::<BacktestReport>();
        assert_sync::<BacktestReport>();
    }

    #[test]
    fn slippage_summary_is_send_sync() {
        assert_send::<SlippageSummary>();
        assert_sync::<SlippageSummary>();
    }

    #[test]
    fn train_types_are_send_sync() {
        assert_send::<TrainOptions>();
        assert_sync::<TrainOptions>();
        assert_send::<EpochStats>();
        assert_sync::<EpochStats>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
        assert_send::<LoadError>();
        assert_sync::<LoadError>();
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
