//! Pipeline orchestration — wires together data, training, simulation, and
//! metrics.
//!
//! Two entry points:
//! - `run_pipeline()`: trains a fresh linear scheduler on the earlier
//!   sessions, then backtests it on the held-out tail. Used by `run`.
//! - `run_baseline()`: backtests a caller-supplied scheduler on the same
//!   held-out tail, no training. Used by `backtest`.
//!
//! Sessions are independent during the backtest, so that stage fans out over
//! rayon; training stays sequential because batch order is part of the
//! learning semantics.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vwaplab_core::domain::{partition_sessions, Bar, Feature, SessionRecord};
use vwaplab_core::loss::SlippageLoss;
use vwaplab_core::scheduler::{LinearScheduler, Scheduler};
use vwaplab_core::sequences::build_sequences;
use vwaplab_core::simulator::simulate_session;
use vwaplab_core::window::WindowConfig;

use crate::config::{ConfigError, RunConfig, RunId};
use crate::data_loader::{
    dataset_hash, generate_synthetic_days, load_bars, split_sessions, LoadError,
};
use crate::metrics::SlippageSummary;
use crate::train::{train_scheduler, EpochStats, TrainError, TrainOptions, TrainProgress};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("training error: {0}")]
    Train(#[from] TrainError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Number of sessions generated for synthetic runs.
const SYNTHETIC_DAYS: usize = 40;
/// Bars per synthetic session (one 6.5-hour trading day of minute bars).
const SYNTHETIC_BARS_PER_DAY: usize = 390;

/// Complete result of one scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub dataset_hash: String,
    pub scheduler: String,
    pub config: RunConfig,
    /// Whether the run used generated data; synthetic results never stand in
    /// for real-market performance.
    pub synthetic: bool,
    /// Sessions in the evaluated (held-out) date range.
    pub sessions_total: usize,
    /// Evaluated sessions that produced no record (too short, or no volume).
    pub sessions_skipped: usize,
    pub records: Vec<SessionRecord>,
    pub summary: SlippageSummary,
    /// Per-epoch losses; empty for untrained baseline runs.
    pub train_history: Vec<EpochStats>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Load bars for a run: the configured CSV file, or generated sessions when
/// `synthetic` is set.
pub fn load_run_bars(config: &RunConfig, synthetic: bool) -> Result<Vec<Bar>, RunError> {
    if synthetic {
        eprintln!("WARNING: generating synthetic data — results are tagged as synthetic");
        return Ok(generate_synthetic_days(
            SYNTHETIC_DAYS,
            SYNTHETIC_BARS_PER_DAY,
            config.training.seed,
        ));
    }
    Ok(load_bars(config.data_path()?)?)
}

/// Backtest a scheduler over every session in `bars`, in parallel.
///
/// Produces exactly what the sequential simulator would: sessions are
/// independent, and the collect preserves session order.
pub fn backtest_sessions(
    bars: &[Bar],
    scheduler: &dyn Scheduler,
    window: WindowConfig,
    features: &[Feature],
    total_shares: f64,
) -> Vec<SessionRecord> {
    partition_sessions(bars)
        .par_iter()
        .filter_map(|session| simulate_session(session, scheduler, window, features, total_shares))
        .collect()
}

/// Train a linear scheduler on the earlier sessions, then backtest it on the
/// held-out tail.
pub fn run_pipeline(
    config: &RunConfig,
    bars: &[Bar],
    synthetic: bool,
    progress: Option<&dyn TrainProgress>,
) -> Result<BacktestReport, RunError> {
    let window = config.window()?;
    let features = &config.schedule.features;
    let (train_bars, test_bars) = split_sessions(bars, config.split.test_fraction);

    let data = build_sequences(train_bars, window, features);
    let loss = SlippageLoss::default();
    let mut model = LinearScheduler::new(
        window.lookback(),
        features.len(),
        window.horizon(),
        config.training.learning_rate,
        config.training.seed,
    );
    let opts = TrainOptions {
        epochs: config.training.epochs,
        batch_size: config.training.batch_size,
        validation_split: config.training.validation_split,
        seed: config.training.seed,
    };
    let history = train_scheduler(&mut model, &data, &loss, &opts, progress)?;

    Ok(build_report(
        config, bars, test_bars, &model, window, synthetic, history,
    ))
}

/// Backtest a fixed scheduler on the held-out tail, no training.
///
/// Evaluates the same sessions as [`run_pipeline`] under the same config, so
/// baseline and trained results are directly comparable.
pub fn run_baseline(
    config: &RunConfig,
    bars: &[Bar],
    scheduler: &dyn Scheduler,
    synthetic: bool,
) -> Result<BacktestReport, RunError> {
    let window = config.window()?;
    let (_, test_bars) = split_sessions(bars, config.split.test_fraction);
    Ok(build_report(
        config,
        bars,
        test_bars,
        scheduler,
        window,
        synthetic,
        Vec::new(),
    ))
}

fn build_report(
    config: &RunConfig,
    all_bars: &[Bar],
    test_bars: &[Bar],
    scheduler: &dyn Scheduler,
    window: WindowConfig,
    synthetic: bool,
    train_history: Vec<EpochStats>,
) -> BacktestReport {
    let records = backtest_sessions(
        test_bars,
        scheduler,
        window,
        &config.schedule.features,
        config.execution.total_shares,
    );
    let sessions_total = partition_sessions(test_bars).len();
    let summary = SlippageSummary::compute(&records);

    BacktestReport {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        dataset_hash: dataset_hash(all_bars),
        scheduler: scheduler.name().to_string(),
        config: config.clone(),
        synthetic,
        sessions_total,
        sessions_skipped: sessions_total - records.len(),
        records,
        summary,
        train_history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vwaplab_core::scheduler::UniformScheduler;
    use vwaplab_core::simulator::run_backtest;

    fn small_config() -> RunConfig {
        RunConfig::from_toml(
            r#"
[schedule]
lookback = 20
horizon = 10

[training]
epochs = 2
batch_size = 32
seed = 7
"#,
        )
        .unwrap()
    }

    #[test]
    fn parallel_backtest_matches_sequential() {
        let config = small_config();
        let bars = generate_synthetic_days(8, 60, 3);
        let window = config.window().unwrap();
        let scheduler = UniformScheduler::new(window.horizon());

        let parallel = backtest_sessions(
            &bars,
            &scheduler,
            window,
            &config.schedule.features,
            config.execution.total_shares,
        );
        let sequential = run_backtest(
            &bars,
            &scheduler,
            window,
            &config.schedule.features,
            config.execution.total_shares,
        );
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn pipeline_trains_and_reports_on_the_held_out_tail() {
        let config = small_config();
        let bars = generate_synthetic_days(12, 60, 7);
        let report = run_pipeline(&config, &bars, true, None).unwrap();

        // ceil(12 * 0.2) = 3 sessions in the tail, each long enough to trade.
        assert_eq!(report.sessions_total, 3);
        assert_eq!(report.sessions_skipped, 0);
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.summary.sessions, 3);

        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.scheduler, "linear");
        assert!(report.synthetic);
        assert_eq!(report.run_id, config.run_id());
        assert_eq!(report.dataset_hash, dataset_hash(&bars));
        assert_eq!(report.train_history.len(), 2);

        // Evaluated sessions must come from the tail, in order.
        let sessions = partition_sessions(&bars);
        let tail_dates: Vec<_> = sessions[9..].iter().map(|s| s.date).collect();
        let record_dates: Vec<_> = report.records.iter().map(|r| r.date).collect();
        assert_eq!(record_dates, tail_dates);
    }

    #[test]
    fn pipeline_is_deterministic() {
        let config = small_config();
        let bars = generate_synthetic_days(12, 60, 7);
        let a = run_pipeline(&config, &bars, true, None).unwrap();
        let b = run_pipeline(&config, &bars, true, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn baseline_skips_training_but_evaluates_the_same_sessions() {
        let config = small_config();
        let bars = generate_synthetic_days(12, 60, 7);
        let window = config.window().unwrap();
        let uniform = UniformScheduler::new(window.horizon());

        let baseline = run_baseline(&config, &bars, &uniform, true).unwrap();
        let trained = run_pipeline(&config, &bars, true, None).unwrap();

        assert_eq!(baseline.scheduler, "uniform");
        assert!(baseline.train_history.is_empty());
        assert_eq!(baseline.sessions_total, trained.sessions_total);
        let baseline_dates: Vec<_> = baseline.records.iter().map(|r| r.date).collect();
        let trained_dates: Vec<_> = trained.records.iter().map(|r| r.date).collect();
        assert_eq!(baseline_dates, trained_dates);
    }

    #[test]
    fn pipeline_fails_when_no_session_fits_the_window() {
        let config = small_config();
        // 10-bar sessions cannot host a 20+10 window.
        let bars = generate_synthetic_days(6, 10, 1);
        let err = run_pipeline(&config, &bars, true, None).unwrap_err();
        assert!(matches!(err, RunError::Train(TrainError::EmptyTrainingSet)));
    }

    #[test]
    fn short_tail_sessions_are_skipped_not_fatal() {
        let config = small_config();
        // Long sessions for training, then the generator geometry guarantees
        // the tail sessions (10 bars) are below the 30-bar minimum.
        let mut bars = generate_synthetic_days(10, 60, 2);
        let mut extra = generate_synthetic_days(13, 10, 9);
        // Shift the extra sessions past the originals to keep dates increasing.
        let last = bars.last().unwrap().timestamp;
        for bar in &mut extra {
            bar.timestamp += chrono::Duration::days(365);
        }
        assert!(extra.first().unwrap().timestamp > last);
        bars.extend(extra);

        let window = config.window().unwrap();
        let uniform = UniformScheduler::new(window.horizon());
        let report = run_baseline(&config, &bars, &uniform, true).unwrap();

        // ceil(23 * 0.2) = 5 tail sessions, all 10-bar, all skipped.
        assert_eq!(report.sessions_total, 5);
        assert_eq!(report.sessions_skipped, 5);
        assert!(report.records.is_empty());
        assert_eq!(report.summary.sessions, 0);
    }

    #[test]
    fn schema_version_defaults_when_missing_from_json() {
        let config = small_config();
        let bars = generate_synthetic_days(12, 60, 7);
        let report = run_pipeline(&config, &bars, true, None).unwrap();

        let mut value = serde_json::to_value(&report).unwrap();
        value.as_object_mut().unwrap().remove("schema_version");
        let back: BacktestReport = serde_json::from_value(value).unwrap();
        assert_eq!(back.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn load_run_bars_generates_when_synthetic() {
        // No data path configured, so only the synthetic branch can succeed.
        let config = RunConfig::default();
        let bars = load_run_bars(&config, true).unwrap();
        assert_eq!(bars.len(), 40 * 390);

        let err = load_run_bars(&config, false).unwrap_err();
        assert!(matches!(err, RunError::Config(ConfigError::MissingDataPath)));
    }
}
