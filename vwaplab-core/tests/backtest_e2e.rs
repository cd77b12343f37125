//! End-to-end simulation of one full trading session.
//!
//! A 200-bar session with lookback 120 and horizon 30, driven by the
//! uniform baseline. With an even schedule every execution minute trades
//! the same share count, so the realized execution VWAP must equal the
//! simple mean of the execution-bar prices. The execution loop visits every
//! bar with a full lookback behind it: indices 120..200, i.e. 80 bars.
//!
//! Also covers the training-side view of the same session (pair counting)
//! and an untrained linear model driving the same loop.

use chrono::NaiveDate;
use vwaplab_core::domain::{Bar, Feature};
use vwaplab_core::scheduler::{LinearScheduler, Scheduler, UniformScheduler};
use vwaplab_core::sequences::build_sequences;
use vwaplab_core::simulator::run_backtest;
use vwaplab_core::window::WindowConfig;

const LOOKBACK: usize = 120;
const HORIZON: usize = 30;
const TOTAL_SHARES: f64 = 1_000_000.0;

/// One 200-minute session with wavy prices and an uneven volume profile.
fn session_200() -> Vec<Bar> {
    let open = NaiveDate::from_ymd_opt(2024, 3, 8)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    (0..200)
        .map(|i| Bar {
            timestamp: open + chrono::Duration::minutes(i as i64),
            avg_price: 100.0 + 5.0 * (i as f64 * 0.1).sin() + i as f64 * 0.01,
            volume: 1_000.0 + 500.0 * ((i % 7) as f64),
        })
        .collect()
}

fn features() -> Vec<Feature> {
    vec![Feature::AvgPrice, Feature::Volume]
}

#[test]
fn uniform_stub_matches_mean_execution_price() {
    let window = WindowConfig::new(LOOKBACK, HORIZON).unwrap();
    let bars = session_200();
    let model = UniformScheduler::new(HORIZON);

    let records = run_backtest(&bars, &model, window, &features(), TOTAL_SHARES);
    assert_eq!(records.len(), 1, "one eligible session, one record");
    let record = &records[0];

    // 80 execution bars: indices 120..200.
    let execution_prices: Vec<f64> = bars[LOOKBACK..].iter().map(|b| b.avg_price).collect();
    assert_eq!(execution_prices.len(), 80);
    let expected_model = execution_prices.iter().sum::<f64>() / execution_prices.len() as f64;

    assert!(
        (record.model_vwap - expected_model).abs() < 1e-9,
        "model vwap {} vs mean execution price {}",
        record.model_vwap,
        expected_model
    );

    // Benchmark: volume-weighted over the whole session.
    let traded: f64 = bars.iter().map(|b| b.avg_price * b.volume).sum();
    let volume: f64 = bars.iter().map(|b| b.volume).sum();
    let expected_benchmark = traded / volume;
    assert!((record.benchmark_vwap - expected_benchmark).abs() < 1e-9);

    assert!(record.slippage_bps.is_finite());
    assert!(
        (record.slippage_bps
            - (record.model_vwap - record.benchmark_vwap) / record.benchmark_vwap * 10_000.0)
            .abs()
            < 1e-9
    );
    assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
}

#[test]
fn the_same_session_yields_51_training_pairs() {
    // 200 - 120 - 30 + 1
    let window = WindowConfig::new(LOOKBACK, HORIZON).unwrap();
    let set = build_sequences(&session_200(), window, &features());
    assert_eq!(set.len(), 51);
    assert_eq!(set.inputs.shape(), &[51, LOOKBACK, 2]);
    assert_eq!(set.targets.shape(), &[51, HORIZON, 2]);
}

#[test]
fn untrained_linear_model_drives_the_same_loop() {
    let window = WindowConfig::new(LOOKBACK, HORIZON).unwrap();
    let bars = session_200();
    let model = LinearScheduler::new(LOOKBACK, 2, HORIZON, 0.001, 42);
    assert_eq!(model.horizon(), HORIZON);

    let records = run_backtest(&bars, &model, window, &features(), TOTAL_SHARES);
    assert_eq!(records.len(), 1);
    let record = &records[0];

    // Softmax schedules are positive, so shares were traded every minute and
    // the execution VWAP sits inside the session's price range.
    let lo = bars.iter().map(|b| b.avg_price).fold(f64::INFINITY, f64::min);
    let hi = bars
        .iter()
        .map(|b| b.avg_price)
        .fold(f64::NEG_INFINITY, f64::max);
    assert!(record.model_vwap >= lo && record.model_vwap <= hi);
    assert!(record.slippage_bps.is_finite());
}

#[test]
fn session_one_bar_short_of_eligibility_is_skipped() {
    let window = WindowConfig::new(LOOKBACK, HORIZON).unwrap();
    let mut bars = session_200();
    bars.truncate(LOOKBACK + HORIZON - 1);
    let model = UniformScheduler::new(HORIZON);

    let records = run_backtest(&bars, &model, window, &features(), TOTAL_SHARES);
    assert!(records.is_empty());
}
