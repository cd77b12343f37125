//! Rolling-window backtest simulator.
//!
//! Replays a trained scheduler over held-out sessions one minute at a time.
//! Each step re-predicts a fresh full-horizon schedule from the latest
//! lookback window but acts only on its FIRST element; the rest of the
//! schedule is advisory and regenerated next minute. Trades execute at the
//! next bar's observed price, so the executed bar is never part of the
//! model's input (look-ahead-free by construction).
//!
//! Per-session state machine: Skip (too short, undefined benchmark, or no
//! shares traded), Simulating (accumulate value and shares), Recorded (emit
//! one [`SessionRecord`]). Skips are silent policy decisions, never errors;
//! sparse and ragged evaluation data is normal.

use ndarray::s;

use crate::domain::{feature_matrix, partition_sessions, Bar, Feature, Session, SessionRecord};
use crate::scheduler::Scheduler;
use crate::vwap::session_vwap;
use crate::window::WindowConfig;

/// Simulate one session, producing its record or `None` when skipped.
///
/// Eligibility requires `len >= lookback + horizon` and a defined session
/// benchmark. The execution loop then visits every index with a full
/// lookback window behind it (`i in 0 .. len - lookback`):
/// the scheduler sees the feature rows `[i, i + lookback)` and
/// `schedule[0] * total_shares` executes at bar `i + lookback`'s price.
/// A session whose accumulated shares come to zero has no defined execution
/// VWAP and is skipped.
pub fn simulate_session(
    session: &Session<'_>,
    scheduler: &dyn Scheduler,
    window: WindowConfig,
    features: &[Feature],
    total_shares: f64,
) -> Option<SessionRecord> {
    if session.len() < window.min_session_len() {
        return None;
    }
    let benchmark_vwap = session_vwap(session.bars)?;

    let lookback = window.lookback();
    let session_features = feature_matrix(session.bars, features);

    let mut total_value = 0.0;
    let mut total_traded = 0.0;

    for i in 0..session.len() - lookback {
        let input = session_features.slice(s![i..i + lookback, ..]);
        let schedule = scheduler.predict(input);
        debug_assert_eq!(schedule.len(), window.horizon());

        let shares = schedule[0] * total_shares;
        let execution_price = session.bars[i + lookback].avg_price;
        total_value += shares * execution_price;
        total_traded += shares;
    }

    if total_traded == 0.0 {
        return None;
    }
    let model_vwap = total_value / total_traded;

    Some(SessionRecord::from_vwaps(session.date, benchmark_vwap, model_vwap))
}

/// Backtest a full bar series: partition into sessions, simulate each,
/// collect the records of the sessions that weren't skipped, in input order.
///
/// Pure and deterministic: identical bars, scheduler, and configuration
/// yield bit-identical records.
pub fn run_backtest(
    bars: &[Bar],
    scheduler: &dyn Scheduler,
    window: WindowConfig,
    features: &[Feature],
    total_shares: f64,
) -> Vec<SessionRecord> {
    partition_sessions(bars)
        .iter()
        .filter_map(|session| simulate_session(session, scheduler, window, features, total_shares))
        .collect()
}
