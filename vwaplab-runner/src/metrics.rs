//! Slippage metrics — pure functions over a list of session records.
//!
//! Every metric is a pure function: records in, scalar out. No dependencies
//! on the runner, data pipeline, or simulator.

use serde::{Deserialize, Serialize};
use vwaplab_core::domain::SessionRecord;

/// Aggregate slippage statistics for one backtest, in basis points.
///
/// Positive slippage means the model paid more than the session VWAP, so
/// lower is better throughout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlippageSummary {
    pub sessions: usize,
    pub mean_bps: f64,
    pub median_bps: f64,
    pub std_bps: f64,
    pub mean_abs_bps: f64,
    pub min_bps: f64,
    pub max_bps: f64,
    /// Fraction of sessions where the model underperformed the benchmark.
    pub positive_share: f64,
}

impl SlippageSummary {
    /// Compute all statistics from the recorded sessions.
    ///
    /// An empty record list yields an all-zero summary rather than NaNs, so
    /// a run where every session was skipped still serializes cleanly.
    pub fn compute(records: &[SessionRecord]) -> Self {
        if records.is_empty() {
            return Self {
                sessions: 0,
                mean_bps: 0.0,
                median_bps: 0.0,
                std_bps: 0.0,
                mean_abs_bps: 0.0,
                min_bps: 0.0,
                max_bps: 0.0,
                positive_share: 0.0,
            };
        }
        let bps: Vec<f64> = records.iter().map(|r| r.slippage_bps).collect();
        let abs_bps: Vec<f64> = bps.iter().map(|b| b.abs()).collect();
        Self {
            sessions: records.len(),
            mean_bps: mean_f64(&bps),
            median_bps: median(&bps),
            std_bps: std_dev(&bps),
            mean_abs_bps: mean_f64(&abs_bps),
            min_bps: bps.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
            max_bps: bps.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
            positive_share: bps.iter().filter(|&&b| b > 0.0).count() as f64 / bps.len() as f64,
        }
    }
}

// ─── Shared statistics helpers ──────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
