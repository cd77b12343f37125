//! Sliding-window sequence builder.
//!
//! Turns an ordered bar series into dense supervised training pairs: an
//! input window of feature rows and the adjacent future window of
//! `(avg_price, volume)` targets. Windows slide with stride 1 and never
//! cross a session boundary; sessions shorter than
//! `lookback + horizon` contribute nothing, by policy rather than by error.

use ndarray::{s, Array3, Axis};

use crate::domain::{feature_matrix, partition_sessions, Bar, Feature};
use crate::window::WindowConfig;

/// Column index of the realized price in a target row.
pub const TARGET_PRICE: usize = 0;
/// Column index of the realized market volume in a target row.
pub const TARGET_VOLUME: usize = 1;

/// Dense training pairs ready for supervised training.
///
/// `inputs` has shape `[n, lookback, n_features]`; `targets` has shape
/// `[n, horizon, 2]` with columns [`TARGET_PRICE`] and [`TARGET_VOLUME`].
/// Rows are ordered by session, then by window start within the session.
/// No shuffling or batching happens here; that belongs to the trainer.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub inputs: Array3<f64>,
    pub targets: Array3<f64>,
}

impl TrainingSet {
    /// Number of training pairs.
    pub fn len(&self) -> usize {
        self.inputs.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Chronological split: the first `floor(n * fraction)` pairs and the
    /// rest. Order is preserved on both sides; no shuffling, so the second
    /// half is always strictly later market data than the first.
    pub fn split(&self, fraction: f64) -> (TrainingSet, TrainingSet) {
        let boundary = (self.len() as f64 * fraction) as usize;
        let head = TrainingSet {
            inputs: self.inputs.slice(s![..boundary, .., ..]).to_owned(),
            targets: self.targets.slice(s![..boundary, .., ..]).to_owned(),
        };
        let tail = TrainingSet {
            inputs: self.inputs.slice(s![boundary.., .., ..]).to_owned(),
            targets: self.targets.slice(s![boundary.., .., ..]).to_owned(),
        };
        (head, tail)
    }

    /// Gather the pairs at `indices` into a new set (used for shuffled
    /// minibatches).
    pub fn select(&self, indices: &[usize]) -> TrainingSet {
        TrainingSet {
            inputs: self.inputs.select(Axis(0), indices),
            targets: self.targets.select(Axis(0), indices),
        }
    }
}

/// Build the full set of training pairs across all sessions.
///
/// Within each session of length `>= lookback + horizon`, window start `i`
/// runs over `0 ..= len - lookback - horizon`, emitting
/// `X = feature rows [i, i + lookback)` and
/// `Y = (avg_price, volume) rows [i + lookback, i + lookback + horizon)`.
/// A session of exactly the minimum length contributes exactly one pair.
///
/// Feature extraction for X is decoupled from the fixed price/volume targets
/// of Y: the configured `features` shape only the model input, while Y always
/// carries the raw columns the VWAP accounting needs.
pub fn build_sequences(bars: &[Bar], window: WindowConfig, features: &[Feature]) -> TrainingSet {
    let lookback = window.lookback();
    let horizon = window.horizon();
    let sessions = partition_sessions(bars);
    let total: usize = sessions.iter().map(|s| window.pair_count(s.len())).sum();

    let mut inputs = Array3::zeros((total, lookback, features.len()));
    let mut targets = Array3::zeros((total, horizon, 2));

    let mut row = 0;
    for session in &sessions {
        let pairs = window.pair_count(session.len());
        if pairs == 0 {
            continue;
        }
        let session_features = feature_matrix(session.bars, features);
        for i in 0..pairs {
            inputs
                .slice_mut(s![row, .., ..])
                .assign(&session_features.slice(s![i..i + lookback, ..]));
            let future = &session.bars[i + lookback..i + lookback + horizon];
            for (t, bar) in future.iter().enumerate() {
                targets[[row, t, TARGET_PRICE]] = bar.avg_price;
                targets[[row, t, TARGET_VOLUME]] = bar.volume;
            }
            row += 1;
        }
    }
    debug_assert_eq!(row, total);

    TrainingSet { inputs, targets }
}
