//! Slippage objective — the training loss for allocation schedules.
//!
//! Scores a predicted schedule against the realized market over the same
//! horizon: squared difference between the schedule's achieved VWAP and the
//! market's benchmark VWAP. The schedule enters only through its own
//! normalized distribution, so the objective is scale-tolerant and the model
//! is shaped toward the RELATIVE allocation across the horizon; absolute
//! order size is supplied at execution time.
//!
//! Gradient-based trainers need exact derivatives, so the analytic gradient
//! with respect to the schedule is exposed next to the value.

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::sequences::{TARGET_PRICE, TARGET_VOLUME};

/// Squared VWAP-slippage loss with a tunable denominator stabilizer.
///
/// `epsilon` guards both VWAP denominators against degenerate all-zero
/// schedules or dead-market horizons. It is a numerical-stability knob, not
/// a fact about the data; the default matches the classic value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlippageLoss {
    pub epsilon: f64,
}

impl Default for SlippageLoss {
    fn default() -> Self {
        SlippageLoss { epsilon: 1e-8 }
    }
}

impl SlippageLoss {
    pub fn new(epsilon: f64) -> Self {
        SlippageLoss { epsilon }
    }

    /// Loss for one example.
    ///
    /// `target` has shape `[horizon, 2]` with the realized price and market
    /// volume columns; `schedule` is the predicted allocation of length
    /// `horizon`.
    ///
    /// `model_vwap = Σ(schedule·price) / (Σ schedule + ε)`,
    /// `benchmark_vwap = Σ(volume·price) / (Σ volume + ε)`,
    /// loss `= (model_vwap - benchmark_vwap)²`.
    pub fn value(&self, target: ArrayView2<'_, f64>, schedule: ArrayView1<'_, f64>) -> f64 {
        let (model_vwap, benchmark_vwap, _) = self.vwaps(target, schedule);
        let diff = model_vwap - benchmark_vwap;
        diff * diff
    }

    /// Analytic gradient of [`value`](Self::value) with respect to the
    /// schedule.
    ///
    /// With `m` the model VWAP, `b` the benchmark VWAP, and
    /// `D = Σ schedule + ε`:
    /// `dL/ds_j = 2 (m - b) (p_j - m) / D`.
    pub fn gradient(
        &self,
        target: ArrayView2<'_, f64>,
        schedule: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        self.value_grad(target, schedule).1
    }

    /// Loss and gradient in one pass (the trainer's hot path).
    pub fn value_grad(
        &self,
        target: ArrayView2<'_, f64>,
        schedule: ArrayView1<'_, f64>,
    ) -> (f64, Array1<f64>) {
        let (model_vwap, benchmark_vwap, schedule_sum) = self.vwaps(target, schedule);
        let diff = model_vwap - benchmark_vwap;
        let grad = target
            .column(TARGET_PRICE)
            .mapv(|p| 2.0 * diff * (p - model_vwap) / schedule_sum);
        (diff * diff, grad)
    }

    /// Both VWAPs plus the stabilized schedule denominator.
    fn vwaps(&self, target: ArrayView2<'_, f64>, schedule: ArrayView1<'_, f64>) -> (f64, f64, f64) {
        debug_assert_eq!(target.nrows(), schedule.len());

        let prices = target.column(TARGET_PRICE);
        let volumes = target.column(TARGET_VOLUME);

        let schedule_sum = schedule.sum() + self.epsilon;
        let model_vwap = schedule.dot(&prices) / schedule_sum;

        let volume_sum = volumes.sum() + self.epsilon;
        let benchmark_vwap = volumes.dot(&prices) / volume_sum;

        (model_vwap, benchmark_vwap, schedule_sum)
    }
}
