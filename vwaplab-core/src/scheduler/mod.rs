//! Allocation schedulers — the predictor seam of the engine.
//!
//! A scheduler maps a lookback window of feature rows to an allocation
//! schedule over the horizon. The simulator only ever talks to the
//! [`Scheduler`] trait; training talks to [`TrainableScheduler`]. Two
//! reference implementations ship here: an input-blind uniform baseline and
//! a softmax-linear model trained by SGD on the slippage objective's
//! analytic gradients.

mod linear;
mod uniform;

pub use linear::LinearScheduler;
pub use uniform::UniformScheduler;

use ndarray::{Array1, ArrayView2, ArrayView3};

use crate::loss::SlippageLoss;

/// Maps an input window to an allocation schedule.
///
/// Calling convention: ONE window per call. `window` has shape
/// `[lookback, n_features]`; the result has length `horizon()`, entries
/// non-negative. `predict` must be pure per call (no interior mutable
/// state), so a trained scheduler can be shared by reference across
/// concurrently simulated sessions; `Send + Sync` makes that a compile-time
/// obligation.
pub trait Scheduler: Send + Sync {
    /// Short stable identifier, used in reports and artifact manifests.
    fn name(&self) -> &'static str;

    /// Length of the schedules this model produces.
    fn horizon(&self) -> usize;

    /// Predict the allocation schedule for one input window.
    fn predict(&self, window: ArrayView2<'_, f64>) -> Array1<f64>;
}

/// A scheduler that learns from training pairs via the slippage objective.
pub trait TrainableScheduler: Scheduler {
    /// Apply one gradient step on a batch.
    ///
    /// `inputs` has shape `[batch, lookback, n_features]`, `targets`
    /// `[batch, horizon, 2]`. Returns the mean pre-update loss over the
    /// batch (0.0 for an empty batch).
    fn train_batch(
        &mut self,
        inputs: ArrayView3<'_, f64>,
        targets: ArrayView3<'_, f64>,
        loss: &SlippageLoss,
    ) -> f64;
}
