//! Even-allocation baseline.

use ndarray::{Array1, ArrayView2};

use super::Scheduler;

/// Spreads the order evenly across the horizon, ignoring the input window.
///
/// The TWAP-style floor every trained scheduler has to beat; also the stub
/// of choice in simulator tests because its execution arithmetic is exact
/// (equal shares every minute make the model VWAP a simple mean).
#[derive(Debug, Clone, Copy)]
pub struct UniformScheduler {
    horizon: usize,
}

impl UniformScheduler {
    /// `horizon` must be positive; config validation guarantees that before
    /// construction.
    pub fn new(horizon: usize) -> Self {
        UniformScheduler { horizon }
    }
}

impl Scheduler for UniformScheduler {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn horizon(&self) -> usize {
        self.horizon
    }

    fn predict(&self, _window: ArrayView2<'_, f64>) -> Array1<f64> {
        Array1::from_elem(self.horizon, 1.0 / self.horizon as f64)
    }
}
