//! Trainable softmax-linear scheduler.

use ndarray::{Array1, Array2, ArrayView2, ArrayView3, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{Scheduler, TrainableScheduler};
use crate::loss::SlippageLoss;

/// Linear model over the flattened input window with a softmax output head.
///
/// `schedule = softmax(W · flatten(window) + b)`, so predictions are always
/// positive and sum to one. Trained by plain SGD: the slippage objective's
/// analytic gradient is pulled back through the softmax. Weight init is a
/// seeded uniform draw scaled by `1/sqrt(input_dim)`, which keeps the
/// initial logits small and the starting schedule near uniform.
#[derive(Debug, Clone)]
pub struct LinearScheduler {
    /// `[horizon, lookback * n_features]`
    weights: Array2<f64>,
    /// `[horizon]`
    bias: Array1<f64>,
    lookback: usize,
    n_features: usize,
    horizon: usize,
    learning_rate: f64,
}

impl LinearScheduler {
    pub fn new(
        lookback: usize,
        n_features: usize,
        horizon: usize,
        learning_rate: f64,
        seed: u64,
    ) -> Self {
        let input_dim = lookback * n_features;
        let scale = (1.0 / input_dim.max(1) as f64).sqrt();
        let mut rng = StdRng::seed_from_u64(seed);
        let weights =
            Array2::random_using((horizon, input_dim), Uniform::new(-scale, scale), &mut rng);

        LinearScheduler {
            weights,
            bias: Array1::zeros(horizon),
            lookback,
            n_features,
            horizon,
            learning_rate,
        }
    }

    /// Forward pass on a flattened window.
    fn forward(&self, x: &Array1<f64>) -> Array1<f64> {
        let logits = self.weights.dot(x) + &self.bias;
        softmax(&logits)
    }
}

/// Numerically stable softmax (shift by the max logit).
fn softmax(logits: &Array1<f64>) -> Array1<f64> {
    let max = logits.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}

/// Row-major flatten of an input window into the model's input vector.
fn flatten(window: ArrayView2<'_, f64>) -> Array1<f64> {
    Array1::from_iter(window.iter().copied())
}

impl Scheduler for LinearScheduler {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn horizon(&self) -> usize {
        self.horizon
    }

    fn predict(&self, window: ArrayView2<'_, f64>) -> Array1<f64> {
        debug_assert_eq!(window.nrows(), self.lookback);
        debug_assert_eq!(window.ncols(), self.n_features);
        self.forward(&flatten(window))
    }
}

impl TrainableScheduler for LinearScheduler {
    fn train_batch(
        &mut self,
        inputs: ArrayView3<'_, f64>,
        targets: ArrayView3<'_, f64>,
        loss: &SlippageLoss,
    ) -> f64 {
        let batch = inputs.len_of(Axis(0));
        if batch == 0 {
            return 0.0;
        }
        debug_assert_eq!(batch, targets.len_of(Axis(0)));
        debug_assert_eq!(inputs.len_of(Axis(1)), self.lookback);
        debug_assert_eq!(inputs.len_of(Axis(2)), self.n_features);
        debug_assert_eq!(targets.len_of(Axis(1)), self.horizon);

        let input_dim = self.lookback * self.n_features;
        let mut grad_w = Array2::<f64>::zeros((self.horizon, input_dim));
        let mut grad_b = Array1::<f64>::zeros(self.horizon);
        let mut total_loss = 0.0;

        for (window, target) in inputs.outer_iter().zip(targets.outer_iter()) {
            let x = flatten(window);
            let schedule = self.forward(&x);
            let (value, grad_s) = loss.value_grad(target, schedule.view());
            total_loss += value;

            // Softmax pullback: dL/dz_j = y_j * (g_j - Σ_i g_i y_i).
            let inner = grad_s.dot(&schedule);
            let grad_z = &schedule * &(&grad_s - inner);

            grad_w += &grad_z
                .view()
                .insert_axis(Axis(1))
                .dot(&x.view().insert_axis(Axis(0)));
            grad_b += &grad_z;
        }

        let step = self.learning_rate / batch as f64;
        self.weights -= &(grad_w * step);
        self.bias -= &(grad_b * step);

        total_loss / batch as f64
    }
}
