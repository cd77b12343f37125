//! Training harness: epochs, shuffled minibatches, validation split.
//!
//! The harness owns nothing model-specific. It splits the training pairs
//! chronologically, shuffles indices each epoch with a seeded RNG, feeds
//! minibatches to [`TrainableScheduler::train_batch`], and reports per-epoch
//! losses through a progress callback. Batch order is part of the learning
//! semantics, so training is strictly sequential.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vwaplab_core::loss::SlippageLoss;
use vwaplab_core::scheduler::TrainableScheduler;
use vwaplab_core::sequences::TrainingSet;

/// Errors from the training harness.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("training set is empty (no session is long enough for the configured window)")]
    EmptyTrainingSet,
}

/// Harness parameters, straight from the `[training]` config section.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub epochs: usize,
    /// Minibatch size; clamped to at least 1.
    pub batch_size: usize,
    /// Chronological tail of the pairs held out for validation, in [0, 1).
    pub validation_split: f64,
    pub seed: u64,
}

/// Losses for one epoch. `val_loss` is `None` when the validation split
/// rounds down to zero pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    pub epoch: usize,
    pub train_loss: f64,
    pub val_loss: Option<f64>,
}

/// Callback for epoch-by-epoch reporting.
pub trait TrainProgress {
    fn on_epoch(&self, stats: &EpochStats, total_epochs: usize);
}

/// Prints one line per epoch.
pub struct StdoutProgress;

impl TrainProgress for StdoutProgress {
    fn on_epoch(&self, stats: &EpochStats, total_epochs: usize) {
        match stats.val_loss {
            Some(val) => println!(
                "epoch {:>3}/{}  train loss {:.6e}  val loss {:.6e}",
                stats.epoch, total_epochs, stats.train_loss, val
            ),
            None => println!(
                "epoch {:>3}/{}  train loss {:.6e}",
                stats.epoch, total_epochs, stats.train_loss
            ),
        }
    }
}

/// Train a scheduler on the slippage objective.
///
/// Returns one [`EpochStats`] per epoch. `train_loss` is the mean pre-update
/// loss over the epoch's minibatches (weighted by batch size); `val_loss` is
/// a pure forward pass over the held-out tail after the epoch's updates.
pub fn train_scheduler(
    model: &mut dyn TrainableScheduler,
    data: &TrainingSet,
    loss: &SlippageLoss,
    opts: &TrainOptions,
    progress: Option<&dyn TrainProgress>,
) -> Result<Vec<EpochStats>, TrainError> {
    if data.is_empty() {
        return Err(TrainError::EmptyTrainingSet);
    }
    let (train, val) = data.split(1.0 - opts.validation_split);
    if train.is_empty() {
        return Err(TrainError::EmptyTrainingSet);
    }

    let batch_size = opts.batch_size.max(1);
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut indices: Vec<usize> = (0..train.len()).collect();
    let mut history = Vec::with_capacity(opts.epochs);

    for epoch in 1..=opts.epochs {
        indices.shuffle(&mut rng);

        let mut weighted_loss = 0.0;
        for chunk in indices.chunks(batch_size) {
            let batch = train.select(chunk);
            let batch_loss = model.train_batch(batch.inputs.view(), batch.targets.view(), loss);
            weighted_loss += batch_loss * chunk.len() as f64;
        }
        let train_loss = weighted_loss / train.len() as f64;
        let val_loss = if val.is_empty() {
            None
        } else {
            Some(mean_forward_loss(&*model, &val, loss))
        };

        let stats = EpochStats {
            epoch,
            train_loss,
            val_loss,
        };
        if let Some(p) = progress {
            p.on_epoch(&stats, opts.epochs);
        }
        history.push(stats);
    }

    Ok(history)
}

/// Mean loss of forward passes over a set, no updates.
fn mean_forward_loss(
    model: &dyn TrainableScheduler,
    set: &TrainingSet,
    loss: &SlippageLoss,
) -> f64 {
    let mut total = 0.0;
    for (window, target) in set.inputs.outer_iter().zip(set.targets.outer_iter()) {
        let schedule = model.predict(window);
        total += loss.value(target, schedule.view());
    }
    total / set.len() as f64
}
