// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam,
// with early stopping on a validation quantity.
//
// Key Burn insight:
//   - Training uses B (an AutodiffBackend) for gradients
//   - model.valid() returns the model on B::InnerBackend
//   - Validation scoring runs on that inner model, so dropout
//     is off and no autodiff graph is recorded
//
// Early stopping keeps a clone of the best model seen so far
// and hands it back at the end, whether the loop ran out of
// epochs or patience.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{batcher::SequenceBatcher, dataset::SequenceDataset};
use crate::domain::{experiment::ExperimentConfig, hyperparams::Monitor};
use crate::infra::metrics::EpochMetrics;
use crate::ml::evaluator::evaluate;
use crate::ml::model::{RnnClassifier, RnnClassifierConfig};

// ─── Optimiser Settings ──────────────────────────────────────────────────────
/// Adam with a per-step time decay on the learning rate:
///   lr_t = lrate / (1 + decay * t)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerSettings {
    pub lrate: f64,
    pub decay: f64,
}

impl OptimizerSettings {
    pub fn learning_rate(&self, step: usize) -> f64 {
        self.lrate / (1.0 + self.decay * step as f64)
    }

    pub fn adam(&self) -> AdamConfig {
        AdamConfig::new()
            .with_beta_1(0.9)
            .with_beta_2(0.999)
            .with_epsilon(1e-7)
    }
}

// ─── Training Settings ───────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSettings {
    pub epochs:    usize,
    pub batch:     usize,
    pub seed:      u64,
    pub patience:  usize,
    pub min_delta: f64,
    pub monitor:   Monitor,
    pub optimizer: OptimizerSettings,
}

impl From<&ExperimentConfig> for TrainSettings {
    fn from(cfg: &ExperimentConfig) -> Self {
        Self {
            epochs:    cfg.epochs,
            batch:     cfg.batch,
            seed:      cfg.seed,
            patience:  cfg.patience,
            min_delta: cfg.min_delta,
            monitor:   cfg.monitor,
            optimizer: OptimizerSettings { lrate: cfg.lrate, decay: cfg.decay },
        }
    }
}

// ─── Early Stopping ──────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopDecision {
    /// This epoch is the new best
    Improved,
    Continue,
    Stop,
}

/// Stops when the monitored value has not improved by more than
/// `min_delta` for `patience` consecutive epochs.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    pub patience:  usize,
    pub min_delta: f64,
    pub monitor:   Monitor,
    wait:          usize,
    best:          Option<f64>,
    best_epoch:    usize,
}

impl EarlyStopping {
    pub fn new(patience: usize, min_delta: f64, monitor: Monitor) -> Self {
        Self { patience, min_delta, monitor, wait: 0, best: None, best_epoch: 0 }
    }

    pub fn on_epoch_end(&mut self, epoch: usize, value: f64) -> StopDecision {
        let improved = match self.best {
            None => true,
            Some(best) if self.monitor.lower_is_better() => value < best - self.min_delta,
            Some(best) => value > best + self.min_delta,
        };

        if improved {
            self.best       = Some(value);
            self.best_epoch = epoch;
            self.wait       = 0;
            return StopDecision::Improved;
        }

        self.wait += 1;
        if self.wait >= self.patience {
            StopDecision::Stop
        } else {
            StopDecision::Continue
        }
    }

    pub fn best(&self) -> Option<f64> {
        self.best
    }

    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }
}

// ─── Training Outcome ────────────────────────────────────────────────────────
pub struct TrainingOutcome<B: AutodiffBackend> {
    /// Weights from the best epoch
    pub model:         RnnClassifier<B>,
    pub history:       Vec<EpochMetrics>,
    pub best_epoch:    usize,
    pub stopped_early: bool,
}

pub fn fit<B: AutodiffBackend>(
    model_cfg: &RnnClassifierConfig,
    settings:  &TrainSettings,
    train:     SequenceDataset,
    valid:     &SequenceDataset,
    device:    &B::Device,
) -> Result<TrainingOutcome<B>> {

    // ── Build model ───────────────────────────────────────────────────────────
    B::seed(settings.seed);
    let mut model: RnnClassifier<B> = model_cfg.init(device);
    tracing::info!(
        "Model ready: {} params, rnn={} ({}), hidden={:?}",
        model.num_params(),
        model_cfg.rnn_neurons,
        if model_cfg.use_gru { "gru".to_string() } else { model_cfg.rnn_activation.to_string() },
        model_cfg.hidden,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let mut optim = settings.optimizer.adam().init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = SequenceBatcher::<B>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(settings.batch)
        .shuffle(settings.seed)
        .num_workers(1)
        .build(train);

    let mut stopper = EarlyStopping::new(settings.patience, settings.min_delta, settings.monitor);
    let mut best_model    = model.clone();
    let mut history       = Vec::with_capacity(settings.epochs);
    let mut stopped_early = false;
    let mut step          = 0usize;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=settings.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.tokens, batch.targets);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(settings.optimizer.learning_rate(step), model, grads);
            step += 1;
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → RnnClassifier<B::InnerBackend>, dropout disabled
        let val = evaluate(&model.valid(), valid, settings.batch, device)?.evaluation;

        let metrics = EpochMetrics::new(epoch, avg_train_loss, val.loss, val.binary_accuracy, val.auc);

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}% | val_auc={:.3}",
            epoch, settings.epochs, avg_train_loss, val.loss,
            val.binary_accuracy * 100.0, val.auc,
        );

        let decision = stopper.on_epoch_end(epoch, metrics.monitored(settings.monitor));
        history.push(metrics);

        match decision {
            StopDecision::Improved => best_model = model.clone(),
            StopDecision::Continue => {}
            StopDecision::Stop => {
                tracing::info!(
                    "Early stopping at epoch {}: {} has not improved since epoch {}",
                    epoch, settings.monitor, stopper.best_epoch(),
                );
                stopped_early = true;
                break;
            }
        }
    }

    tracing::info!(
        "Training complete! Restoring weights from epoch {} ({}={:.4})",
        stopper.best_epoch(),
        settings.monitor,
        stopper.best().unwrap_or(f64::NAN),
    );

    Ok(TrainingOutcome {
        model: best_model,
        history,
        best_epoch: stopper.best_epoch(),
        stopped_early,
    })
}
