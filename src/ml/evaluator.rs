// ============================================================
// Layer 5 - Evaluator
// ============================================================
// Runs a trained model over a whole split and scores it.
//
// Called with the inner (non-autodiff) backend, i.e. on
// model.valid(), so dropout is disabled and no graph is built.
//
//   SequenceDataset ──► batches ──► logits (host Vec<f32>)
//                                      │
//                       ┌──────────────┼──────────────┐
//                       ▼              ▼              ▼
//                 probabilities   BCE + penalty   accuracy / AUC

use anyhow::{anyhow, Result};
use burn::{data::dataloader::batcher::Batcher, prelude::*};
use serde::{Deserialize, Serialize};

use crate::data::{batcher::SequenceBatcher, dataset::SequenceDataset};
use crate::ml::metrics::{bce_with_logits, binary_accuracy, roc_auc, sigmoid};
use crate::ml::model::RnnClassifier;

/// Scores for one split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitEvaluation {
    pub loss:            f64,
    pub binary_accuracy: f64,
    pub auc:             f64,
}

/// Per-row probabilities plus the split's scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPredictions {
    pub probabilities: Vec<f32>,
    pub evaluation:    SplitEvaluation,
}

/// Raw logits for every row of `dataset`, in row order.
pub fn predict_logits<B: Backend>(
    model:   &RnnClassifier<B>,
    dataset: &SequenceDataset,
    batch:   usize,
    device:  &B::Device,
) -> Result<Vec<f32>> {
    let batcher = SequenceBatcher::<B>::new(device.clone());
    let mut logits = Vec::with_capacity(dataset.sample_count());

    for chunk in dataset.samples().chunks(batch.max(1)) {
        let batch = batcher.batch(chunk.to_vec());
        let out = model
            .forward_logits(batch.tokens)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read logits back from device: {e:?}"))?;
        logits.extend(out);
    }
    Ok(logits)
}

/// Predict and score one split. The loss includes the weight penalty.
pub fn evaluate<B: Backend>(
    model:   &RnnClassifier<B>,
    dataset: &SequenceDataset,
    batch:   usize,
    device:  &B::Device,
) -> Result<SplitPredictions> {
    let logits  = predict_logits(model, dataset, batch, device)?;
    let targets = dataset.targets();

    let penalty = match model.penalty() {
        Some(p) => p.into_scalar().elem::<f64>(),
        None    => 0.0,
    };

    let probabilities: Vec<f32> = logits.iter().map(|&z| sigmoid(z)).collect();
    let evaluation = SplitEvaluation {
        loss:            bce_with_logits(&logits, &targets) + penalty,
        binary_accuracy: binary_accuracy(&probabilities, &targets),
        auc:             roc_auc(&probabilities, &targets),
    };

    Ok(SplitPredictions { probabilities, evaluation })
}
