// ============================================================
// Layer 4 - Sequence Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<SequenceSample>
// into device tensors.
//
// How batching works here:
//   Input:  Vec of N samples, each with len_max tokens
//   Output: SequenceBatch with tokens [N, len_max], targets [N]
//
//   Every row is already padded to len_max by the assembler,
//   so a flat Vec reshaped to [N, len_max] is all it takes.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SequenceSample;

// ─── SequenceBatch ────────────────────────────────────────────────────────────
/// A batch of sequences ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    /// Token IDs - shape: [batch_size, len_max]
    pub tokens: Tensor<B, 2, Int>,

    /// Binary targets - shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

// ─── SequenceBatcher ──────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct SequenceBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SequenceBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SequenceSample, SequenceBatch<B>> for SequenceBatcher<B> {
    fn batch(&self, items: Vec<SequenceSample>) -> SequenceBatch<B> {
        let batch_size = items.len();
        let len_max    = items.first().map(|s| s.tokens.len()).unwrap_or(0);

        // Burn Int tensors are built from i32 here
        let token_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.tokens.iter().map(|&t| t as i32))
            .collect();

        let targets: Vec<i32> = items
            .iter()
            .map(|s| s.target as i32)
            .collect();

        let tokens = Tensor::<B, 1, Int>::from_ints(
            token_flat.as_slice(), &self.device
        ).reshape([batch_size, len_max]);

        let targets = Tensor::<B, 1, Int>::from_ints(
            targets.as_slice(), &self.device
        );

        SequenceBatch { tokens, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes() {
        let batcher = SequenceBatcher::<NdArray>::new(Default::default());
        let batch = batcher.batch(vec![
            SequenceSample { tokens: vec![0, 1, 2], target: 1 },
            SequenceSample { tokens: vec![3, 4, 5], target: 0 },
        ]);
        assert_eq!(batch.tokens.dims(), [2, 3]);
        assert_eq!(batch.targets.dims(), [2]);
    }
}
