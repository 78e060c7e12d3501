use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::assembler::SequenceMatrix;

/// One padded token sequence with its binary target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceSample {
    pub tokens: Vec<u32>,
    /// 1 when the row belongs to the positive class, else 0
    pub target: u8,
}

#[derive(Debug, Clone)]
pub struct SequenceDataset {
    samples: Vec<SequenceSample>,
}

impl SequenceDataset {
    /// One-vs-rest view of a split: class `positive_class` is 1, every
    /// other index (including the unknown-label sentinel) is 0.
    pub fn from_split(ins: &SequenceMatrix, outs: &[i64], positive_class: usize) -> Self {
        let samples = ins
            .iter_rows()
            .zip(outs)
            .map(|(row, &label)| SequenceSample {
                tokens: row.to_vec(),
                target: u8::from(label == positive_class as i64),
            })
            .collect();
        Self { samples }
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    pub fn samples(&self) -> &[SequenceSample] {
        &self.samples
    }

    pub fn targets(&self) -> Vec<u8> {
        self.samples.iter().map(|s| s.target).collect()
    }
}

impl Dataset<SequenceSample> for SequenceDataset {
    fn get(&self, index: usize) -> Option<SequenceSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_vs_rest_targets() {
        let ins = SequenceMatrix::from_rows(vec![vec![1, 2], vec![0, 3], vec![2, 2]], 2);
        let ds = SequenceDataset::from_split(&ins, &[0, 1, -1], 0);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.targets(), vec![1, 0, 0]);
        assert_eq!(ds.get(1).unwrap().tokens, vec![0, 3]);
    }
}
