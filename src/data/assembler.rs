// ============================================================
// Layer 4 - Rotation Assembler
// ============================================================
// Turns a rotation of raw folds into a tokenized train/valid/test
// data set ready for the model.
//
// Steps:
//   1. Pick fold roles for the rotation (domain::rotation)
//   2. Load and concatenate the folds of each split, in order
//   3. len_max = longest TRAINING string
//   4. Fit the character tokenizer on TRAINING strings only
//   5. Encode + pad every split to len_max
//   6. Fit the label encoder on TRAINING labels only
//   7. Encode every split's labels (unseen → policy)
//
// Nothing from the validation or test split influences len_max,
// the vocabulary or the label indices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::tokenizer::{CharTokenizer, LabelEncoder};
use crate::domain::fold::FoldRecord;
use crate::domain::hyperparams::UnknownLabelPolicy;
use crate::domain::rotation::Rotation;
use crate::domain::traits::FoldSource;
use crate::error::DatasetError;

/// Label index written for rows whose label was unseen in training.
pub const UNKNOWN_LABEL: i64 = -1;

/// Row-major `rows x cols` token matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceMatrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<u32>,
}

impl SequenceMatrix {
    pub fn from_rows(rows: Vec<Vec<u32>>, cols: usize) -> Self {
        let n = rows.len();
        let data: Vec<u32> = rows.into_iter().flatten().collect();
        debug_assert_eq!(data.len(), n * cols);
        Self { rows: n, cols, data }
    }

    pub fn row(&self, i: usize) -> &[u32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[u32]> {
        (0..self.rows).map(move |i| self.row(i))
    }
}

/// The cached, model-ready representation of one rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizedDataset {
    pub ins_train:      SequenceMatrix,
    pub outs_train:     Vec<i64>,
    pub ins_valid:      SequenceMatrix,
    pub outs_valid:     Vec<i64>,
    pub ins_test:       SequenceMatrix,
    pub outs_test:      Vec<i64>,
    /// Longest training string, the width of every ins_* matrix
    pub len_max:        usize,
    /// Vocabulary size + 2 (padding and out-of-vocabulary)
    pub n_tokens:       usize,
    pub out_index_word: BTreeMap<usize, String>,
    pub out_word_index: BTreeMap<String, usize>,
    pub rotation:       usize,
    /// Fold layout the rotation was assembled with
    pub n_folds:        usize,
    pub n_train_folds:  usize,
}

impl TokenizedDataset {
    pub fn label_name(&self, index: i64) -> Option<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.out_index_word.get(&i))
            .map(String::as_str)
    }

    /// Fails unless this cache was assembled with the given fold layout.
    pub fn check_layout(
        &self,
        rotation:      usize,
        n_folds:       usize,
        n_train_folds: usize,
    ) -> Result<(), DatasetError> {
        let cached = (self.rotation, self.n_folds, self.n_train_folds);
        if cached != (rotation, n_folds, n_train_folds) {
            return Err(DatasetError::LayoutMismatch {
                cached:    format!("rotation={} n_folds={} n_training={}", cached.0, cached.1, cached.2),
                requested: format!("rotation={rotation} n_folds={n_folds} n_training={n_train_folds}"),
            });
        }
        Ok(())
    }

    pub fn summary(&self) -> String {
        format!(
            "rotation {}: train={} valid={} test={} len_max={} n_tokens={} classes={}",
            self.rotation,
            self.ins_train.rows,
            self.ins_valid.rows,
            self.ins_test.rows,
            self.len_max,
            self.n_tokens,
            self.out_word_index.len(),
        )
    }
}

/// Load the folds of one split and concatenate them in order.
fn load_split(source: &impl FoldSource, folds: &[usize]) -> Result<Vec<FoldRecord>, DatasetError> {
    let mut rows = Vec::new();
    for &fold in folds {
        rows.extend(source.load_fold(fold)?);
    }
    Ok(rows)
}

fn encode_labels(
    rows:    &[FoldRecord],
    encoder: &LabelEncoder,
    split:   &'static str,
    policy:  UnknownLabelPolicy,
) -> Result<Vec<i64>, DatasetError> {
    let mut unknown = 0usize;
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        match encoder.encode(&row.label) {
            Some(i) => out.push(i as i64),
            None => match policy {
                UnknownLabelPolicy::Reject => {
                    return Err(DatasetError::UnknownLabel { split, label: row.label.clone() });
                }
                UnknownLabelPolicy::Sentinel => {
                    unknown += 1;
                    out.push(UNKNOWN_LABEL);
                }
            },
        }
    }

    if unknown > 0 {
        tracing::warn!(
            "{} {} rows carry labels unseen in training; encoded as {}",
            unknown, split, UNKNOWN_LABEL
        );
    }
    Ok(out)
}

/// Assemble and tokenize one rotation.
pub fn prepare_data_set(
    source:        &impl FoldSource,
    rotation:      usize,
    n_folds:       usize,
    n_train_folds: usize,
    policy:        UnknownLabelPolicy,
) -> Result<TokenizedDataset, DatasetError> {
    let rot = Rotation::new(rotation, n_folds, n_train_folds)?;
    tracing::info!(
        "Rotation {}: train folds {:?}, valid fold {}, test fold {}",
        rot.rotation, rot.train, rot.valid, rot.test
    );

    let train = load_split(source, &rot.train)?;
    let valid = load_split(source, &[rot.valid])?;
    let test  = load_split(source, &[rot.test])?;

    if train.is_empty() {
        return Err(DatasetError::EmptyTrainingSplit);
    }

    // ── Inputs ────────────────────────────────────────────────────────────────
    let len_max = train
        .iter()
        .map(|r| r.string.chars().count())
        .max()
        .unwrap_or(0);
    if len_max == 0 {
        return Err(DatasetError::EmptyTrainingSequences);
    }

    tracing::debug!("Fitting character tokenizer on {} training strings", train.len());
    let tokenizer = CharTokenizer::fit(train.iter().map(|r| r.string.as_str()));

    let encode = |rows: &[FoldRecord]| {
        SequenceMatrix::from_rows(
            rows.iter()
                .map(|r| tokenizer.encode_padded(&r.string, len_max))
                .collect(),
            len_max,
        )
    };

    // ── Outputs ───────────────────────────────────────────────────────────────
    let labels = LabelEncoder::fit(train.iter().map(|r| r.label.as_str()));
    tracing::debug!("Label encoder fitted: {} training classes", labels.n_classes());
    let outs_train = encode_labels(&train, &labels, "train", policy)?;
    let outs_valid = encode_labels(&valid, &labels, "valid", policy)?;
    let outs_test  = encode_labels(&test,  &labels, "test",  policy)?;

    let n_tokens = tokenizer.n_tokens();
    let (out_index_word, out_word_index) = labels.into_maps();

    let ds = TokenizedDataset {
        ins_train: encode(&train),
        outs_train,
        ins_valid: encode(&valid),
        outs_valid,
        ins_test:  encode(&test),
        outs_test,
        len_max,
        n_tokens,
        out_index_word,
        out_word_index,
        rotation,
        n_folds,
        n_train_folds,
    };
    tracing::info!("{}", ds.summary());
    Ok(ds)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::InMemoryFolds;

    /// Five single-row folds; fold i's sequence is i+1 characters long.
    fn five_folds() -> InMemoryFolds {
        let labels = ["A", "B", "A", "C", "B"];
        InMemoryFolds {
            folds: labels
                .iter()
                .enumerate()
                .map(|(i, l)| vec![FoldRecord::new("M".repeat(i + 1), *l)])
                .collect(),
        }
    }

    #[test]
    fn test_rotation_zero_split_membership() {
        let ds = prepare_data_set(&five_folds(), 0, 5, 3, UnknownLabelPolicy::Sentinel).unwrap();
        // train = folds 0,1,2 → labels A,B,A
        assert_eq!(ds.ins_train.rows, 3);
        assert_eq!(ds.outs_train, vec![0, 1, 0]);
        // valid = fold 3 → C, unseen in training
        assert_eq!(ds.outs_valid, vec![UNKNOWN_LABEL]);
        // test = fold 4 → B
        assert_eq!(ds.outs_test, vec![1]);
        // longest training string is fold 2 (3 chars)
        assert_eq!(ds.len_max, 3);
    }

    #[test]
    fn test_rotation_four_split_membership() {
        let ds = prepare_data_set(&five_folds(), 4, 5, 3, UnknownLabelPolicy::Sentinel).unwrap();
        // train = folds 4,0,1 → B,A,B; valid = fold 2 (A); test = fold 3 (C)
        assert_eq!(ds.outs_train, vec![0, 1, 0]);
        assert_eq!(ds.label_name(0), Some("B"));
        assert_eq!(ds.label_name(1), Some("A"));
        assert_eq!(ds.outs_valid, vec![1]);
        assert_eq!(ds.outs_test, vec![UNKNOWN_LABEL]);
        // fold 4 has 5 chars
        assert_eq!(ds.len_max, 5);
    }

    #[test]
    fn test_len_max_comes_from_training_only() {
        let ds = prepare_data_set(&five_folds(), 0, 5, 3, UnknownLabelPolicy::Sentinel).unwrap();
        // valid (4 chars) and test (5 chars) are longer than len_max=3 and get truncated
        for m in [&ds.ins_train, &ds.ins_valid, &ds.ins_test] {
            assert_eq!(m.cols, 3);
            for row in m.iter_rows() {
                assert_eq!(row.len(), 3);
            }
        }
        // fold 0 ("M") is left-padded
        assert_eq!(ds.ins_train.row(0), &[0, 0, 1]);
    }

    #[test]
    fn test_reject_policy_fails_on_unseen_label() {
        let err = prepare_data_set(&five_folds(), 0, 5, 3, UnknownLabelPolicy::Reject).unwrap_err();
        match err {
            DatasetError::UnknownLabel { split, label } => {
                assert_eq!(split, "valid");
                assert_eq!(label, "C");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_training_labels_round_trip() {
        let src = InMemoryFolds {
            folds: vec![
                vec![FoldRecord::new("AC", "PF00042"), FoldRecord::new("GG", "PF00017")],
                vec![FoldRecord::new("CA", "PF00042")],
                vec![FoldRecord::new("T", "PF00017")],
                vec![FoldRecord::new("A", "PF00042")],
            ],
        };
        let ds = prepare_data_set(&src, 0, 4, 2, UnknownLabelPolicy::Sentinel).unwrap();
        let names: Vec<&str> = ds.outs_train.iter().map(|&i| ds.label_name(i).unwrap()).collect();
        assert_eq!(names, vec!["PF00042", "PF00017", "PF00042"]);
    }

    #[test]
    fn test_n_tokens_is_vocab_plus_two() {
        let src = InMemoryFolds {
            folds: vec![
                vec![FoldRecord::new("ACD", "x")],
                vec![FoldRecord::new("E", "x")],
                vec![FoldRecord::new("Q", "x")],
            ],
        };
        let ds = prepare_data_set(&src, 0, 3, 1, UnknownLabelPolicy::Sentinel).unwrap();
        assert_eq!(ds.n_tokens, 3 + 2);
        // 'E' is not in the training vocabulary → OOV index (vocab_len + 1)
        assert_eq!(ds.ins_valid.row(0), &[0, 0, 4]);
    }

    #[test]
    fn test_empty_training_split_is_error() {
        let src = InMemoryFolds { folds: vec![vec![], vec![], vec![]] };
        assert!(matches!(
            prepare_data_set(&src, 0, 3, 1, UnknownLabelPolicy::Sentinel),
            Err(DatasetError::EmptyTrainingSplit)
        ));
    }

    #[test]
    fn test_blank_training_strings_are_error() {
        let src = InMemoryFolds {
            folds: vec![
                vec![FoldRecord::new("", "x"), FoldRecord::new("", "y")],
                vec![FoldRecord::new("AC", "x")],
                vec![FoldRecord::new("G", "y")],
            ],
        };
        assert!(matches!(
            prepare_data_set(&src, 0, 3, 1, UnknownLabelPolicy::Sentinel),
            Err(DatasetError::EmptyTrainingSequences)
        ));
    }

    #[test]
    fn test_layout_check() {
        let ds = prepare_data_set(&five_folds(), 1, 5, 3, UnknownLabelPolicy::Sentinel).unwrap();
        assert_eq!((ds.n_folds, ds.n_train_folds), (5, 3));
        assert!(ds.check_layout(1, 5, 3).is_ok());
        assert!(matches!(ds.check_layout(1, 5, 2), Err(DatasetError::LayoutMismatch { .. })));
        assert!(matches!(ds.check_layout(0, 5, 3), Err(DatasetError::LayoutMismatch { .. })));
    }
}
