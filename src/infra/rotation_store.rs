// ============================================================
// Layer 6 - Rotation Store
// ============================================================
// Caches tokenized rotations on disk so the expensive load +
// tokenise + pad step runs once per rotation instead of once
// per training job.
//
// File naming convention:
//   <dir>/pfam_rotation_0.pkl
//   <dir>/pfam_rotation_1.pkl
//   ...
//
// The blob is the bincode encoding of TokenizedDataset.
// save_all builds the rotations in parallel on the rayon pool;
// each one re-reads its folds, so they share nothing mutable.
// Loading never falls back to rebuilding from CSV: a missing
// cache file is an error the operator has to fix by running
// `prepare` first.

use std::{
    fs,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use rayon::prelude::*;

use crate::data::assembler::{prepare_data_set, TokenizedDataset};
use crate::domain::hyperparams::UnknownLabelPolicy;
use crate::domain::traits::FoldSource;
use crate::error::DatasetError;

pub struct RotationStore {
    /// Directory holding the pfam_rotation_<r>.pkl files
    dir: PathBuf,
}

impl RotationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, rotation: usize) -> PathBuf {
        self.dir.join(format!("pfam_rotation_{rotation}.pkl"))
    }

    pub fn save(&self, ds: &TokenizedDataset) -> Result<PathBuf, DatasetError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(ds.rotation);

        let writer = BufWriter::new(fs::File::create(&path)?);
        bincode::serialize_into(writer, ds)?;

        tracing::info!("Wrote rotation {} to '{}'", ds.rotation, path.display());
        Ok(path)
    }

    /// Precompute and cache every rotation in `0..n_folds`.
    pub fn save_all(
        &self,
        source:        &(impl FoldSource + Sync),
        n_folds:       usize,
        n_train_folds: usize,
        policy:        UnknownLabelPolicy,
    ) -> Result<Vec<PathBuf>, DatasetError> {
        (0..n_folds)
            .into_par_iter()
            .map(|r| {
                let ds = prepare_data_set(source, r, n_folds, n_train_folds, policy)?;
                self.save(&ds)
            })
            .collect()
    }

    /// Load one cached rotation. Fails if it was never prepared.
    pub fn load(&self, rotation: usize) -> Result<TokenizedDataset, DatasetError> {
        let path = self.path(rotation);
        if !path.exists() {
            return Err(DatasetError::MissingRotation(path));
        }

        let reader = BufReader::new(fs::File::open(&path)?);
        let ds: TokenizedDataset = bincode::deserialize_from(reader)?;

        tracing::info!("Loaded cached rotation from '{}'", path.display());
        Ok(ds)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::InMemoryFolds;
    use crate::domain::fold::FoldRecord;

    fn folds() -> InMemoryFolds {
        InMemoryFolds {
            folds: (0..5)
                .map(|i| vec![FoldRecord::new("ACDE".repeat(i + 1), if i % 2 == 0 { "even" } else { "odd" })])
                .collect(),
        }
    }

    #[test]
    fn test_save_all_writes_every_rotation() {
        let dir   = tempfile::tempdir().unwrap();
        let store = RotationStore::new(dir.path());
        let paths = store.save_all(&folds(), 5, 3, UnknownLabelPolicy::Sentinel).unwrap();
        assert_eq!(paths.len(), 5);
        for r in 0..5 {
            assert!(store.path(r).exists());
        }
    }

    #[test]
    fn test_load_returns_what_was_saved() {
        let dir   = tempfile::tempdir().unwrap();
        let store = RotationStore::new(dir.path());
        let ds = prepare_data_set(&folds(), 2, 5, 3, UnknownLabelPolicy::Sentinel).unwrap();
        store.save(&ds).unwrap();
        assert_eq!(store.load(2).unwrap(), ds);
    }

    #[test]
    fn test_missing_rotation_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RotationStore::new(dir.path()).load(0).unwrap_err();
        assert!(matches!(err, DatasetError::MissingRotation(_)));
    }
}
