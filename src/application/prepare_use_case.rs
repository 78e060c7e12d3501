// ============================================================
// Layer 2 - PrepareUseCase
// ============================================================
// One-off preprocessing run before any experiment:
//
//   Step 1: Point a CsvFoldSource at the fold directory  (Layer 4)
//   Step 2: Assemble + tokenise every rotation           (Layer 4)
//   Step 3: Write pfam_rotation_<r>.pkl for each         (Layer 6)
//
// The experiment driver only ever reads these caches.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::data::loader::CsvFoldSource;
use crate::domain::hyperparams::UnknownLabelPolicy;
use crate::infra::rotation_store::RotationStore;

#[derive(Debug, Clone, PartialEq)]
pub struct PrepareConfig {
    /// Directory holding pfam_fold_<i>.csv
    pub dataset:       String,
    /// Where to write the rotation caches (defaults to `dataset`)
    pub out_dir:       Option<String>,
    pub n_folds:       usize,
    pub n_training:    usize,
    pub label_policy:  UnknownLabelPolicy,
}

pub struct PrepareUseCase {
    config: PrepareConfig,
}

impl PrepareUseCase {
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    /// Returns the paths of the written cache files, one per rotation.
    pub fn execute(&self) -> Result<Vec<PathBuf>> {
        let cfg = &self.config;
        let out_dir = cfg.out_dir.as_deref().unwrap_or(&cfg.dataset);

        tracing::info!(
            "Preparing {} rotations from '{}' (ntrain={})",
            cfg.n_folds, cfg.dataset, cfg.n_training
        );

        let source = CsvFoldSource::new(&cfg.dataset);
        let store  = RotationStore::new(out_dir);
        let paths  = store
            .save_all(&source, cfg.n_folds, cfg.n_training, cfg.label_policy)
            .with_context(|| format!("Failed to prepare rotations from '{}'", cfg.dataset))?;

        tracing::info!("Wrote {} rotation caches to '{}'", paths.len(), store.dir().display());
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::write_folds;
    use crate::domain::fold::FoldRecord;

    #[test]
    fn test_prepare_writes_one_cache_per_rotation() {
        let data = tempfile::tempdir().unwrap();
        let out  = tempfile::tempdir().unwrap();
        let folds: Vec<Vec<FoldRecord>> = (0..4)
            .map(|i| vec![FoldRecord::new("MKVL".repeat(i + 1), "PF00001")])
            .collect();
        write_folds(data.path(), &folds).unwrap();

        let paths = PrepareUseCase::new(PrepareConfig {
            dataset:      data.path().display().to_string(),
            out_dir:      Some(out.path().display().to_string()),
            n_folds:      4,
            n_training:   2,
            label_policy: UnknownLabelPolicy::Sentinel,
        })
        .execute()
        .unwrap();

        assert_eq!(paths.len(), 4);
        assert!(paths.iter().all(|p| p.starts_with(out.path()) && p.exists()));
    }

    #[test]
    fn test_prepare_rejects_too_many_training_folds() {
        let data = tempfile::tempdir().unwrap();
        let result = PrepareUseCase::new(PrepareConfig {
            dataset:      data.path().display().to_string(),
            out_dir:      None,
            n_folds:      4,
            n_training:   3,
            label_policy: UnknownLabelPolicy::Sentinel,
        })
        .execute();
        assert!(result.is_err());
    }
}
