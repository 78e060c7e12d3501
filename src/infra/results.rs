//! Result bundle written at the end of every completed experiment.
//!
//! One bincode blob per run at `<fname_base>_results.pkl`. The driver treats
//! the mere existence of that file as "this job is done", so it is written
//! last, after the model artifacts.

use std::{fs, io::BufWriter, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::experiment::ExperimentConfig;
use crate::infra::metrics::EpochMetrics;
use crate::ml::evaluator::SplitPredictions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    /// Effective configuration after the grid override
    pub args:       ExperimentConfig,
    pub fname_base: String,
    pub training:   SplitPredictions,
    pub validation: SplitPredictions,
    /// `None` when the test split is empty
    pub testing:    Option<SplitPredictions>,
    pub history:    Vec<EpochMetrics>,
    pub best_epoch: usize,
    /// Whether patience ran out before the last epoch
    pub stopped_early: bool,
}

impl ResultBundle {
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)
            .with_context(|| format!("Cannot create results file '{}'", path.display()))?;
        bincode::serialize_into(BufWriter::new(file), self)
            .with_context(|| format!("Cannot write results to '{}'", path.display()))?;
        tracing::info!("Results written to '{}'", path.display());
        Ok(())
    }

    #[cfg(test)]
    pub fn load(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)
            .with_context(|| format!("Cannot open results file '{}'", path.display()))?;
        bincode::deserialize_from(std::io::BufReader::new(file))
            .with_context(|| format!("'{}' is not a results bundle", path.display()))
    }
}
