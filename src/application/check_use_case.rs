// ============================================================
// Layer 2 - CheckUseCase
// ============================================================
// Completeness report for a whole job grid: walks every index,
// derives the file base exactly as a real run would, and lists
// the jobs whose results file is not on disk yet.
//
// Runs with the same flags as the batch that submitted the
// jobs, only with --check added.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::{
    experiment::ExperimentConfig,
    naming::{generate_fname, results_file},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletenessReport {
    pub total:   usize,
    /// (exp_index, results file) for every job without results
    pub missing: Vec<(usize, String)>,
}

impl CompletenessReport {
    /// Comma-separated indices, ready to paste into a job array spec.
    pub fn missing_indices(&self) -> String {
        self.missing
            .iter()
            .map(|(i, _)| i.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub struct CheckUseCase {
    config: ExperimentConfig,
}

impl CheckUseCase {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<CompletenessReport> {
        self.config.validate()?;
        let grid = self.config.job_grid()?;
        tracing::info!("Total jobs: {}", grid.size());

        let mut missing = Vec::new();
        for index in 0..grid.size() {
            let assignment = grid
                .values_at_index(index)
                .with_context(|| format!("Job {index} missing from a grid of {}", grid.size()))?;

            let mut cfg = self.config.clone();
            cfg.apply(&assignment)?;

            let fname_out = results_file(&generate_fname(&cfg));
            if !Path::new(&fname_out).exists() {
                missing.push((index, fname_out));
            }
        }

        Ok(CompletenessReport { total: grid.size(), missing })
    }
}
