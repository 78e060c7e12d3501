// ============================================================
// Layer 6 - Model Store
// ============================================================
// Saves and restores the trained classifier using Burn's
// CompactRecorder.
//
// What gets saved per experiment:
//   1. <base>_model.mpk.gz       - all learned parameters
//   2. <base>_model_config.json  - RnnClassifierConfig
//   3. <base>_model_summary.txt  - layer table for humans
//   4. <base>_args.json          - the full ExperimentConfig
//
// Why save the config separately?
//   To reload the weights we first have to rebuild a model
//   with the exact same architecture (widths, GRU or not,
//   number of dense layers). The JSON carries that.
//
// Burn's CompactRecorder:
//   - Serialises model parameters to MessagePack format
//   - Compresses with gzip for smaller file size
//   - Type-safe: loading fails if architecture doesn't match
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::domain::experiment::ExperimentConfig;
use crate::ml::model::{RnnClassifier, RnnClassifierConfig};

/// Manages the model artifacts that sit next to one results file.
pub struct ModelStore {
    /// File name base shared by every artifact of the experiment
    base: PathBuf,
}

impl ModelStore {
    pub fn new(fname_base: impl Into<PathBuf>) -> Self {
        Self { base: fname_base.into() }
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name = self.base.clone().into_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Path handed to the recorder, which appends `.mpk.gz` itself
    pub fn weights_path(&self) -> PathBuf {
        self.with_suffix("_model")
    }

    pub fn config_path(&self) -> PathBuf {
        self.with_suffix("_model_config.json")
    }

    pub fn summary_path(&self) -> PathBuf {
        self.with_suffix("_model_summary.txt")
    }

    pub fn args_path(&self) -> PathBuf {
        self.with_suffix("_args.json")
    }

    /// Save the experiment configuration as pretty JSON.
    pub fn save_args(&self, cfg: &ExperimentConfig) -> Result<()> {
        let path = self.args_path();
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;
        Ok(())
    }

    #[cfg(test)]
    pub fn load_args(&self) -> Result<ExperimentConfig> {
        let path = self.args_path();
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save weights, architecture config and the summary table.
    pub fn save<B: Backend>(
        &self,
        model:     &RnnClassifier<B>,
        model_cfg: &RnnClassifierConfig,
    ) -> Result<()> {
        if let Some(parent) = self.base.parent() {
            fs::create_dir_all(parent)?;
        }

        let path = self.weights_path();
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save model to '{}'", path.display())
            })?;

        model_cfg
            .save(self.config_path())
            .with_context(|| {
                format!("Cannot write model config to '{}'", self.config_path().display())
            })?;

        fs::write(self.summary_path(), model.summary())
            .with_context(|| "Failed to write model summary")?;

        tracing::debug!("Saved model artifacts under '{}'", self.base.display());
        Ok(())
    }

    /// Rebuild the architecture from the saved config and load the weights into it.
    #[cfg(test)]
    pub fn load<B: Backend>(&self, device: &B::Device) -> Result<RnnClassifier<B>> {
        let cfg_path = self.config_path();
        let model_cfg = RnnClassifierConfig::load(&cfg_path)
            .map_err(|e| anyhow::anyhow!("Cannot read model config '{}': {e}", cfg_path.display()))?;

        let path = self.weights_path();
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load model '{}'. Has this experiment been run?", path.display())
            })?;

        Ok(model_cfg.init::<B>(device).load_record(record))
    }
}
