// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:          the epoch number (1, 2, 3, ...)
//   - train_loss:     mean binary cross-entropy over training batches
//   - val_loss:       binary cross-entropy on the validation split
//   - val_binary_acc: thresholded accuracy on the validation split
//   - val_auc:        ROC AUC on the validation split
//
// Output file: <fname_base>_history.csv
//
// Rows are serialised from EpochMetrics by the csv crate; HEADER
// must list the struct's fields in declaration order.
//
// Example CSV output:
//   epoch,train_loss,val_loss,val_binary_acc,val_auc
//   1,0.6931,0.6902,0.512,0.53
//   2,0.6714,0.6688,0.604,0.641
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::domain::hyperparams::Monitor;

/// Column names, in EpochMetrics field order
const HEADER: [&str; 5] = ["epoch", "train_loss", "val_loss", "val_binary_acc", "val_auc"];

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average loss over all training batches, penalty included
    pub train_loss: f64,

    /// Loss on the whole validation split
    pub val_loss: f64,

    /// Fraction of validation rows on the right side of the threshold
    pub val_binary_acc: f64,

    /// Area under the validation ROC curve
    pub val_auc: f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:          usize,
        train_loss:     f64,
        val_loss:       f64,
        val_binary_acc: f64,
        val_auc:        f64,
    ) -> Self {
        Self { epoch, train_loss, val_loss, val_binary_acc, val_auc }
    }

    /// The value early stopping watches for this epoch
    pub fn monitored(&self, monitor: Monitor) -> f64 {
        match monitor {
            Monitor::ValLoss           => self.val_loss,
            Monitor::ValAuc            => self.val_auc,
            Monitor::ValBinaryAccuracy => self.val_binary_acc,
        }
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    /// Full path to the CSV file
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger writing to `csv_path`.
    /// Truncates any previous file and writes the header row.
    pub fn create(csv_path: impl AsRef<Path>) -> Result<Self> {
        let csv_path = csv_path.as_ref().to_path_buf();

        if let Some(parent) = csv_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writer.write_record(HEADER)?;
        writer.flush()?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(m)?;
        writer.flush()?;

        Ok(())
    }

    /// Write a whole history at once
    pub fn log_all(&self, history: &[EpochMetrics]) -> Result<()> {
        for m in history {
            self.log(m)?;
        }
        Ok(())
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitored_value() {
        let m = EpochMetrics::new(2, 0.6, 0.5, 0.7, 0.8);
        assert_eq!(m.monitored(Monitor::ValLoss), 0.5);
        assert_eq!(m.monitored(Monitor::ValBinaryAccuracy), 0.7);
        assert_eq!(m.monitored(Monitor::ValAuc), 0.8);
    }

    #[test]
    fn test_csv_rows() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::create(dir.path().join("run_history.csv")).unwrap();
        let history = [
            EpochMetrics::new(1, 0.7, 0.69, 0.5, 0.5),
            EpochMetrics::new(2, 0.6, 0.65, 0.6, 0.7),
        ];
        logger.log_all(&history).unwrap();

        let text = std::fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "epoch,train_loss,val_loss,val_binary_acc,val_auc");
        assert_eq!(lines[2], "2,0.6,0.65,0.6,0.7");

        let rows: Vec<EpochMetrics> = csv::Reader::from_path(logger.csv_path())
            .unwrap()
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows, history);
    }

    #[test]
    fn test_empty_history_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::create(dir.path().join("nested/run_history.csv")).unwrap();
        logger.log_all(&[]).unwrap();
        let text = std::fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(text.trim_end(), HEADER.join(","));
    }
}
