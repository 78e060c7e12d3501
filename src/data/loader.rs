// ============================================================
// Layer 4 - Fold Loader
// ============================================================
// Reads one fold of the PFAM data set from CSV.
//
// File layout:
//   <base_dir>/pfam_fold_0.csv
//   <base_dir>/pfam_fold_1.csv
//   ...
//
// Each file has a header row and two columns:
//   string,label
//   MKVLAAGIVG...,PF00001
//
// Unlike a directory scan, a missing fold is a hard error: the
// rotation arithmetic assumes every fold 0..N exists.
//
// Reference: csv crate documentation (serde deserialisation)

use std::path::{Path, PathBuf};

use crate::domain::fold::FoldRecord;
use crate::domain::traits::FoldSource;
use crate::error::DatasetError;

/// Loads `pfam_fold_<i>.csv` files from a directory.
pub struct CsvFoldSource {
    /// Directory containing the fold files
    dir: PathBuf,
}

impl CsvFoldSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of fold `fold` inside the base directory.
    pub fn fold_path(&self, fold: usize) -> PathBuf {
        fold_path(&self.dir, fold)
    }
}

/// `<dir>/pfam_fold_<fold>.csv`
pub fn fold_path(dir: &Path, fold: usize) -> PathBuf {
    dir.join(format!("pfam_fold_{fold}.csv"))
}

impl FoldSource for CsvFoldSource {
    fn load_fold(&self, fold: usize) -> Result<Vec<FoldRecord>, DatasetError> {
        let path = self.fold_path(fold);
        let csv_err = |source| DatasetError::Csv { path: path.clone(), source };

        let mut reader = csv::Reader::from_path(&path).map_err(csv_err)?;

        // deserialize() maps each row onto FoldRecord by header name
        let rows = reader
            .deserialize::<FoldRecord>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(csv_err)?;

        tracing::debug!("Loaded fold {} ({} rows) from '{}'", fold, rows.len(), path.display());
        Ok(rows)
    }
}

/// Folds held in memory, indexed by fold number.
#[cfg(test)]
pub struct InMemoryFolds {
    pub folds: Vec<Vec<FoldRecord>>,
}

#[cfg(test)]
impl FoldSource for InMemoryFolds {
    fn load_fold(&self, fold: usize) -> Result<Vec<FoldRecord>, DatasetError> {
        self.folds
            .get(fold)
            .cloned()
            .ok_or_else(|| DatasetError::InvalidRotation(format!("no fold {fold}")))
    }
}

/// Write folds as CSV files the way the data set ships them.
#[cfg(test)]
pub fn write_folds(dir: &Path, folds: &[Vec<FoldRecord>]) -> anyhow::Result<()> {
    for (i, rows) in folds.iter().enumerate() {
        let mut w = csv::Writer::from_path(fold_path(dir, i))?;
        for row in rows {
            w.serialize(row)?;
        }
        w.flush()?;
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_rows_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("pfam_fold_2.csv"),
            "string,label\nMKV,PF1\nAAG,PF2\n",
        )
        .unwrap();

        let rows = CsvFoldSource::new(dir.path()).load_fold(2).unwrap();
        assert_eq!(rows, vec![FoldRecord::new("MKV", "PF1"), FoldRecord::new("AAG", "PF2")]);
    }

    #[test]
    fn test_missing_fold_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvFoldSource::new(dir.path()).load_fold(0).unwrap_err();
        assert!(matches!(err, DatasetError::Csv { .. }));
    }

    #[test]
    fn test_write_then_read_folds() {
        let dir = tempfile::tempdir().unwrap();
        let folds = vec![vec![FoldRecord::new("AC", "x")], vec![FoldRecord::new("GT", "y")]];
        write_folds(dir.path(), &folds).unwrap();
        let src = CsvFoldSource::new(dir.path());
        assert_eq!(src.load_fold(1).unwrap(), folds[1]);
    }
}
