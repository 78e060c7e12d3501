//! Typed errors for the seams where callers need to match on the cause.
//!
//! The application and CLI layers work in `anyhow::Result` and only see these
//! through `?`; the data and domain layers return them directly so tests (and
//! the driver) can tell a missing rotation cache from a bad label.

use std::path::PathBuf;

use thiserror::Error;

/// Rejected experiment configuration. Every variant is fatal for the run.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("rotation must be between 0 and n_folds - 1 (got rotation={rotation}, n_folds={n_folds})")]
    RotationOutOfRange { rotation: usize, n_folds: usize },

    #[error("n_training must be between 1 and n_folds - 2 (got n_training={n_training}, n_folds={n_folds})")]
    TrainingFoldsOutOfRange { n_training: usize, n_folds: usize },

    #[error("{name} must be in the open interval (0, 1) (got {value})")]
    OutsideUnitInterval { name: &'static str, value: f64 },

    #[error("cpus_per_task must be positive")]
    NonPositiveThreads,

    #[error("{0} must be positive")]
    NonPositive(&'static str),

    #[error("at least one hidden layer width is required")]
    EmptyHidden,

    #[error("unrecognized experiment type '{0}'")]
    UnknownExperimentType(String),

    #[error("exp_index {index} out of range (grid has {size} jobs)")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("grid parameter '{name}' cannot be applied: {reason}")]
    BadParameter { name: String, reason: String },
}

/// Failures while assembling, caching or loading a tokenized rotation.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("invalid fold layout: {0}")]
    InvalidRotation(String),

    #[error("cannot read fold file '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("training split is empty")]
    EmptyTrainingSplit,

    #[error("every training sequence is empty")]
    EmptyTrainingSequences,

    #[error("cached rotation was built for {cached}, but the run asks for {requested}; rerun prepare")]
    LayoutMismatch { cached: String, requested: String },

    #[error("label '{label}' in the {split} split was never seen in training")]
    UnknownLabel { split: &'static str, label: String },

    #[error("cached rotation not found: '{0}'")]
    MissingRotation(PathBuf),

    #[error("cannot (de)serialize rotation blob: {0}")]
    Blob(#[from] bincode::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
