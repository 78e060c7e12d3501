// ============================================================
// Layer 6 - Runtime Settings
// ============================================================
// Process-wide execution knobs, applied once at start-up:
//
//   --gpu            → train on the wgpu backend instead of ndarray
//   --cpus-per-task  → size of the global rayon pool, which the
//                      ndarray backend and `prepare` both run on

use anyhow::{Context, Result};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub gpu:           bool,
    pub cpus_per_task: Option<usize>,
}

impl RuntimeSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.cpus_per_task {
            Some(0) => Err(ConfigError::NonPositiveThreads),
            _ => Ok(()),
        }
    }

    /// Configure the global thread pool. Must run before any parallel work.
    pub fn init(&self) -> Result<()> {
        self.validate()?;

        if let Some(n) = self.cpus_per_task {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build_global()
                .with_context(|| format!("Cannot size the thread pool to {n} threads"))?;
            tracing::info!("Using {} CPU threads", n);
        }

        if self.gpu {
            tracing::info!("GPU requested: training on the wgpu backend");
        } else {
            tracing::info!("Training on the ndarray (CPU) backend");
        }
        Ok(())
    }
}
