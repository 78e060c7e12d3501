// ============================================================
// Layer 2 - ExperimentUseCase
// ============================================================
// Runs one training job end to end:
//
//   Step 1: Validate the configuration           (Layer 3)
//   Step 2: Apply the grid job for exp_index     (Layer 3)
//   Step 3: Compute the output file base         (Layer 3)
//           --nogo stops here
//   Step 4: Skip if <base>_results.pkl exists    (Layer 6)
//   Step 5: Load the cached rotation and check   (Layer 6)
//           its fold layout against the config
//   Step 6: Build datasets (one-vs-rest targets) (Layer 4)
//   Step 7: Build + fit with early stopping      (Layer 5)
//   Step 8: Evaluate train / valid / test        (Layer 5)
//   Step 9: Write history, model, results        (Layer 6)
//
// The results file is written last: its presence is what marks
// the job as done for later runs and for --check.
//
// Reference: Burn Book §5 (Training)

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, Autodiff, NdArray, Wgpu},
    module::AutodiffModule,
    tensor::backend::AutodiffBackend,
};

use crate::data::{assembler::TokenizedDataset, dataset::SequenceDataset};
use crate::domain::{
    experiment::ExperimentConfig,
    naming::{generate_fname, results_file},
};
use crate::infra::{
    checkpoint::ModelStore,
    metrics::MetricsLogger,
    results::ResultBundle,
    rotation_store::RotationStore,
    runtime::RuntimeSettings,
};
use crate::ml::{
    evaluator::evaluate,
    model::RnnClassifierConfig,
    trainer::{fit, TrainSettings},
};

type CpuBackend = Autodiff<NdArray>;
type GpuBackend = Autodiff<Wgpu>;

/// How a single invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// `--nogo`: the file base that would have been used
    DryRun(String),
    /// Results already on disk
    Skipped(PathBuf),
    /// Trained and written under this file base
    Completed(String),
}

pub struct ExperimentUseCase {
    config:  ExperimentConfig,
    runtime: RuntimeSettings,
    nogo:    bool,
}

impl ExperimentUseCase {
    pub fn new(config: ExperimentConfig, runtime: RuntimeSettings, nogo: bool) -> Self {
        Self { config, runtime, nogo }
    }

    pub fn execute(&self) -> Result<RunOutcome> {
        // ── Steps 1-3: configuration and file name ───────────────────────────
        let mut cfg = self.config.clone();
        cfg.validate()?;
        let job = cfg.augment()?;
        if !job.is_empty() {
            tracing::info!("Grid override: {}", job);
        }

        let fbase = generate_fname(&cfg);
        if self.nogo {
            tracing::info!("NO GO");
            return Ok(RunOutcome::DryRun(fbase));
        }

        // ── Step 4: idempotency guard ─────────────────────────────────────────
        let results_path = PathBuf::from(results_file(&fbase));
        if results_path.exists() {
            tracing::info!("File '{}' already exists", results_path.display());
            return Ok(RunOutcome::Skipped(results_path));
        }

        // ── Step 5: cached rotation ───────────────────────────────────────────
        let ds = RotationStore::new(&cfg.dataset).load(cfg.rotation)?;
        ds.check_layout(cfg.rotation, cfg.n_folds, cfg.n_training)?;
        tracing::info!("{}", ds.summary());

        // ── Steps 6-9 on the selected backend ─────────────────────────────────
        if self.runtime.gpu {
            run_on::<GpuBackend>(&cfg, &ds, &fbase, &results_path, &WgpuDevice::default())?;
        } else {
            run_on::<CpuBackend>(&cfg, &ds, &fbase, &results_path, &NdArrayDevice::Cpu)?;
        }

        Ok(RunOutcome::Completed(fbase))
    }
}

fn run_on<B: AutodiffBackend>(
    cfg:          &ExperimentConfig,
    ds:           &TokenizedDataset,
    fbase:        &str,
    results_path: &Path,
    device:       &B::Device,
) -> Result<()> {
    let n_classes = ds.out_word_index.len();
    if cfg.positive_class >= n_classes {
        bail!(
            "positive_class {} out of range: the training split has {} classes",
            cfg.positive_class, n_classes
        );
    }
    tracing::info!(
        "Positive class: {} ('{}')",
        cfg.positive_class,
        ds.label_name(cfg.positive_class as i64).unwrap_or("?"),
    );

    // ── Step 6: Burn datasets ─────────────────────────────────────────────────
    let train_ds = SequenceDataset::from_split(&ds.ins_train, &ds.outs_train, cfg.positive_class);
    let valid_ds = SequenceDataset::from_split(&ds.ins_valid, &ds.outs_valid, cfg.positive_class);
    let test_ds  = SequenceDataset::from_split(&ds.ins_test,  &ds.outs_test,  cfg.positive_class);

    // ── Step 7: build + fit ───────────────────────────────────────────────────
    let model_cfg = RnnClassifierConfig::from_hyperparameters(
        &cfg.hyperparameters(), ds.n_tokens, ds.len_max,
    );
    let settings = TrainSettings::from(cfg);
    let outcome  = fit::<B>(&model_cfg, &settings, train_ds.clone(), &valid_ds, device)?;

    // ── Step 8: evaluate every split with the restored weights ────────────────
    let model = outcome.model.valid();
    let training   = evaluate(&model, &train_ds, cfg.batch, device)?;
    let validation = evaluate(&model, &valid_ds, cfg.batch, device)?;
    let testing    = if test_ds.sample_count() > 0 {
        Some(evaluate(&model, &test_ds, cfg.batch, device)?)
    } else {
        None
    };

    for (split, preds) in [("train", Some(&training)), ("valid", Some(&validation)), ("test", testing.as_ref())] {
        if let Some(p) = preds {
            tracing::info!(
                "{:<5} loss={:.4} binary_accuracy={:.4} auc={:.4}",
                split, p.evaluation.loss, p.evaluation.binary_accuracy, p.evaluation.auc,
            );
        }
    }

    // ── Step 9: persist ───────────────────────────────────────────────────────
    let logger = MetricsLogger::create(format!("{fbase}_history.csv"))?;
    logger.log_all(&outcome.history)?;
    tracing::info!("History written to '{}'", logger.csv_path().display());

    let store = ModelStore::new(fbase);
    store.save(&model, &model_cfg)?;
    store.save_args(cfg)?;
    println!("{}", model.summary());

    ResultBundle {
        args:       cfg.clone(),
        fname_base: fbase.to_string(),
        training,
        validation,
        testing,
        history:    outcome.history,
        best_epoch: outcome.best_epoch,
        stopped_early: outcome.stopped_early,
    }
    .save(results_path)?;

    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::InMemoryFolds;
    use crate::domain::{fold::FoldRecord, hyperparams::UnknownLabelPolicy};
    use crate::error::DatasetError;

    fn workspace() -> tempfile::TempDir {
        // no '.' in the path, file bases turn dots into dashes
        tempfile::Builder::new().prefix("pfam").tempdir().unwrap()
    }

    fn prepare(dir: &Path) {
        let folds: Vec<Vec<FoldRecord>> = (0..5)
            .map(|f| {
                (0..6)
                    .map(|i| {
                        if (i + f) % 2 == 0 {
                            FoldRecord::new("MKVLA".repeat(1 + i % 3), "PF00001")
                        } else {
                            FoldRecord::new("GGWYC".repeat(1 + i % 2), "PF00002")
                        }
                    })
                    .collect()
            })
            .collect();
        RotationStore::new(dir)
            .save_all(&InMemoryFolds { folds }, 5, 3, UnknownLabelPolicy::Sentinel)
            .unwrap();
    }

    fn config(dir: &Path) -> ExperimentConfig {
        ExperimentConfig {
            dataset:          dir.display().to_string(),
            results_path:     dir.join("results").display().to_string(),
            epochs:           2,
            batch:            4,
            embedding_length: 2,
            rnn_neurons:      3,
            hidden:           vec![3],
            ..Default::default()
        }
    }

    #[test]
    fn test_nogo_returns_base_without_running() {
        let dir = workspace();
        let use_case = ExperimentUseCase::new(config(dir.path()), RuntimeSettings::default(), true);
        match use_case.execute().unwrap() {
            RunOutcome::DryRun(base) => {
                assert!(base.ends_with("ntrain_03_rot_00"));
                assert!(!Path::new(&results_file(&base)).exists());
            }
            other => panic!("expected a dry run, got {other:?}"),
        }
    }

    #[test]
    fn test_second_identical_run_is_skipped() {
        let dir = workspace();
        prepare(dir.path());
        let use_case = ExperimentUseCase::new(config(dir.path()), RuntimeSettings::default(), false);

        let base = match use_case.execute().unwrap() {
            RunOutcome::Completed(base) => base,
            other => panic!("expected a completed run, got {other:?}"),
        };
        let results = PathBuf::from(results_file(&base));
        assert!(results.exists());
        assert!(Path::new(&format!("{base}_history.csv")).exists());
        assert!(Path::new(&format!("{base}_model.mpk.gz")).exists());
        assert!(Path::new(&format!("{base}_model_summary.txt")).exists());
        assert!(Path::new(&format!("{base}_args.json")).exists());

        let bundle = ResultBundle::load(&results).unwrap();
        assert_eq!(bundle.fname_base, base);
        assert_eq!(bundle.history.len(), 2);
        assert!(!bundle.stopped_early);
        assert!(bundle.testing.is_some());

        let bytes    = std::fs::read(&results).unwrap();
        let modified = std::fs::metadata(&results).unwrap().modified().unwrap();

        assert_eq!(use_case.execute().unwrap(), RunOutcome::Skipped(results.clone()));
        assert_eq!(std::fs::read(&results).unwrap(), bytes);
        assert_eq!(std::fs::metadata(&results).unwrap().modified().unwrap(), modified);
    }

    #[test]
    fn test_cache_built_with_other_training_folds_is_rejected() {
        let dir = workspace();
        prepare(dir.path());
        // caches hold 3 training folds; this run asks for 2
        let cfg = ExperimentConfig { n_training: 2, ..config(dir.path()) };
        let use_case = ExperimentUseCase::new(cfg, RuntimeSettings::default(), false);

        let err = use_case.execute().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatasetError>(),
            Some(DatasetError::LayoutMismatch { .. })
        ));
        assert!(!dir.path().join("results").exists());
    }

    #[test]
    fn test_missing_rotation_cache_fails() {
        let dir = workspace();
        let use_case = ExperimentUseCase::new(config(dir.path()), RuntimeSettings::default(), false);
        assert!(use_case.execute().is_err());
    }

    #[test]
    fn test_grid_index_selects_rotation() {
        let dir = workspace();
        let cfg = ExperimentConfig { exp_index: Some(3), ..config(dir.path()) };
        let use_case = ExperimentUseCase::new(cfg, RuntimeSettings::default(), true);
        match use_case.execute().unwrap() {
            RunOutcome::DryRun(base) => assert!(base.ends_with("rot_03")),
            other => panic!("expected a dry run, got {other:?}"),
        }
    }
}
