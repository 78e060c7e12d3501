// ============================================================
// Layer 3 - Experiment Configuration
// ============================================================
// Everything one invocation of the driver needs to know:
// where the data lives, which rotation to use, the model
// hyperparameters and the training/early-stopping knobs.
//
// Serialisable so it can be stored inside the result bundle
// and next to the saved model.
//
// Lifecycle:
//   CLI args → ExperimentConfig → validate() → apply grid job
//            → hyperparameters() → model

use serde::{Deserialize, Serialize};

use crate::domain::hyperparams::{Activation, Hyperparameters, Monitor, UnknownLabelPolicy};
use crate::domain::job_grid::{Assignment, JobGrid, ParamValue};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    // ── Data ──────────────────────────────────────────────────────────────────
    pub dataset:           String,
    pub results_path:      String,
    pub n_folds:           usize,
    pub rotation:          usize,
    pub n_training:        usize,
    pub label_policy:      UnknownLabelPolicy,
    pub positive_class:    usize,

    // ── Experiment identity ───────────────────────────────────────────────────
    pub exp_index:         Option<usize>,
    pub exp_type:          Option<String>,
    pub label:             Option<String>,

    // ── Model ─────────────────────────────────────────────────────────────────
    pub embedding_length:  usize,
    pub rnn_neurons:       usize,
    pub rnn_activation:    Activation,
    pub use_gru:           bool,
    pub hidden:            Vec<usize>,
    pub hidden_activation: Activation,
    pub dropout:           Option<f64>,
    pub l1:                Option<f64>,
    pub l2:                Option<f64>,

    // ── Training ──────────────────────────────────────────────────────────────
    pub epochs:            usize,
    pub batch:             usize,
    pub lrate:             f64,
    pub decay:             f64,
    pub patience:          usize,
    pub min_delta:         f64,
    pub monitor:           Monitor,
    pub seed:              u64,
    pub verbose:           u8,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            dataset:           "data/pfam".to_string(),
            results_path:      "./results".to_string(),
            n_folds:           5,
            rotation:          0,
            n_training:        3,
            label_policy:      UnknownLabelPolicy::Sentinel,
            positive_class:    0,
            exp_index:         None,
            exp_type:          None,
            label:             None,
            embedding_length:  4,
            rnn_neurons:       10,
            rnn_activation:    Activation::Tanh,
            use_gru:           false,
            hidden:            vec![100, 5],
            hidden_activation: Activation::Elu,
            dropout:           None,
            l1:                None,
            l2:                None,
            epochs:            100,
            batch:             64,
            lrate:             0.001,
            decay:             0.0,
            patience:          100,
            min_delta:         0.0,
            monitor:           Monitor::ValLoss,
            seed:              42,
            verbose:           0,
        }
    }
}

impl ExperimentConfig {
    /// Reject configurations the run cannot meaningfully execute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rotation >= self.n_folds {
            return Err(ConfigError::RotationOutOfRange {
                rotation: self.rotation,
                n_folds:  self.n_folds,
            });
        }
        if self.n_training < 1 || self.n_training + 2 > self.n_folds {
            return Err(ConfigError::TrainingFoldsOutOfRange {
                n_training: self.n_training,
                n_folds:    self.n_folds,
            });
        }

        check_unit("lrate", Some(self.lrate))?;
        check_unit("dropout", self.dropout)?;
        check_unit("L1_regularizer", self.l1)?;
        check_unit("L2_regularizer", self.l2)?;

        if self.hidden.is_empty() {
            return Err(ConfigError::EmptyHidden);
        }
        if self.hidden.contains(&0) {
            return Err(ConfigError::NonPositive("hidden layer width"));
        }
        if self.epochs == 0 {
            return Err(ConfigError::NonPositive("epochs"));
        }
        if self.batch == 0 {
            return Err(ConfigError::NonPositive("batch"));
        }
        if self.embedding_length == 0 {
            return Err(ConfigError::NonPositive("embedding_length"));
        }
        if self.rnn_neurons == 0 {
            return Err(ConfigError::NonPositive("rnn_neurons"));
        }
        if !(self.decay >= 0.0) {
            return Err(ConfigError::NonPositive("decay"));
        }
        Ok(())
    }

    /// The grid of jobs selected by `exp_type`.
    pub fn job_grid(&self) -> Result<JobGrid, ConfigError> {
        let rotations: Vec<ParamValue> = (0..self.n_folds)
            .map(|r| ParamValue::Int(r as i64))
            .collect();

        let grid = JobGrid::default().with("rotation", rotations);
        match self.exp_type.as_deref() {
            None => Ok(grid),
            // Only parameters that appear in the file name may vary here,
            // otherwise two jobs would share one results file. n_training
            // is fixed by the rotation caches, so it never varies.
            Some("dropout") => Ok(grid.with(
                "dropout",
                [0.1, 0.25, 0.5].into_iter().map(ParamValue::Float).collect(),
            )),
            Some(other) => Err(ConfigError::UnknownExperimentType(other.to_string())),
        }
    }

    /// Overwrite fields named in `assignment`. Returns the tag that
    /// describes the override.
    pub fn apply(&mut self, assignment: &Assignment) -> Result<String, ConfigError> {
        for (name, value) in assignment {
            let bad = |reason: &str| ConfigError::BadParameter {
                name:   name.clone(),
                reason: reason.to_string(),
            };
            match (name.as_str(), value) {
                ("rotation", ParamValue::Int(v)) => {
                    self.rotation = usize::try_from(*v).map_err(|_| bad("negative"))?
                }
                ("rnn_neurons", ParamValue::Int(v)) => {
                    self.rnn_neurons = usize::try_from(*v).map_err(|_| bad("negative"))?
                }
                ("embedding_length", ParamValue::Int(v)) => {
                    self.embedding_length = usize::try_from(*v).map_err(|_| bad("negative"))?
                }
                ("n_training", ParamValue::Int(v)) => {
                    self.n_training = usize::try_from(*v).map_err(|_| bad("negative"))?
                }
                ("dropout", ParamValue::Float(v)) => self.dropout = Some(*v),
                ("l1", ParamValue::Float(v))      => self.l1 = Some(*v),
                ("l2", ParamValue::Float(v))      => self.l2 = Some(*v),
                ("lrate", ParamValue::Float(v))   => self.lrate = *v,
                ("hidden", ParamValue::IntList(v)) => self.hidden = v.clone(),
                ("rnn_activation", ParamValue::Text(v)) => {
                    self.rnn_activation = v.parse().map_err(|e: String| bad(&e))?
                }
                ("hidden_activation", ParamValue::Text(v)) => {
                    self.hidden_activation = v.parse().map_err(|e: String| bad(&e))?
                }
                (_, _) => return Err(bad("unknown parameter or wrong value type")),
            }
        }
        Ok(JobGrid::describe(assignment))
    }

    /// Apply the job selected by `exp_index`, if any.
    pub fn augment(&mut self) -> Result<String, ConfigError> {
        let Some(index) = self.exp_index else {
            return Ok(String::new());
        };

        let grid = self.job_grid()?;
        tracing::info!("Total jobs: {}", grid.size());

        let assignment = grid
            .values_at_index(index)
            .ok_or(ConfigError::IndexOutOfRange { index, size: grid.size() })?;
        tracing::info!("Job {index}: {}", JobGrid::describe(&assignment));

        self.apply(&assignment)
    }

    pub fn hyperparameters(&self) -> Hyperparameters {
        Hyperparameters {
            embedding_length:  self.embedding_length,
            rnn_neurons:       self.rnn_neurons,
            rnn_activation:    self.rnn_activation,
            use_gru:           self.use_gru,
            hidden:            self.hidden.clone(),
            hidden_activation: self.hidden_activation,
            dropout:           self.dropout,
            l1:                self.l1,
            l2:                self.l2,
            lrate:             self.lrate,
            decay:             self.decay,
        }
    }
}

fn check_unit(name: &'static str, value: Option<f64>) -> Result<(), ConfigError> {
    match value {
        Some(v) if !(v > 0.0 && v < 1.0) => Err(ConfigError::OutsideUnitInterval { name, value: v }),
        _ => Ok(()),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ExperimentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rotation_out_of_range() {
        let cfg = ExperimentConfig { rotation: 5, ..Default::default() };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::RotationOutOfRange { rotation: 5, n_folds: 5 })
        );
    }

    #[test]
    fn test_training_folds_must_leave_room_for_valid_and_test() {
        let cfg = ExperimentConfig { n_training: 4, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::TrainingFoldsOutOfRange { .. })));
        let cfg = ExperimentConfig { n_training: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::TrainingFoldsOutOfRange { .. })));
    }

    #[test]
    fn test_unit_interval_checks() {
        for cfg in [
            ExperimentConfig { dropout: Some(1.0), ..Default::default() },
            ExperimentConfig { dropout: Some(0.0), ..Default::default() },
            ExperimentConfig { lrate: 1.5, ..Default::default() },
            ExperimentConfig { l1: Some(-0.1), ..Default::default() },
            ExperimentConfig { l2: Some(2.0), ..Default::default() },
        ] {
            assert!(matches!(cfg.validate(), Err(ConfigError::OutsideUnitInterval { .. })));
        }
    }

    #[test]
    fn test_augment_sets_rotation_from_index() {
        let mut cfg = ExperimentConfig { exp_index: Some(3), ..Default::default() };
        let tag = cfg.augment().unwrap();
        assert_eq!(cfg.rotation, 3);
        assert_eq!(tag, "rotation_3");
    }

    #[test]
    fn test_augment_without_index_is_noop() {
        let mut cfg = ExperimentConfig::default();
        assert_eq!(cfg.augment().unwrap(), "");
        assert_eq!(cfg, ExperimentConfig::default());
    }

    #[test]
    fn test_augment_index_out_of_range() {
        let mut cfg = ExperimentConfig { exp_index: Some(5), ..Default::default() };
        assert_eq!(cfg.augment(), Err(ConfigError::IndexOutOfRange { index: 5, size: 5 }));
    }

    #[test]
    fn test_dropout_grid() {
        let mut cfg = ExperimentConfig {
            exp_type:  Some("dropout".to_string()),
            exp_index: Some(7),
            ..Default::default()
        };
        assert_eq!(cfg.job_grid().unwrap().size(), 15);
        cfg.augment().unwrap();
        // dropout varies slowest: index 7 → dropout 0.25, rotation 2
        assert_eq!(cfg.dropout, Some(0.25));
        assert_eq!(cfg.rotation, 2);
        assert_eq!(cfg.n_training, 3);
    }

    #[test]
    fn test_training_fold_count_is_not_a_grid() {
        let cfg = ExperimentConfig { exp_type: Some("ntrain".to_string()), ..Default::default() };
        assert!(matches!(cfg.job_grid(), Err(ConfigError::UnknownExperimentType(_))));
    }

    #[test]
    fn test_unknown_exp_type() {
        let cfg = ExperimentConfig { exp_type: Some("cnn".to_string()), ..Default::default() };
        assert!(matches!(cfg.job_grid(), Err(ConfigError::UnknownExperimentType(_))));
    }

    #[test]
    fn test_apply_rejects_unknown_parameter() {
        let mut cfg = ExperimentConfig::default();
        let mut a = Assignment::new();
        a.insert("momentum".to_string(), ParamValue::Float(0.9));
        assert!(matches!(cfg.apply(&a), Err(ConfigError::BadParameter { .. })));
    }
}
