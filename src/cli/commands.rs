// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `prepare` and `run`, and all
// their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, Activation, etc.)
//
// Long flags are kebab-case; the historical spellings used by
// existing batch scripts (--Nfolds, --rnnNeurons, ...) are kept
// as aliases.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::prepare_use_case::PrepareConfig;
use crate::domain::{
    experiment::ExperimentConfig,
    hyperparams::{Activation, Monitor, UnknownLabelPolicy},
};
use crate::infra::runtime::RuntimeSettings;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tokenise every rotation from the fold CSVs and cache it on disk
    Prepare(PrepareArgs),

    /// Train and evaluate one experiment (or check a whole grid)
    Run(RunArgs),
}

// ─── Shared Groups ───────────────────────────────────────────────────────────
#[derive(Args, Debug, Clone)]
pub struct RuntimeArgs {
    /// Train on the GPU (wgpu backend)
    #[arg(long)]
    pub gpu: bool,

    /// Number of CPU threads to use
    #[arg(long, alias = "cpus_per_task")]
    pub cpus_per_task: Option<usize>,
}

impl From<&RuntimeArgs> for RuntimeSettings {
    fn from(a: &RuntimeArgs) -> Self {
        RuntimeSettings { gpu: a.gpu, cpus_per_task: a.cpus_per_task }
    }
}

#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Directory holding pfam_fold_<i>.csv and the rotation caches
    #[arg(long, default_value = "data/pfam")]
    pub dataset: String,

    /// Number of folds the data set is split into
    #[arg(long, alias = "Nfolds", default_value_t = 5)]
    pub n_folds: usize,

    /// Number of folds used for training
    #[arg(long, alias = "Ntraining", default_value_t = 3)]
    pub n_training: usize,

    /// What to do with validation/test labels never seen in training
    #[arg(long, default_value = "sentinel")]
    pub label_policy: UnknownLabelPolicy,
}

// ─── prepare ─────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct PrepareArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub runtime: RuntimeArgs,

    /// Write the caches here instead of next to the fold files
    #[arg(long)]
    pub out_dir: Option<String>,
}

impl From<&PrepareArgs> for PrepareConfig {
    fn from(a: &PrepareArgs) -> Self {
        PrepareConfig {
            dataset:      a.data.dataset.clone(),
            out_dir:      a.out_dir.clone(),
            n_folds:      a.data.n_folds,
            n_training:   a.data.n_training,
            label_policy: a.data.label_policy,
        }
    }
}

// ─── run ─────────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Report which jobs of the grid have no results yet, then exit
    #[arg(long)]
    pub check: bool,

    /// Print the output file base and exit without training
    #[arg(long)]
    pub nogo: bool,

    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(flatten)]
    pub data: DataArgs,

    /// Results directory
    #[arg(long, alias = "results_path", default_value = "./results")]
    pub results_path: String,

    // ── Experiment identity ───────────────────────────────────────────────────
    /// Job index into the grid selected by --exp-type
    #[arg(long, alias = "exp_index")]
    pub exp_index: Option<usize>,

    /// Experiment type: "dropout" (default grid is rotations only)
    #[arg(long, alias = "exp_type")]
    pub exp_type: Option<String>,

    /// Extra label added to output file names
    #[arg(long)]
    pub label: Option<String>,

    /// Cross-validation rotation
    #[arg(long, default_value_t = 0)]
    pub rotation: usize,

    /// Label index treated as the positive class
    #[arg(long, default_value_t = 0)]
    pub positive_class: usize,

    // ── Model ─────────────────────────────────────────────────────────────────
    /// Width of each character embedding vector
    #[arg(long, alias = "embedding_length", default_value_t = 4)]
    pub embedding_length: usize,

    /// Number of units in the recurrent layer
    #[arg(long, alias = "rnnNeurons", default_value_t = 10)]
    pub rnn_neurons: usize,

    /// Recurrent activation (linear, tanh, relu, elu, sigmoid)
    #[arg(long, alias = "rnn_activation", default_value = "tanh")]
    pub rnn_activation: Activation,

    /// Use a GRU instead of the simple recurrent layer
    #[arg(long, alias = "use_gru")]
    pub use_gru: bool,

    /// Dense layer widths, in order
    #[arg(long, num_args = 1.., default_values_t = [100, 5])]
    pub hidden: Vec<usize>,

    /// Dense layer activation
    #[arg(long, alias = "hidden_activation", default_value = "elu")]
    pub hidden_activation: Activation,

    /// Dropout rate after each dense layer
    #[arg(long)]
    pub dropout: Option<f64>,

    /// L1 penalty on the kernels
    #[arg(long = "l1", alias = "L1_regularizer")]
    pub l1: Option<f64>,

    /// L2 penalty on the kernels
    #[arg(long = "l2", alias = "L2_regularizer")]
    pub l2: Option<f64>,

    // ── Training ──────────────────────────────────────────────────────────────
    /// Maximum number of training epochs
    #[arg(long, default_value_t = 100)]
    pub epochs: usize,

    /// Training set batch size
    #[arg(long, default_value_t = 64)]
    pub batch: usize,

    /// Learning rate
    #[arg(long, default_value_t = 0.001)]
    pub lrate: f64,

    /// Learning rate time decay per optimiser step
    #[arg(long, default_value_t = 0.0)]
    pub decay: f64,

    /// Epochs without improvement before stopping
    #[arg(long, default_value_t = 100)]
    pub patience: usize,

    /// Smallest change that counts as an improvement
    #[arg(long, alias = "min_delta", default_value_t = 0.0)]
    pub min_delta: f64,

    /// Quantity watched by early stopping
    #[arg(long, default_value = "val_loss")]
    pub monitor: Monitor,

    /// Seed for weight initialisation and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI RunArgs into the domain ExperimentConfig.
/// The application layer never sees clap types.
impl RunArgs {
    pub fn to_config(&self, verbose: u8) -> ExperimentConfig {
        ExperimentConfig {
            dataset:           self.data.dataset.clone(),
            results_path:      self.results_path.clone(),
            n_folds:           self.data.n_folds,
            rotation:          self.rotation,
            n_training:        self.data.n_training,
            label_policy:      self.data.label_policy,
            positive_class:    self.positive_class,
            exp_index:         self.exp_index,
            exp_type:          self.exp_type.clone(),
            label:             self.label.clone(),
            embedding_length:  self.embedding_length,
            rnn_neurons:       self.rnn_neurons,
            rnn_activation:    self.rnn_activation,
            use_gru:           self.use_gru,
            hidden:            self.hidden.clone(),
            hidden_activation: self.hidden_activation,
            dropout:           self.dropout,
            l1:                self.l1,
            l2:                self.l2,
            epochs:            self.epochs,
            batch:             self.batch,
            lrate:             self.lrate,
            decay:             self.decay,
            patience:          self.patience,
            min_delta:         self.min_delta,
            monitor:           self.monitor,
            seed:              self.seed,
            verbose,
        }
    }
}
