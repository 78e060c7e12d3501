// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `prepare` - caches tokenized rotations from fold CSVs
//   2. `run`     - trains one job, or with --check reports
//                  the missing jobs of a grid
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser};
use commands::{Commands, PrepareArgs, RunArgs};

use crate::infra::runtime::RuntimeSettings;

/// The main CLI struct. clap reads the fields and generates
/// argument parsing code via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "pfam-rnn",
    version,
    about = "Train recurrent classifiers over PFAM protein-family folds."
)]
pub struct Cli {
    /// Verbosity (-v for debug logs)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// The subcommand to run (prepare or run)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match &self.command {
            Commands::Prepare(args) => self.run_prepare(args),
            Commands::Run(args)     => self.run_experiment(args),
        }
    }

    fn run_prepare(&self, args: &PrepareArgs) -> Result<()> {
        use crate::application::prepare_use_case::PrepareUseCase;

        RuntimeSettings::from(&args.runtime).init()?;

        let paths = PrepareUseCase::new(args.into()).execute()?;
        for p in &paths {
            println!("{}", p.display());
        }
        Ok(())
    }

    /// Handles the `run` subcommand, including --check and --nogo.
    fn run_experiment(&self, args: &RunArgs) -> Result<()> {
        use crate::application::check_use_case::CheckUseCase;
        use crate::application::experiment_use_case::{ExperimentUseCase, RunOutcome};

        let config  = args.to_config(self.verbose);
        let runtime = RuntimeSettings::from(&args.runtime);

        if args.check {
            let report = CheckUseCase::new(config).execute()?;
            println!("Total jobs: {}", report.total);
            println!("MISSING RUNS:");
            for (index, path) in &report.missing {
                println!("{index}\t{path}");
            }
            println!("Missing: {}", report.missing.len());
            println!("{}", report.missing_indices());
            return Ok(());
        }

        runtime.init()?;
        match ExperimentUseCase::new(config, runtime, args.nogo).execute()? {
            RunOutcome::DryRun(base) => {
                println!("NO GO");
                println!("{base}");
            }
            RunOutcome::Skipped(path) => {
                println!("File {} already exists", path.display());
            }
            RunOutcome::Completed(base) => println!("{base}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags_map_onto_config() {
        let cli = Cli::parse_from([
            "pfam-rnn", "-v", "run", "--nogo",
            "--Nfolds", "6", "--rotation", "2", "--rnnNeurons", "20",
            "--hidden", "50", "10", "3", "--rnn-activation", "relu",
            "--dropout", "0.25", "--L2_regularizer", "0.001", "--monitor", "val_auc",
        ]);
        let Commands::Run(args) = &cli.command else { panic!("expected run") };
        assert!(args.nogo && !args.check);

        let cfg = args.to_config(cli.verbose);
        assert_eq!(cfg.n_folds, 6);
        assert_eq!(cfg.rotation, 2);
        assert_eq!(cfg.rnn_neurons, 20);
        assert_eq!(cfg.hidden, vec![50, 10, 3]);
        assert_eq!(cfg.rnn_activation, crate::domain::hyperparams::Activation::Relu);
        assert_eq!(cfg.dropout, Some(0.25));
        assert_eq!(cfg.l2, Some(0.001));
        assert_eq!(cfg.monitor, crate::domain::hyperparams::Monitor::ValAuc);
        assert_eq!(cfg.verbose, 1);
    }

    #[test]
    fn test_run_defaults_match_config_defaults() {
        let cli = Cli::parse_from(["pfam-rnn", "run"]);
        let Commands::Run(args) = &cli.command else { panic!("expected run") };
        assert_eq!(args.to_config(0), crate::domain::experiment::ExperimentConfig::default());
    }

    #[test]
    fn test_prepare_out_dir() {
        let cli = Cli::parse_from(["pfam-rnn", "prepare", "--dataset", "folds", "--out-dir", "cache"]);
        let Commands::Prepare(args) = &cli.command else { panic!("expected prepare") };
        let cfg = crate::application::prepare_use_case::PrepareConfig::from(args);
        assert_eq!(cfg.dataset, "folds");
        assert_eq!(cfg.out_dir.as_deref(), Some("cache"));
    }
}
