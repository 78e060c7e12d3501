// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Pure Rust structs, enums and traits describing the experiment:
// folds, rotations, hyperparameters, the job grid and the output
// naming scheme.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain data and pure functions
//
// Everything here is unit-testable without a GPU or a data set.

// A labelled sequence row from a fold file
pub mod fold;

// Fold → train/valid/test role assignment
pub mod rotation;

// Model/optimiser knobs and their enums
pub mod hyperparams;

// Full run configuration, validation and grid overrides
pub mod experiment;

// Cartesian-product job enumeration
pub mod job_grid;

// Deterministic output file names
pub mod naming;

// Core abstractions (traits) that other layers implement
pub mod traits;
