// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Handles the filesystem and process concerns that don't
// belong in any specific business layer:
//
//   rotation_store.rs - Tokenized rotation cache
//                       Precomputes every rotation from the
//                       fold CSVs and reloads one by index.
//
//   checkpoint.rs     - Saving and loading model weights
//                       Uses Burn's CompactRecorder, plus the
//                       architecture config as JSON and a
//                       plain-text layer summary.
//
//   results.rs        - Per-experiment result bundle
//                       Predictions and scores for every split
//                       plus the training history.
//
//   metrics.rs        - Training metrics logging
//                       Writes epoch-level metrics (loss,
//                       accuracy, AUC) to a CSV file.
//
//   runtime.rs        - Thread pool and backend selection
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Cached tokenized rotations
pub mod rotation_store;

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Result bundle persistence
pub mod results;

/// Training metrics CSV logger
pub mod metrics;

/// Process-wide runtime settings
pub mod runtime;
