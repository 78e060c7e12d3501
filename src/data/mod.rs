// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything from raw fold CSVs to device-ready tensor batches.
//
//   pfam_fold_<i>.csv
//       │
//       ▼
//   CsvFoldSource     → reads one fold into FoldRecords
//       │
//       ▼
//   prepare_data_set  → rotation split, char tokenizer, label
//       │               encoder, padding → TokenizedDataset
//       ▼
//   (RotationStore caches this per rotation, see infra)
//       │
//       ▼
//   SequenceDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   SequenceBatcher   → stacks samples into tensor batches
//
// Each module is responsible for exactly one step.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads fold CSV files
pub mod loader;

/// Character and label vocabularies
pub mod tokenizer;

/// Rotation assembly and tokenisation
pub mod assembler;

/// Implements Burn's Dataset trait for token sequences
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
