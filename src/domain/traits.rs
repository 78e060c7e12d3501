// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The dataset assembler only needs "give me the rows of fold i".
// Programming against this trait lets the assembler run over CSV
// files in production and over in-memory folds in tests, with
// no change to the rotation/tokenisation logic.
//
// Implementations:
//   - CsvFoldSource → reads <dir>/pfam_fold_<i>.csv
//   - InMemoryFolds → holds folds in a Vec (tests)

use crate::domain::fold::FoldRecord;
use crate::error::DatasetError;

// ─── FoldSource ───────────────────────────────────────────────────────────────
/// Anything that can produce the rows of a numbered fold.
pub trait FoldSource {
    /// Load every row of fold `fold`, in file order.
    fn load_fold(&self, fold: usize) -> Result<Vec<FoldRecord>, DatasetError>;
}
