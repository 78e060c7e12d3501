// ============================================================
// Layer 3 - Fold Record
// ============================================================
// One row of a fold CSV: an amino-acid sequence and the name of
// the protein family it belongs to. Plain data, no behaviour.
//
// The field names match the CSV header (`string,label`) so serde
// can deserialize rows directly.

use serde::{Deserialize, Serialize};

/// A single labelled sequence from one fold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldRecord {
    /// The raw sequence, one character per residue
    pub string: String,

    /// The class (family) name
    pub label: String,
}

impl FoldRecord {
    /// Uses impl Into<String> so tests can pass string literals.
    pub fn new(string: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            string: string.into(),
            label:  label.into(),
        }
    }
}
