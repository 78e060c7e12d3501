// ============================================================
// Layer 3 - Job Grid (Cartesian product of hyperparameters)
// ============================================================
// A batch of experiments is described as a map from parameter
// name to the list of values to try. Every combination is one
// job, and a single integer (the batch array index) selects it.
//
// Ordering is fixed so that an index means the same job on every
// machine:
//   - parameter names in ascending order (BTreeMap)
//   - the FIRST name varies slowest, the last name fastest
//   - values in the order they were listed
//
// Example: { a: [1, 2], b: [x, y, z] }
//   index 0 → a=1 b=x    index 3 → a=2 b=x
//   index 1 → a=1 b=y    index 4 → a=2 b=y
//   index 2 → a=1 b=z    index 5 → a=2 b=z

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single candidate value for a grid parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
    IntList(Vec<usize>),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v)     => write!(f, "{v}"),
            Self::Float(v)   => write!(f, "{v}"),
            Self::Text(v)    => f.write_str(v),
            Self::IntList(v) => {
                let parts: Vec<String> = v.iter().map(|x| x.to_string()).collect();
                f.write_str(&parts.join("_"))
            }
        }
    }
}

/// One full assignment: every grid parameter mapped to a value.
pub type Assignment = BTreeMap<String, ParamValue>;

/// Finite enumeration over the Cartesian product of parameter lists.
#[derive(Debug, Clone, Default)]
pub struct JobGrid {
    params: BTreeMap<String, Vec<ParamValue>>,
}

impl JobGrid {
    /// Add (or replace) one parameter's candidate list.
    pub fn with(mut self, name: impl Into<String>, values: Vec<ParamValue>) -> Self {
        self.params.insert(name.into(), values);
        self
    }

    /// Number of jobs. An empty grid has exactly one (empty) job;
    /// a parameter with no candidates makes the grid empty.
    pub fn size(&self) -> usize {
        self.params.values().map(Vec::len).product()
    }

    /// The assignment for job `index`, or None past the end.
    pub fn values_at_index(&self, index: usize) -> Option<Assignment> {
        if index >= self.size() {
            return None;
        }

        // Mixed-radix decode, least significant digit = last name
        let mut rest = index;
        let mut out  = Assignment::new();
        for (name, values) in self.params.iter().rev() {
            let digit = rest % values.len();
            rest /= values.len();
            out.insert(name.clone(), values[digit].clone());
        }
        Some(out)
    }

    /// Human-readable tag for an assignment, e.g. `rnn_neurons_20_rotation_3`.
    pub fn describe(assignment: &Assignment) -> String {
        assignment
            .iter()
            .map(|(k, v)| format!("{k}_{v}"))
            .collect::<Vec<_>>()
            .join("_")
    }
}
