// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (preparing data, running a job, or checking
// which jobs of a grid are still missing).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing here (that's Layer 1)
//   - No direct file formats (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Fold CSVs → cached tokenized rotations
pub mod prepare_use_case;

// One training job, end to end
pub mod experiment_use_case;

// Which grid jobs still lack results
pub mod check_use_case;
