// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// This layer holds the model and everything that runs it:
// building, fitting and scoring. Layer 4 only contributes the
// Dataset/Batcher plumbing Burn's DataLoader needs.
//
// What's in this layer:
//
//   model.rs     - The recurrent classifier
//                  • Character embeddings
//                  • Simple (Elman) RNN or GRU, last state only
//                  • Dense blocks with optional dropout
//                  • One-logit sigmoid head
//                  • L1/L2 kernel penalty
//
//   metrics.rs   - Binary accuracy (threshold 0.426), ROC AUC
//                  and logit-space cross-entropy on host slices
//
//   trainer.rs   - The training loop
//                  Forward pass, loss, backward pass, Adam
//                  step with time decay, per-epoch validation
//                  and early stopping with best-weight restore
//
//   evaluator.rs - Predicts a whole split and scores it
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Elman (1990) Finding Structure in Time

/// Embedding → RNN → dense → sigmoid classifier
pub mod model;

/// Split-level classification metrics
pub mod metrics;

/// Training loop with early stopping
pub mod trainer;

/// Split prediction and scoring
pub mod evaluator;
