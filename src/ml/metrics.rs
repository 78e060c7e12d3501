// ============================================================
// Layer 5 - Classification Metrics
// ============================================================
// Host-side metrics over a whole split. Predictions are pulled
// off the device once per evaluation, so these work on plain
// slices and need no backend.
//
//   binary_accuracy  - share of rows where (p > 0.426) == target
//   roc_auc          - Mann-Whitney U / (n_pos * n_neg), ties
//                      counted as half
//   bce_with_logits  - mean binary cross-entropy, computed from
//                      logits in the numerically stable form

/// Decision threshold used for binary accuracy.
pub const ACCURACY_THRESHOLD: f32 = 0.426;

pub fn binary_accuracy(probabilities: &[f32], targets: &[u8]) -> f64 {
    if probabilities.is_empty() {
        return 0.0;
    }
    let correct = probabilities
        .iter()
        .zip(targets)
        .filter(|(&p, &t)| (p > ACCURACY_THRESHOLD) == (t == 1))
        .count();
    correct as f64 / probabilities.len() as f64
}

/// Area under the ROC curve. Returns 0.0 when the split holds only one class.
pub fn roc_auc(scores: &[f32], targets: &[u8]) -> f64 {
    let n_pos = targets.iter().filter(|&&t| t == 1).count();
    let n_neg = targets.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.0;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // Average 1-based ranks over runs of equal scores
    let mut pos_rank_sum = 0.0f64;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            if targets[idx] == 1 {
                pos_rank_sum += avg_rank;
            }
        }
        i = j + 1;
    }

    let n_pos = n_pos as f64;
    let u = pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0;
    u / (n_pos * n_neg as f64)
}

pub fn bce_with_logits(logits: &[f32], targets: &[u8]) -> f64 {
    if logits.is_empty() {
        return f64::NAN;
    }
    let total: f64 = logits
        .iter()
        .zip(targets)
        .map(|(&z, &y)| {
            let z = z as f64;
            z.max(0.0) - z * y as f64 + (-z.abs()).exp().ln_1p()
        })
        .sum();
    total / logits.len() as f64
}

pub fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}
