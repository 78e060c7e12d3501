// ============================================================
// Layer 3 - Rotation (fold -> role assignment)
// ============================================================
// The raw data set is stored as N disjoint folds. A rotation
// picks which folds play which role:
//
//   train = [(0 + r) % N, (1 + r) % N, ..., (k - 1 + r) % N]
//   valid = (k + r) % N
//   test  = (k + 1 + r) % N
//
// As r walks 0..N the window slides around the ring, so every
// fold is a test fold exactly once. The three roles never share
// a fold as long as k <= N - 2.
//
// Example with N = 5, k = 3:
//   r = 0 → train {0,1,2}, valid 3, test 4
//   r = 4 → train {4,0,1}, valid 2, test 3

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// One fold-to-role assignment. Construct through [`Rotation::new`]
/// so the disjointness precondition is always checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotation {
    pub rotation:      usize,
    pub n_folds:       usize,
    pub n_train_folds: usize,
    /// Training folds in load order
    pub train:         Vec<usize>,
    pub valid:         usize,
    pub test:          usize,
}

impl Rotation {
    pub fn new(rotation: usize, n_folds: usize, n_train_folds: usize) -> Result<Self, DatasetError> {
        if n_train_folds == 0 || n_train_folds + 2 > n_folds {
            return Err(DatasetError::InvalidRotation(format!(
                "need 1 <= n_train_folds <= n_folds - 2 (n_train_folds={n_train_folds}, n_folds={n_folds})"
            )));
        }
        if rotation >= n_folds {
            return Err(DatasetError::InvalidRotation(format!(
                "rotation {rotation} outside 0..{n_folds}"
            )));
        }

        let train = (0..n_train_folds)
            .map(|i| (i + rotation) % n_folds)
            .collect();
        let valid = (n_train_folds + rotation) % n_folds;
        let test  = (n_train_folds + 1 + rotation) % n_folds;

        Ok(Self { rotation, n_folds, n_train_folds, train, valid, test })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_rotation_zero_five_folds() {
        let r = Rotation::new(0, 5, 3).unwrap();
        assert_eq!(r.train, vec![0, 1, 2]);
        assert_eq!(r.valid, 3);
        assert_eq!(r.test,  4);
    }

    #[test]
    fn test_rotation_wraps_around() {
        let r = Rotation::new(4, 5, 3).unwrap();
        assert_eq!(r.train, vec![4, 0, 1]);
        assert_eq!(r.valid, 2);
        assert_eq!(r.test,  3);
    }

    #[test]
    fn test_too_many_training_folds_rejected() {
        assert!(Rotation::new(0, 5, 4).is_err());
        assert!(Rotation::new(0, 5, 0).is_err());
    }

    #[test]
    fn test_rotation_out_of_range_rejected() {
        assert!(Rotation::new(5, 5, 3).is_err());
    }

    #[test]
    fn test_every_fold_is_test_once() {
        let tests: HashSet<usize> = (0..5)
            .map(|r| Rotation::new(r, 5, 3).unwrap().test)
            .collect();
        assert_eq!(tests.len(), 5);
    }

    proptest! {
        #[test]
        fn prop_roles_are_disjoint(n_folds in 3usize..20, k_seed in 0usize..100, r_seed in 0usize..100) {
            let k = 1 + k_seed % (n_folds - 2);
            let r = r_seed % n_folds;
            let rot = Rotation::new(r, n_folds, k).unwrap();

            let distinct: HashSet<usize> = rot.train.iter().copied()
                .chain([rot.valid, rot.test])
                .collect();
            prop_assert_eq!(distinct.len(), k + 2);
            prop_assert!(!rot.train.contains(&rot.valid));
            prop_assert!(!rot.train.contains(&rot.test));
            prop_assert_ne!(rot.valid, rot.test);
        }
    }
}
