//! K-fold splitter with optional seeded shuffling.
//!
//! Matches `sklearn.model_selection.KFold` layout: the (possibly shuffled)
//! index order is cut into `k` contiguous test blocks, the first `n % k` of
//! which hold one extra sample; each fold's training indices are every other
//! index in ascending order.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split `0..n_samples` into `k` folds. `seed` is used only when `shuffle`.
///
/// # Errors
///
/// [`PipelineError::Input`] if `k < 2` or `k > n_samples`.
pub fn kfold(n_samples: usize, k: usize, shuffle: bool, seed: u64) -> Result<Vec<Fold>> {
    if k < 2 {
        return Err(PipelineError::Input(format!("k-fold needs k >= 2, got {k}")));
    }
    if k > n_samples {
        return Err(PipelineError::Input(format!(
            "cannot split {n_samples} samples into {k} folds"
        )));
    }

    let mut order: Vec<usize> = (0..n_samples).collect();
    if shuffle {
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);
    }

    let base = n_samples / k;
    let extra = n_samples % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for f in 0..k {
        let size = base + usize::from(f < extra);
        let test = order[start..start + size].to_vec();
        let mut in_test = vec![false; n_samples];
        for &i in &test {
            in_test[i] = true;
        }
        let train = (0..n_samples).filter(|&i| !in_test[i]).collect();
        folds.push(Fold { train, test });
        start += size;
    }
    Ok(folds)
}
