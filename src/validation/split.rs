//! Fold partitioning and holdout splits

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::error::{CrossValError, Result};

/// A single train/test split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldSplit {
    pub fold_idx: usize,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Balanced K-fold partitioner.
///
/// Indices are optionally permuted with a seeded ChaCha8 generator, then cut
/// into `n_splits` contiguous groups. Groups hold `n / k` or `n / k + 1`
/// samples; the first `n % k` groups take the extra sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KFold {
    n_splits: usize,
    shuffle_seed: Option<u64>,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle_seed: None,
        }
    }

    /// Shuffle indices with `seed` before partitioning
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    pub fn shuffle_seed(&self) -> Option<u64> {
        self.shuffle_seed
    }

    /// Check `2 <= n_splits <= n_samples`
    pub fn validate(&self, n_samples: usize) -> Result<()> {
        if self.n_splits < 2 || self.n_splits > n_samples {
            return Err(CrossValError::InvalidFold {
                n_folds: self.n_splits,
                n_samples,
            });
        }
        Ok(())
    }

    /// Size of each fold, in fold order
    pub fn fold_sizes(&self, n_samples: usize) -> Result<Vec<usize>> {
        self.validate(n_samples)?;
        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;
        Ok((0..self.n_splits)
            .map(|i| if i < remainder { base + 1 } else { base })
            .collect())
    }

    /// Fold id of every sample index
    pub fn assignment(&self, n_samples: usize) -> Result<Vec<usize>> {
        let mut fold_of = vec![0; n_samples];
        for split in self.split(n_samples)? {
            for &i in &split.test_indices {
                fold_of[i] = split.fold_idx;
            }
        }
        Ok(fold_of)
    }

    /// Generate one split per fold, in fold order
    pub fn split(&self, n_samples: usize) -> Result<Vec<FoldSplit>> {
        let fold_sizes = self.fold_sizes(n_samples)?;
        let indices = permutation(n_samples, self.shuffle_seed);

        let mut splits = Vec::with_capacity(self.n_splits);
        let mut current = 0;

        for (fold_idx, fold_size) in fold_sizes.into_iter().enumerate() {
            let test_indices = indices[current..current + fold_size].to_vec();
            let train_indices: Vec<usize> = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            splits.push(FoldSplit {
                fold_idx,
                train_indices,
                test_indices,
            });

            current += fold_size;
        }

        Ok(splits)
    }
}

/// Leave-one-out partitioner: K-fold with one fold per sample
pub fn leave_one_out(n_samples: usize) -> Result<Vec<FoldSplit>> {
    KFold::new(n_samples).split(n_samples)
}

/// Identity order, or a seeded shuffle of `0..n`
pub fn permutation(n: usize, seed: Option<u64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    if let Some(seed) = seed {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    }
    indices
}

/// Train/test index sets of a holdout split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldoutSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

impl HoldoutSplit {
    /// Hold out `ceil(test_fraction * n)` samples.
    ///
    /// Without a seed the last samples form the test set.
    pub fn new(n_samples: usize, test_fraction: f64, seed: Option<u64>) -> Result<Self> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(CrossValError::InvalidInput(format!(
                "test_fraction must be in (0, 1), got {}",
                test_fraction
            )));
        }

        let n_test = (test_fraction * n_samples as f64).ceil() as usize;
        if n_test == 0 || n_test >= n_samples {
            return Err(CrossValError::InvalidInput(format!(
                "holdout of {} out of {} samples leaves an empty side",
                n_test, n_samples
            )));
        }

        let mut indices = permutation(n_samples, seed);
        let test_indices = indices.split_off(n_samples - n_test);
        Ok(Self {
            train_indices: indices,
            test_indices,
        })
    }
}

/// Split a dataset into `(train, test)` parts
pub fn train_test_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: Option<u64>,
) -> Result<(Dataset, Dataset)> {
    let split = HoldoutSplit::new(dataset.n_samples(), test_fraction, seed)?;
    Ok((
        dataset.select(&split.train_indices),
        dataset.select(&split.test_indices),
    ))
}
