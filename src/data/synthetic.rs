//! Seeded synthetic datasets for demos, tests and benchmarks

use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use super::Dataset;
use crate::error::{CrossValError, Result};

/// Noisy, saturating 1-D regression problem.
///
/// `x = u^2` with `u ~ U(0, 1)` and `y = 10 - 1 / (x + 0.1) + noise * e`,
/// `e ~ N(0, 1)`. Low-degree polynomials underfit it, high-degree ones
/// overfit it, which makes it the standard bias/variance illustration.
pub fn make_polynomial(n_samples: usize, noise: f64, seed: u64) -> Result<Dataset> {
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| CrossValError::InvalidInput(format!("normal distribution: {}", e)))?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let x: Vec<f64> = (0..n_samples).map(|_| rng.gen::<f64>().powi(2)).collect();
    let y: Vec<f64> = x
        .iter()
        .map(|&xi| 10.0 - 1.0 / (xi + 0.1) + noise * normal.sample(&mut rng))
        .collect();

    Dataset::from_column(x, y)
}

/// Isotropic Gaussian clusters, one class per center.
///
/// Samples are emitted class by class, so unshuffled k-fold splits of a
/// blob dataset hold out whole classes.
pub fn make_blobs(
    n_per_class: usize,
    centers: &[Vec<f64>],
    cluster_std: f64,
    seed: u64,
) -> Result<Dataset> {
    let n_features = centers.first().map(|c| c.len()).unwrap_or(0);
    if n_features == 0 || centers.iter().any(|c| c.len() != n_features) {
        return Err(CrossValError::InvalidInput(
            "centers must be non-empty and share one dimensionality".to_string(),
        ));
    }
    let normal = Normal::new(0.0, cluster_std)
        .map_err(|e| CrossValError::InvalidInput(format!("cluster_std: {}", e)))?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let n_samples = n_per_class * centers.len();
    let mut features = Array2::zeros((n_samples, n_features));
    let mut labels = Array1::zeros(n_samples);

    for (class, center) in centers.iter().enumerate() {
        for i in 0..n_per_class {
            let row = class * n_per_class + i;
            for (j, &c) in center.iter().enumerate() {
                features[[row, j]] = c + normal.sample(&mut rng);
            }
            labels[row] = class as f64;
        }
    }

    Dataset::new(features, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_polynomial_is_seeded() {
        let a = make_polynomial(30, 1.0, 7).unwrap();
        let b = make_polynomial(30, 1.0, 7).unwrap();
        let c = make_polynomial(30, 1.0, 8).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.n_features(), 1);
        assert!(a.features().iter().all(|&x| (0.0..=1.0).contains(&x)));
    }

    #[test]
    fn test_make_blobs_layout() {
        let centers = vec![vec![0.0, 0.0], vec![5.0, 5.0], vec![-5.0, 5.0]];
        let data = make_blobs(4, &centers, 0.5, 1).unwrap();

        assert_eq!(data.n_samples(), 12);
        assert_eq!(data.n_features(), 2);
        assert_eq!(data.labels()[0], 0.0);
        assert_eq!(data.labels()[4], 1.0);
        assert_eq!(data.labels()[11], 2.0);
    }

    #[test]
    fn test_make_blobs_rejects_mixed_dims() {
        let centers = vec![vec![0.0, 0.0], vec![1.0]];
        assert!(make_blobs(2, &centers, 1.0, 0).is_err());
    }
}
