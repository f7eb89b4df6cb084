//! Polynomial least-squares regression on a single feature

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::{check_training_data, Model, ModelError, ModelResult};

/// Fits `y = c0 + c1 x + ... + cd x^d` by solving the normal equations.
///
/// `degree = 0` is the constant model. A non-zero `alpha` adds an L2
/// penalty to every non-intercept coefficient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolynomialRegression {
    degree: usize,
    alpha: f64,
    coefficients: Option<Array1<f64>>,
}

impl PolynomialRegression {
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            alpha: 0.0,
            coefficients: None,
        }
    }

    /// Set the ridge penalty
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Coefficients from the intercept upwards, once fitted
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    /// Vandermonde matrix `[1, x, x^2, ..., x^d]` of the single feature column
    fn expand_features(&self, x: &Array2<f64>) -> ModelResult<Array2<f64>> {
        if x.ncols() != 1 {
            return Err(ModelError::ShapeMismatch {
                expected: "1 feature".to_string(),
                actual: format!("{} features", x.ncols()),
            });
        }

        let mut design = Array2::ones((x.nrows(), self.degree + 1));
        for (i, &xi) in x.column(0).iter().enumerate() {
            for d in 1..=self.degree {
                design[[i, d]] = design[[i, d - 1]] * xi;
            }
        }
        Ok(design)
    }
}

impl Model for PolynomialRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
        check_training_data(x, y)?;
        if self.alpha.is_nan() || self.alpha < 0.0 {
            return Err(ModelError::InvalidParameter {
                name: "alpha".to_string(),
                reason: "must be non-negative".to_string(),
            });
        }

        let design = self.expand_features(x)?;
        let mut xtx = design.t().dot(&design);
        let xty = design.t().dot(y);
        for d in 1..=self.degree {
            xtx[[d, d]] += self.alpha;
        }

        let coefficients = cholesky_solve(&xtx, &xty).ok_or(ModelError::SingularMatrix)?;
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::SingularMatrix);
        }

        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(ModelError::NotFitted)?;
        let design = self.expand_features(x)?;
        Ok(design.dot(coefficients))
    }
}

/// Solve the symmetric positive-definite system `a x = b` by Cholesky
/// decomposition, retrying once with a small diagonal ridge when `a` is not
/// numerically positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    if let Some(x) = cholesky_solve_inner(a, b) {
        return Some(x);
    }

    let n = a.nrows();
    let mut a_reg = a.clone();
    let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
    for k in 0..n {
        a_reg[[k, k]] += ridge.max(f64::EPSILON);
    }
    cholesky_solve_inner(&a_reg, b)
}

fn cholesky_solve_inner(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // A = L * L^T
    let mut l = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L * y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T * x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}
