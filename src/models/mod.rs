//! Model abstraction and reference estimators
//!
//! Evaluators are generic over [`Model`]: anything that can be fit on a
//! feature matrix and label vector and then predict labels for new rows.
//! The estimators here are small and exact; they exist so validation runs
//! have something concrete to train:
//! - [`MajorityClassifier`] - predicts the most frequent training label
//! - [`KNNClassifier`] - k-nearest-neighbour majority vote
//! - [`PolynomialRegression`] - 1-D polynomial least squares

mod knn;
mod majority;
mod polynomial;

pub use knn::KNNClassifier;
pub use majority::MajorityClassifier;
pub use polynomial::PolynomialRegression;

use ndarray::{Array1, Array2};
use thiserror::Error;

/// Result type returned by [`Model`] implementations
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Failure raised by a model while fitting or predicting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Model not fitted")]
    NotFitted,

    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Normal equations are singular")]
    SingularMatrix,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Invalid parameter: {name}, {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("{0}")]
    Other(String),
}

/// Trainable, predictive model.
///
/// Evaluators build a fresh instance for every fold through a factory
/// closure, so implementations may keep whatever state `fit` produces
/// without worrying about leakage between folds.
pub trait Model {
    /// Fit on `x` with shape `(n_samples, n_features)` and labels `y`
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()>;

    /// Predict one label per row of `x`
    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>>;
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
        (**self).fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        (**self).predict(x)
    }
}

/// Shared shape check for `fit`
fn check_training_data(x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
    if x.nrows() != y.len() {
        return Err(ModelError::ShapeMismatch {
            expected: format!("{} labels", x.nrows()),
            actual: format!("{} labels", y.len()),
        });
    }
    if y.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    Ok(())
}
