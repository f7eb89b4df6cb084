//! crossval - model validation toolkit
//!
//! Estimates how well a model generalizes by training it on part of a
//! dataset and scoring it on data it has not seen:
//! - holdout splits
//! - k-fold cross-validation, including leave-one-out
//! - validation curves (score vs. model complexity)
//! - learning curves (score vs. training-set size)
//!
//! # Modules
//!
//! - [`validation`] - fold partitioning, evaluators, scorers, curves
//! - [`models`] - the [`models::Model`] trait and reference estimators
//! - [`data`] - datasets and synthetic generators
//! - [`config`] - serializable evaluation settings
//! - [`cli`] - command-line interface
//!
//! # Example
//!
//! ```
//! use crossval::data::make_blobs;
//! use crossval::models::KNNClassifier;
//! use crossval::validation::FoldEvaluator;
//!
//! let centers = vec![vec![0.0, 0.0], vec![4.0, 4.0]];
//! let data = make_blobs(10, &centers, 0.5, 42).unwrap();
//!
//! let results = FoldEvaluator::new(5)
//!     .with_shuffle_seed(0)
//!     .cross_validate(&data, || KNNClassifier::new(1))
//!     .unwrap();
//! assert_eq!(results.n_folds, 5);
//! ```

pub mod error;

pub mod config;
pub mod data;
pub mod models;
pub mod validation;

pub mod cli;

pub use error::{CrossValError, FitStage, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::EvaluationConfig;
    pub use crate::data::Dataset;
    pub use crate::error::{CrossValError, FitStage, Result};
    pub use crate::models::{
        KNNClassifier, MajorityClassifier, Model, ModelError, PolynomialRegression,
    };
    pub use crate::validation::{
        evaluate, learning_curve, validation_curve, CVResults, CancellationToken, FoldEvaluator,
        KFold, Scorer, Scoring, TrainSizes,
    };
}
