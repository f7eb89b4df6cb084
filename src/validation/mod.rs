//! Model validation
//!
//! - [`split`] - K-fold, leave-one-out and holdout partitioning
//! - [`evaluator`] - fold-by-fold training and scoring
//! - [`scoring`] - accuracy, R² and squared-error scorers
//! - [`curves`] - validation and learning curves

pub mod cancel;
pub mod curves;
pub mod evaluator;
pub mod results;
pub mod scoring;
pub mod split;

pub use cancel::CancellationToken;
pub use curves::{learning_curve, validation_curve, LearningCurve, TrainSizes, ValidationCurve};
pub use evaluator::{cross_val_score, evaluate, leave_one_out_score, FoldEvaluator, FoldScore};
pub use results::CVResults;
pub use scoring::{accuracy, mean_squared_error, r2_score, Scorer, Scoring};
pub use split::{leave_one_out, train_test_split, FoldSplit, HoldoutSplit, KFold};
