//! Validation and learning curves
//!
//! Both curves reuse one fold partition for every point, so differences
//! along a curve come from the model or the training-set size, not from
//! reshuffled folds.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::info;

use super::evaluator::FoldEvaluator;
use super::results::mean_std;
use super::scoring::Scorer;
use crate::data::Dataset;
use crate::error::{CrossValError, Result};
use crate::models::Model;

/// Train and test scores per hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationCurve {
    /// Display form of each parameter value
    pub param_values: Vec<String>,
    /// `train_scores[p][fold]`
    pub train_scores: Vec<Vec<f64>>,
    /// `test_scores[p][fold]`
    pub test_scores: Vec<Vec<f64>>,
}

impl ValidationCurve {
    pub fn mean_train_scores(&self) -> Vec<f64> {
        self.train_scores.iter().map(|s| mean_std(s).0).collect()
    }

    pub fn mean_test_scores(&self) -> Vec<f64> {
        self.test_scores.iter().map(|s| mean_std(s).0).collect()
    }

    /// Index of the parameter value with the highest mean test score
    pub fn best_index(&self) -> Option<usize> {
        self.mean_test_scores()
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_nan())
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }
}

/// Score a model family across `params`.
///
/// `factory(param)` builds a fresh model for one parameter value; it is called
/// once per parameter per fold.
pub fn validation_curve<S, P, M, F>(
    evaluator: &FoldEvaluator<S>,
    dataset: &Dataset,
    params: &[P],
    factory: F,
) -> Result<ValidationCurve>
where
    S: Scorer,
    P: Display + Sync,
    M: Model,
    F: Fn(&P) -> M + Sync,
{
    if params.is_empty() {
        return Err(CrossValError::InvalidInput(
            "validation curve needs at least one parameter value".to_string(),
        ));
    }
    let splits = evaluator.splits(dataset.n_samples())?;

    let mut train_scores = Vec::with_capacity(params.len());
    let mut test_scores = Vec::with_capacity(params.len());

    for param in params {
        let build = || factory(param);
        let folds = evaluator.run_splits(&splits, |split| {
            let train = dataset.select(&split.train_indices);
            let test = dataset.select(&split.test_indices);
            evaluator.fit_and_score(split.fold_idx, &build, &train, &test, true)
        })?;

        let train: Vec<f64> = folds.iter().map(|f| f.train_score.unwrap_or(f64::NAN)).collect();
        let test: Vec<f64> = folds.iter().map(|f| f.test_score).collect();
        info!(
            param = %param,
            mean_train = mean_std(&train).0,
            mean_test = mean_std(&test).0,
            "Validation curve point"
        );
        train_scores.push(train);
        test_scores.push(test);
    }

    Ok(ValidationCurve {
        param_values: params.iter().map(|p| p.to_string()).collect(),
        train_scores,
        test_scores,
    })
}

/// Training-set sizes for a learning curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainSizes {
    /// Fractions in (0, 1] of the largest available training set
    Fractions(Vec<f64>),
    /// Absolute sample counts
    Absolute(Vec<usize>),
}

impl Default for TrainSizes {
    fn default() -> Self {
        TrainSizes::Fractions(vec![0.1, 0.325, 0.55, 0.775, 1.0])
    }
}

impl TrainSizes {
    /// Evenly spaced fractions from `start` to 1
    pub fn linspace(start: f64, n: usize) -> Self {
        if n <= 1 {
            return TrainSizes::Fractions(vec![1.0]);
        }
        let step = (1.0 - start) / (n - 1) as f64;
        TrainSizes::Fractions((0..n).map(|i| start + step * i as f64).collect())
    }

    /// Sorted, de-duplicated absolute sizes, each in `[1, max_train]`
    pub fn resolve(&self, max_train: usize) -> Result<Vec<usize>> {
        let mut sizes: Vec<usize> = match self {
            TrainSizes::Fractions(fractions) => {
                if let Some(bad) = fractions.iter().find(|f| !(**f > 0.0 && **f <= 1.0)) {
                    return Err(CrossValError::InvalidInput(format!(
                        "train size fraction {} is outside (0, 1]",
                        bad
                    )));
                }
                fractions
                    .iter()
                    .map(|f| ((f * max_train as f64).ceil() as usize).clamp(1, max_train))
                    .collect()
            }
            TrainSizes::Absolute(sizes) => {
                if let Some(bad) = sizes.iter().find(|&&s| s == 0 || s > max_train) {
                    return Err(CrossValError::InvalidInput(format!(
                        "train size {} is outside [1, {}]",
                        bad, max_train
                    )));
                }
                sizes.clone()
            }
        };

        sizes.sort_unstable();
        sizes.dedup();
        if sizes.is_empty() {
            return Err(CrossValError::InvalidInput(
                "learning curve needs at least one train size".to_string(),
            ));
        }
        Ok(sizes)
    }
}

/// Train and test scores per training-set size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningCurve {
    /// Absolute training-set sizes, increasing
    pub train_sizes: Vec<usize>,
    /// `train_scores[size][fold]`
    pub train_scores: Vec<Vec<f64>>,
    /// `test_scores[size][fold]`
    pub test_scores: Vec<Vec<f64>>,
}

impl LearningCurve {
    pub fn mean_train_scores(&self) -> Vec<f64> {
        self.train_scores.iter().map(|s| mean_std(s).0).collect()
    }

    pub fn mean_test_scores(&self) -> Vec<f64> {
        self.test_scores.iter().map(|s| mean_std(s).0).collect()
    }
}

/// Score a model trained on growing prefixes of each fold's training set.
///
/// Sizes are resolved against the smallest training set across folds, so
/// every fold can supply every size.
pub fn learning_curve<S, M, F>(
    evaluator: &FoldEvaluator<S>,
    dataset: &Dataset,
    train_sizes: &TrainSizes,
    factory: F,
) -> Result<LearningCurve>
where
    S: Scorer,
    M: Model,
    F: Fn() -> M + Sync,
{
    let splits = evaluator.splits(dataset.n_samples())?;
    let max_train = splits
        .iter()
        .map(|s| s.train_indices.len())
        .min()
        .unwrap_or(0);
    let sizes = train_sizes.resolve(max_train)?;

    let mut train_scores = Vec::with_capacity(sizes.len());
    let mut test_scores = Vec::with_capacity(sizes.len());

    for &n_train in &sizes {
        let folds = evaluator.run_splits(&splits, |split| {
            let train = dataset.select(&split.train_indices[..n_train]);
            let test = dataset.select(&split.test_indices);
            evaluator.fit_and_score(split.fold_idx, &factory, &train, &test, true)
        })?;

        let train: Vec<f64> = folds.iter().map(|f| f.train_score.unwrap_or(f64::NAN)).collect();
        let test: Vec<f64> = folds.iter().map(|f| f.test_score).collect();
        info!(
            n_train,
            mean_train = mean_std(&train).0,
            mean_test = mean_std(&test).0,
            "Learning curve point"
        );
        train_scores.push(train);
        test_scores.push(test);
    }

    Ok(LearningCurve {
        train_sizes: sizes,
        train_scores,
        test_scores,
    })
}
