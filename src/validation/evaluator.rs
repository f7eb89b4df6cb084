//! K-fold evaluation of models
//!
//! [`FoldEvaluator`] partitions a dataset with [`KFold`], builds a fresh model
//! per fold from a factory closure, fits it on the other folds and scores its
//! predictions on the held-out fold. Folds only read the shared dataset, so
//! they can run on the rayon pool; the first failing fold aborts the run and
//! no partial score list is ever returned.

use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::cancel::CancellationToken;
use super::results::{mean_std, CVResults};
use super::scoring::{Scorer, Scoring};
use super::split::{FoldSplit, HoldoutSplit, KFold};
use crate::config::EvaluationConfig;
use crate::data::Dataset;
use crate::error::{CrossValError, FitStage, Result};
use crate::models::{Model, ModelError};

/// Outcome of training and scoring one model on one split
#[derive(Debug, Clone, PartialEq)]
pub struct FoldScore {
    pub fold_idx: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// Score on the held-out samples
    pub test_score: f64,
    /// Score on the training samples, when requested
    pub train_score: Option<f64>,
    /// Wall-clock seconds spent in `fit`
    pub fit_secs: f64,
}

/// K-fold cross-validation driver
#[derive(Debug, Clone)]
pub struct FoldEvaluator<S = Scoring> {
    kfold: KFold,
    scorer: S,
    parallel: bool,
    n_threads: Option<usize>,
    cancel: Option<CancellationToken>,
}

impl FoldEvaluator<Scoring> {
    /// Sequential evaluator over `n_folds` unshuffled folds, scored by accuracy
    pub fn new(n_folds: usize) -> Self {
        Self {
            kfold: KFold::new(n_folds),
            scorer: Scoring::default(),
            parallel: false,
            n_threads: None,
            cancel: None,
        }
    }

    pub fn from_config(config: &EvaluationConfig) -> Result<Self> {
        config.validate()?;

        let mut kfold = KFold::new(config.n_folds);
        if let Some(seed) = config.shuffle_seed {
            kfold = kfold.with_shuffle_seed(seed);
        }
        Ok(Self {
            kfold,
            scorer: config.scoring,
            parallel: config.parallel,
            n_threads: config.n_threads,
            cancel: None,
        })
    }
}

impl<S: Scorer> FoldEvaluator<S> {
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.kfold = self.kfold.with_shuffle_seed(seed);
        self
    }

    /// Replace the scoring function
    pub fn with_scorer<T: Scorer>(self, scorer: T) -> FoldEvaluator<T> {
        FoldEvaluator {
            kfold: self.kfold,
            scorer,
            parallel: self.parallel,
            n_threads: self.n_threads,
            cancel: self.cancel,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run folds on a dedicated pool of `n` threads.
    ///
    /// `n` must be at least 1; a zero count fails the run with
    /// [`CrossValError::ConfigError`] before any model is built.
    pub fn with_threads(mut self, n: usize) -> Self {
        self.n_threads = Some(n);
        self.parallel = true;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn kfold(&self) -> &KFold {
        &self.kfold
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Train/test splits this evaluator would use for `n_samples`
    pub fn splits(&self, n_samples: usize) -> Result<Vec<FoldSplit>> {
        self.kfold.split(n_samples)
    }

    /// Score a fresh model on every fold.
    ///
    /// Returns exactly `n_folds` scores in fold order. Fails with
    /// [`CrossValError::InvalidFold`] before the factory is ever called when
    /// the fold count does not fit the dataset, and with
    /// [`CrossValError::ModelFailure`] as soon as any fold's model fails.
    pub fn evaluate<M, F>(&self, dataset: &Dataset, factory: F) -> Result<Vec<f64>>
    where
        M: Model,
        F: Fn() -> M + Sync,
    {
        let folds = self.evaluate_folds(dataset, factory, false)?;
        Ok(folds.into_iter().map(|f| f.test_score).collect())
    }

    /// [`evaluate`](Self::evaluate) with summary statistics
    pub fn cross_validate<M, F>(&self, dataset: &Dataset, factory: F) -> Result<CVResults>
    where
        M: Model,
        F: Fn() -> M + Sync,
    {
        Ok(CVResults::from_scores(self.evaluate(dataset, factory)?))
    }

    /// Per-fold details, optionally including training-set scores
    pub fn evaluate_folds<M, F>(
        &self,
        dataset: &Dataset,
        factory: F,
        score_train: bool,
    ) -> Result<Vec<FoldScore>>
    where
        M: Model,
        F: Fn() -> M + Sync,
    {
        let splits = self.splits(dataset.n_samples())?;
        let started = Instant::now();

        let folds = self.run_splits(&splits, |split| {
            let train = dataset.select(&split.train_indices);
            let test = dataset.select(&split.test_indices);
            self.fit_and_score(split.fold_idx, &factory, &train, &test, score_train)
        })?;

        let scores: Vec<f64> = folds.iter().map(|f| f.test_score).collect();
        let (mean, std) = mean_std(&scores);
        info!(
            n_folds = folds.len(),
            n_samples = dataset.n_samples(),
            mean_score = mean,
            std_score = std,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Cross-validation finished"
        );
        Ok(folds)
    }

    /// Fit on a single holdout split and score the held-out part
    pub fn holdout_score<M, F>(
        &self,
        dataset: &Dataset,
        factory: F,
        test_fraction: f64,
        seed: Option<u64>,
    ) -> Result<f64>
    where
        M: Model,
        F: Fn() -> M + Sync,
    {
        let split = HoldoutSplit::new(dataset.n_samples(), test_fraction, seed)?;
        let train = dataset.select(&split.train_indices);
        let test = dataset.select(&split.test_indices);
        let fold = self.fit_and_score(0, &factory, &train, &test, false)?;
        Ok(fold.test_score)
    }

    /// Run `job` once per split, sequentially or on the rayon pool.
    ///
    /// Results come back in split order. The first error stops further
    /// splits from being scheduled and is returned as-is.
    pub(crate) fn run_splits<T, G>(&self, splits: &[FoldSplit], job: G) -> Result<Vec<T>>
    where
        T: Send,
        G: Fn(&FoldSplit) -> Result<T> + Sync,
    {
        let guarded = |split: &FoldSplit| -> Result<T> {
            self.check_cancelled(split.fold_idx)?;
            let out = job(split);
            if out.is_err() {
                warn!(fold = split.fold_idx, "Fold failed, aborting evaluation");
            }
            out
        };

        self.check_threads()?;
        if !self.parallel {
            return splits.iter().map(guarded).collect();
        }

        match self.n_threads {
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| CrossValError::ThreadPool(e.to_string()))?;
                pool.install(|| splits.par_iter().map(guarded).collect())
            }
            None => splits.par_iter().map(guarded).collect(),
        }
    }

    /// Build a model, fit it on `train`, and score it on `test`
    pub(crate) fn fit_and_score<M, F>(
        &self,
        fold_idx: usize,
        factory: &F,
        train: &Dataset,
        test: &Dataset,
        score_train: bool,
    ) -> Result<FoldScore>
    where
        M: Model,
        F: Fn() -> M,
    {
        let failure = |stage: FitStage, source: ModelError| {
            warn!(fold = fold_idx, stage = %stage, error = %source, "Model failure");
            CrossValError::ModelFailure { fold: fold_idx, stage, source }
        };

        let mut model = factory();
        let fit_started = Instant::now();
        model
            .fit(train.features(), train.labels())
            .map_err(|e| failure(FitStage::Fit, e))?;
        let fit_secs = fit_started.elapsed().as_secs_f64();

        let test_score = self.predict_and_score(&model, test, &failure)?;
        let train_score = if score_train {
            Some(self.predict_and_score(&model, train, &failure)?)
        } else {
            None
        };
        self.check_cancelled(fold_idx)?;

        debug!(
            fold = fold_idx,
            n_train = train.n_samples(),
            n_test = test.n_samples(),
            test_score,
            fit_secs,
            "Fold scored"
        );

        Ok(FoldScore {
            fold_idx,
            n_train: train.n_samples(),
            n_test: test.n_samples(),
            test_score,
            train_score,
            fit_secs,
        })
    }

    fn predict_and_score<M: Model>(
        &self,
        model: &M,
        data: &Dataset,
        failure: &impl Fn(FitStage, ModelError) -> CrossValError,
    ) -> Result<f64> {
        let predictions = model
            .predict(data.features())
            .map_err(|e| failure(FitStage::Predict, e))?;
        if predictions.len() != data.n_samples() {
            return Err(failure(
                FitStage::Predict,
                ModelError::ShapeMismatch {
                    expected: format!("{} predictions", data.n_samples()),
                    actual: format!("{} predictions", predictions.len()),
                },
            ));
        }
        Ok(self.scorer.score(data.labels(), &predictions))
    }

    fn check_threads(&self) -> Result<()> {
        if self.n_threads == Some(0) {
            return Err(CrossValError::ConfigError(
                "n_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn check_cancelled(&self, fold_idx: usize) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => {
                warn!(fold = fold_idx, "Evaluation cancelled");
                Err(CrossValError::Cancelled)
            }
            _ => Ok(()),
        }
    }
}

/// Score `k` folds with exact-match accuracy.
///
/// Without `shuffle_seed` the dataset order is partitioned as-is.
pub fn evaluate<M, F>(
    dataset: &Dataset,
    factory: F,
    k: usize,
    shuffle_seed: Option<u64>,
) -> Result<Vec<f64>>
where
    M: Model,
    F: Fn() -> M + Sync,
{
    cross_val_score(dataset, factory, k, shuffle_seed, Scoring::Accuracy)
}

/// Score `k` folds with a caller-supplied scorer
pub fn cross_val_score<M, F, S>(
    dataset: &Dataset,
    factory: F,
    k: usize,
    shuffle_seed: Option<u64>,
    scorer: S,
) -> Result<Vec<f64>>
where
    M: Model,
    F: Fn() -> M + Sync,
    S: Scorer,
{
    let mut evaluator = FoldEvaluator::new(k).with_scorer(scorer);
    if let Some(seed) = shuffle_seed {
        evaluator = evaluator.with_shuffle_seed(seed);
    }
    evaluator.evaluate(dataset, factory)
}

/// Leave-one-out scores: one fold per sample
pub fn leave_one_out_score<M, F, S>(dataset: &Dataset, factory: F, scorer: S) -> Result<Vec<f64>>
where
    M: Model,
    F: Fn() -> M + Sync,
    S: Scorer,
{
    cross_val_score(dataset, factory, dataset.n_samples(), None, scorer)
}
