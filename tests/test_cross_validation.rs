//! Integration test: k-fold evaluation end-to-end

use crossval::data::{make_blobs, make_polynomial, Dataset};
use crossval::models::{
    KNNClassifier, MajorityClassifier, Model, ModelError, ModelResult, PolynomialRegression,
};
use crossval::validation::{
    cross_val_score, evaluate, leave_one_out, leave_one_out_score, train_test_split,
    CancellationToken, FoldEvaluator, KFold, Scoring,
};
use crossval::{CrossValError, FitStage};
use ndarray::{Array1, Array2};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

fn blobs() -> Dataset {
    let centers = vec![vec![0.0, 0.0], vec![6.0, 6.0]];
    make_blobs(15, &centers, 0.5, 3).unwrap()
}

/// Records how many training samples each fit saw
struct Recording<'a> {
    seen: &'a Mutex<Vec<usize>>,
}

impl Model for Recording<'_> {
    fn fit(&mut self, _x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
        self.seen.lock().unwrap().push(y.len());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        Ok(Array1::zeros(x.nrows()))
    }
}

struct AlwaysFails;

impl Model for AlwaysFails {
    fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>) -> ModelResult<()> {
        Err(ModelError::Other("fit exploded".to_string()))
    }

    fn predict(&self, _x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        Err(ModelError::NotFitted)
    }
}

#[test]
fn test_folds_cover_every_index_once() {
    for n in [2usize, 7, 10, 31] {
        for k in 2..=n.min(8) {
            let splits = KFold::new(k).with_shuffle_seed(n as u64).split(n).unwrap();
            assert_eq!(splits.len(), k);

            let mut seen = HashSet::new();
            for split in &splits {
                for &i in &split.test_indices {
                    assert!(seen.insert(i), "index {} held out twice (n={}, k={})", i, n, k);
                }
            }
            assert_eq!(seen.len(), n);

            let sizes: Vec<usize> = splits.iter().map(|s| s.test_indices.len()).collect();
            let (min, max) = (sizes.iter().min().unwrap(), sizes.iter().max().unwrap());
            assert!(max - min <= 1, "unbalanced folds {:?}", sizes);
            assert_eq!(sizes.iter().sum::<usize>(), n);
        }
    }
}

#[test]
fn test_leave_one_out_four_samples() {
    let data = Dataset::from_rows(
        vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
        vec![0.0, 0.0, 1.0, 1.0],
    )
    .unwrap();

    let splits = leave_one_out(data.n_samples()).unwrap();
    assert_eq!(splits.len(), 4);
    for split in &splits {
        assert_eq!(split.train_indices.len(), 3);
        assert_eq!(split.test_indices.len(), 1);
    }

    let seen = Mutex::new(Vec::new());
    let scores = evaluate(&data, || Recording { seen: &seen }, 4, None).unwrap();
    assert_eq!(scores.len(), 4);
    assert_eq!(*seen.lock().unwrap(), vec![3, 3, 3, 3]);
}

#[test]
fn test_majority_ten_samples_five_folds() {
    let data = Dataset::from_column(
        (0..10).map(|i| i as f64).collect(),
        vec![0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0],
    )
    .unwrap();

    let scores = evaluate(&data, MajorityClassifier::new, 5, Some(11)).unwrap();
    assert_eq!(scores.len(), 5);
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    assert!((0.0..=1.0).contains(&mean));
}

#[test]
fn test_invalid_fold_counts_never_fit() {
    let data = blobs();
    let fits = AtomicUsize::new(0);
    let factory = || {
        fits.fetch_add(1, Ordering::SeqCst);
        MajorityClassifier::new()
    };

    for k in [0, 1, data.n_samples() + 1] {
        let err = evaluate(&data, &factory, k, None).unwrap_err();
        assert!(matches!(err, CrossValError::InvalidFold { .. }), "k={} gave {:?}", k, err);
    }
    assert_eq!(fits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_empty_dataset_is_invalid_fold() {
    let data = Dataset::new(Array2::zeros((0, 2)), Array1::zeros(0)).unwrap();
    assert!(matches!(
        evaluate(&data, MajorityClassifier::new, 2, None),
        Err(CrossValError::InvalidFold { n_folds: 2, n_samples: 0 })
    ));
}

#[test]
fn test_seeded_runs_are_deterministic() {
    let data = blobs();
    let a = evaluate(&data, || KNNClassifier::new(3), 5, Some(42)).unwrap();
    let b = evaluate(&data, || KNNClassifier::new(3), 5, Some(42)).unwrap();
    assert_eq!(a, b);

    let evaluator = FoldEvaluator::new(5).with_shuffle_seed(42);
    assert_eq!(evaluator.splits(30).unwrap(), evaluator.splits(30).unwrap());
}

#[test]
fn test_parallel_matches_sequential() {
    let data = make_polynomial(60, 0.3, 5).unwrap();
    let sequential = FoldEvaluator::new(6)
        .with_shuffle_seed(1)
        .with_scorer(Scoring::R2)
        .evaluate(&data, || PolynomialRegression::new(3))
        .unwrap();
    let parallel = FoldEvaluator::new(6)
        .with_shuffle_seed(1)
        .with_scorer(Scoring::R2)
        .with_threads(3)
        .evaluate(&data, || PolynomialRegression::new(3))
        .unwrap();

    assert_eq!(sequential, parallel);
}

#[test]
fn test_model_failure_fails_whole_run() {
    let data = blobs();
    for evaluator in [FoldEvaluator::new(5), FoldEvaluator::new(5).with_parallel(true)] {
        match evaluator.evaluate(&data, || AlwaysFails) {
            Err(CrossValError::ModelFailure { stage, source, .. }) => {
                assert_eq!(stage, FitStage::Fit);
                assert_eq!(source, ModelError::Other("fit exploded".to_string()));
            }
            other => panic!("expected model failure, got {:?}", other),
        }
    }
}

#[test]
fn test_sequential_failure_builds_one_model() {
    let data = blobs();
    let built = AtomicUsize::new(0);
    let result = FoldEvaluator::new(5).evaluate(&data, || {
        built.fetch_add(1, Ordering::SeqCst);
        AlwaysFails
    });

    assert!(matches!(result, Err(CrossValError::ModelFailure { fold: 0, .. })));
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_knn_separates_blobs() {
    let data = blobs();
    let results = FoldEvaluator::new(5)
        .with_shuffle_seed(7)
        .cross_validate(&data, || KNNClassifier::new(1))
        .unwrap();

    assert_eq!(results.n_folds, 5);
    assert_eq!(results.mean, 1.0);
    assert_eq!(results.std, 0.0);
}

#[test]
fn test_unshuffled_class_sorted_data_scores_poorly() {
    // Blobs are emitted class by class, so two unshuffled folds each hold out
    // a class the model never saw
    let data = blobs();
    let scores = evaluate(&data, || KNNClassifier::new(1), 2, None).unwrap();
    assert_eq!(scores, vec![0.0, 0.0]);
}

#[test]
fn test_custom_scorer() {
    let data = blobs();
    let error_rate = |y_true: &Array1<f64>, y_pred: &Array1<f64>| {
        let wrong = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t != p).count();
        wrong as f64 / y_true.len() as f64
    };

    let scores = cross_val_score(&data, || KNNClassifier::new(1), 3, Some(2), error_rate).unwrap();
    assert_eq!(scores, vec![0.0, 0.0, 0.0]);
}

#[test]
fn test_leave_one_out_score() {
    let data = make_polynomial(12, 0.1, 9).unwrap();
    let scores =
        leave_one_out_score(&data, || PolynomialRegression::new(2), Scoring::NegMeanSquaredError)
            .unwrap();

    assert_eq!(scores.len(), 12);
    assert!(scores.iter().all(|s| *s <= 0.0));
}

#[test]
fn test_cancellation() {
    let data = blobs();
    let token = CancellationToken::new();
    let evaluator = FoldEvaluator::new(5).with_cancellation(token.clone());

    assert!(evaluator.evaluate(&data, MajorityClassifier::new).is_ok());
    token.cancel();
    assert!(matches!(
        evaluator.evaluate(&data, MajorityClassifier::new),
        Err(CrossValError::Cancelled)
    ));
}

/// Cancels the run from inside the first fit
struct CancelOnFit {
    token: CancellationToken,
}

impl Model for CancelOnFit {
    fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>) -> ModelResult<()> {
        self.token.cancel();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        Ok(Array1::zeros(x.nrows()))
    }
}

#[test]
fn test_cancellation_during_run() {
    let data = make_polynomial(10, 0.1, 4).unwrap();
    let token = CancellationToken::new();
    let built = AtomicUsize::new(0);
    let evaluator = FoldEvaluator::new(5).with_cancellation(token.clone());

    let result = evaluator.evaluate(&data, || {
        built.fetch_add(1, Ordering::SeqCst);
        CancelOnFit { token: token.clone() }
    });

    assert!(matches!(result, Err(CrossValError::Cancelled)));
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_holdout_split_is_disjoint() {
    let ids: Vec<f64> = (0..20).map(|i| i as f64).collect();
    let data = Dataset::from_column(ids.clone(), ids).unwrap();
    let (train, test) = train_test_split(&data, 0.3, Some(5)).unwrap();

    assert_eq!(train.n_samples(), 14);
    assert_eq!(test.n_samples(), 6);

    let train_ids: HashSet<i64> = train.labels().iter().map(|&v| v as i64).collect();
    assert!(test.labels().iter().all(|&v| !train_ids.contains(&(v as i64))));
}
