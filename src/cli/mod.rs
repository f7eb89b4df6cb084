//! crossval CLI module
//!
//! Runs the validation tools against synthetic datasets so their behaviour
//! can be explored from the command line.

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::EvaluationConfig;
use crate::data::{make_blobs, make_polynomial, Dataset};
use crate::models::{KNNClassifier, MajorityClassifier, Model, PolynomialRegression};
use crate::validation::{
    learning_curve, validation_curve, CVResults, FoldEvaluator, Scoring, TrainSizes,
};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString    { s.truecolor(100, 210, 120) }

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn fmt_scores(scores: &[f64]) -> String {
    scores.iter().map(|s| format!("{:.3}", s)).collect::<Vec<_>>().join("  ")
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "crossval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Holdout, k-fold, validation-curve and learning-curve model validation")]
#[command(long_about = None)]
pub struct Cli {
    /// JSON evaluation config (n_folds, shuffle_seed, scoring, parallel, n_threads)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// K-fold cross-validation
    Cv {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        eval: EvalArgs,
    },

    /// Leave-one-out cross-validation
    Loo {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        model: ModelArgs,
    },

    /// Single train/test holdout split
    Holdout {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        model: ModelArgs,

        /// Fraction of samples held out for testing
        #[arg(long, default_value = "0.5")]
        test_fraction: f64,

        /// Shuffle seed for the split
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Score vs. model complexity (polynomial degree or neighbour count)
    ValidationCurve {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        eval: EvalArgs,

        /// Parameter values to sweep
        #[arg(long, value_delimiter = ',', default_value = "1,2,3,5,7,9")]
        values: Vec<usize>,
    },

    /// Score vs. training-set size
    LearningCurve {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        eval: EvalArgs,

        /// Training-set fractions in (0, 1]
        #[arg(long, value_delimiter = ',', default_value = "0.1,0.325,0.55,0.775,1.0")]
        sizes: Vec<f64>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DatasetKind {
    /// Two-feature Gaussian clusters
    Blobs,
    /// Noisy 1-D regression problem
    Polynomial,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModelKind {
    Majority,
    Knn,
    Poly,
}

#[derive(Args, Clone, Debug)]
pub struct DataArgs {
    #[arg(long, value_enum, default_value = "blobs")]
    pub dataset: DatasetKind,

    /// Samples (per class for blobs)
    #[arg(long, default_value = "40")]
    pub samples: usize,

    /// Noise level (cluster std for blobs)
    #[arg(long, default_value = "1.0")]
    pub noise: f64,

    #[arg(long, default_value = "1")]
    pub data_seed: u64,
}

#[derive(Args, Clone, Copy, Debug)]
pub struct ModelArgs {
    #[arg(long, value_enum, default_value = "knn")]
    pub model: ModelKind,

    #[arg(long, default_value = "1")]
    pub neighbors: usize,

    #[arg(long, default_value = "2")]
    pub degree: usize,
}

#[derive(Args, Clone, Debug, Default)]
pub struct EvalArgs {
    #[arg(short, long)]
    pub folds: Option<usize>,

    #[arg(long)]
    pub shuffle_seed: Option<u64>,

    /// accuracy, r2 or neg_mse
    #[arg(long)]
    pub scoring: Option<Scoring>,

    #[arg(long)]
    pub parallel: bool,

    #[arg(long)]
    pub threads: Option<usize>,
}

// ─── Builders ──────────────────────────────────────────────────────────────────

pub fn build_dataset(args: &DataArgs) -> anyhow::Result<Dataset> {
    let data = match args.dataset {
        DatasetKind::Blobs => {
            let centers = vec![vec![0.0, 0.0], vec![3.0, 3.0], vec![-3.0, 3.0]];
            make_blobs(args.samples, &centers, args.noise, args.data_seed)?
        }
        DatasetKind::Polynomial => make_polynomial(args.samples, args.noise, args.data_seed)?,
    };
    Ok(data)
}

/// Fresh model of `kind`; `param` is the degree or neighbour count
pub fn build_model(kind: ModelKind, param: usize) -> Box<dyn Model> {
    match kind {
        ModelKind::Majority => Box::new(MajorityClassifier::new()),
        ModelKind::Knn => Box::new(KNNClassifier::new(param)),
        ModelKind::Poly => Box::new(PolynomialRegression::new(param)),
    }
}

fn model_param(model: &ModelArgs) -> usize {
    match model.model {
        ModelKind::Poly => model.degree,
        _ => model.neighbors,
    }
}

fn default_scoring(model: ModelKind) -> Scoring {
    match model {
        ModelKind::Poly => Scoring::R2,
        _ => Scoring::Accuracy,
    }
}

/// Config file (or defaults) with command-line overrides applied
pub fn resolve_config(
    path: Option<&PathBuf>,
    eval: &EvalArgs,
    model: ModelKind,
) -> anyhow::Result<EvaluationConfig> {
    let mut config = match path {
        Some(path) => EvaluationConfig::from_file(path)?,
        None => EvaluationConfig::default().with_scoring(default_scoring(model)),
    };

    if let Some(folds) = eval.folds {
        config.n_folds = folds;
    }
    if let Some(seed) = eval.shuffle_seed {
        config.shuffle_seed = Some(seed);
    }
    if let Some(scoring) = eval.scoring {
        config.scoring = scoring;
    }
    if eval.parallel {
        config.parallel = true;
    }
    if let Some(threads) = eval.threads {
        config = config.with_threads(threads);
    }
    config.validate()?;
    Ok(config)
}

fn emit_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_ref();
    match cli.command {
        Commands::Cv { data, model, eval } => {
            let config = resolve_config(config_path, &eval, model.model)?;
            cmd_cv(&data, &model, &config, cli.json)
        }
        Commands::Loo { data, model } => {
            let config = resolve_config(config_path, &EvalArgs::default(), model.model)?;
            cmd_loo(&data, &model, &config, cli.json)
        }
        Commands::Holdout { data, model, test_fraction, seed } => {
            let config = resolve_config(config_path, &EvalArgs::default(), model.model)?;
            cmd_holdout(&data, &model, &config, test_fraction, seed, cli.json)
        }
        Commands::ValidationCurve { data, model, eval, values } => {
            let config = resolve_config(config_path, &eval, model.model)?;
            cmd_validation_curve(&data, &model, &config, &values, cli.json)
        }
        Commands::LearningCurve { data, model, eval, sizes } => {
            let config = resolve_config(config_path, &eval, model.model)?;
            cmd_learning_curve(&data, &model, &config, sizes, cli.json)
        }
    }
}

fn print_results(title: &str, results: &CVResults, elapsed: std::time::Duration) {
    section(title);
    kv("Folds", &results.n_folds.to_string());
    kv("Scores", &fmt_scores(&results.scores));
    kv("Mean", &format!("{:.4} (+/- {:.4})", results.mean, results.std * 2.0));
    kv("Range", &format!("{:.4} .. {:.4}", results.min, results.max));
    println!();
    step_ok(&format!("done in {:?}", elapsed));
    println!();
}

pub fn cmd_cv(
    data: &DataArgs,
    model: &ModelArgs,
    config: &EvaluationConfig,
    json: bool,
) -> anyhow::Result<()> {
    let dataset = build_dataset(data)?;
    let evaluator = FoldEvaluator::from_config(config)?;
    let (kind, param) = (model.model, model_param(model));

    let start = Instant::now();
    let results = evaluator.cross_validate(&dataset, || build_model(kind, param))?;

    if json {
        return emit_json(&results);
    }
    print_results("Cross-validation", &results, start.elapsed());
    Ok(())
}

pub fn cmd_loo(
    data: &DataArgs,
    model: &ModelArgs,
    config: &EvaluationConfig,
    json: bool,
) -> anyhow::Result<()> {
    let dataset = build_dataset(data)?;
    let loo_config = EvaluationConfig {
        n_folds: dataset.n_samples(),
        shuffle_seed: None,
        ..config.clone()
    };
    let evaluator = FoldEvaluator::from_config(&loo_config)?;
    let (kind, param) = (model.model, model_param(model));

    let start = Instant::now();
    let results = evaluator.cross_validate(&dataset, || build_model(kind, param))?;

    if json {
        return emit_json(&results);
    }
    section("Leave-one-out");
    kv("Folds", &results.n_folds.to_string());
    kv("Mean", &format!("{:.4}", results.mean));
    println!();
    step_ok(&format!("done in {:?}", start.elapsed()));
    println!();
    Ok(())
}

pub fn cmd_holdout(
    data: &DataArgs,
    model: &ModelArgs,
    config: &EvaluationConfig,
    test_fraction: f64,
    seed: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let dataset = build_dataset(data)?;
    // Fold count plays no part in a holdout split
    let evaluator = FoldEvaluator::new(2).with_scorer(config.scoring);
    let (kind, param) = (model.model, model_param(model));

    let score =
        evaluator.holdout_score(&dataset, || build_model(kind, param), test_fraction, seed)?;

    if json {
        return emit_json(&serde_json::json!({
            "test_fraction": test_fraction,
            "scoring": config.scoring,
            "score": score,
        }));
    }
    section("Holdout");
    kv("Test fraction", &format!("{:.2}", test_fraction));
    kv("Score", &format!("{:.4}", score));
    println!();
    Ok(())
}

pub fn cmd_validation_curve(
    data: &DataArgs,
    model: &ModelArgs,
    config: &EvaluationConfig,
    values: &[usize],
    json: bool,
) -> anyhow::Result<()> {
    let dataset = build_dataset(data)?;
    let evaluator = FoldEvaluator::from_config(config)?;
    let kind = model.model;

    let curve = validation_curve(&evaluator, &dataset, values, |&v| build_model(kind, v))?;

    if json {
        return emit_json(&curve);
    }
    section("Validation curve");
    println!("  {:<10} {:>12} {:>12}", muted("param"), muted("train"), muted("test"));
    let (train, test) = (curve.mean_train_scores(), curve.mean_test_scores());
    for (i, param) in curve.param_values.iter().enumerate() {
        println!("  {:<10} {:>12.4} {:>12.4}", param, train[i], test[i]);
    }
    if let Some(best) = curve.best_index() {
        println!();
        step_ok(&format!("best value {} (test {:.4})", curve.param_values[best], test[best]));
    }
    println!();
    Ok(())
}

pub fn cmd_learning_curve(
    data: &DataArgs,
    model: &ModelArgs,
    config: &EvaluationConfig,
    sizes: Vec<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let dataset = build_dataset(data)?;
    let evaluator = FoldEvaluator::from_config(config)?;
    let (kind, param) = (model.model, model_param(model));

    let curve = learning_curve(
        &evaluator,
        &dataset,
        &TrainSizes::Fractions(sizes),
        || build_model(kind, param),
    )?;

    if json {
        return emit_json(&curve);
    }
    section("Learning curve");
    println!("  {:<10} {:>12} {:>12}", muted("n_train"), muted("train"), muted("test"));
    let (train, test) = (curve.mean_train_scores(), curve.mean_test_scores());
    for (i, n) in curve.train_sizes.iter().enumerate() {
        println!("  {:<10} {:>12.4} {:>12.4}", n, train[i], test[i]);
    }
    println!();
    Ok(())
}
