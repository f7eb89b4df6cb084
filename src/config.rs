//! Evaluation configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CrossValError, Result};
use crate::validation::Scoring;

/// Configuration for a cross-validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Number of folds
    pub n_folds: usize,
    /// Seed for shuffling before partitioning (None = keep dataset order)
    pub shuffle_seed: Option<u64>,
    /// Metric applied to each held-out fold
    pub scoring: Scoring,
    /// Evaluate folds on the rayon thread pool
    pub parallel: bool,
    /// Number of threads (None = global rayon pool)
    pub n_threads: Option<usize>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            n_folds: 5,
            shuffle_seed: None,
            scoring: Scoring::Accuracy,
            parallel: false,
            n_threads: None,
        }
    }
}

impl EvaluationConfig {
    pub fn new(n_folds: usize) -> Self {
        Self {
            n_folds,
            ..Self::default()
        }
    }

    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set number of threads; implies parallel evaluation
    pub fn with_threads(mut self, n: usize) -> Self {
        self.n_threads = Some(n);
        self.parallel = true;
        self
    }

    /// Checks that do not depend on the dataset
    pub fn validate(&self) -> Result<()> {
        if self.n_folds < 2 {
            return Err(CrossValError::ConfigError(format!(
                "n_folds must be at least 2, got {}",
                self.n_folds
            )));
        }
        if self.n_threads == Some(0) {
            return Err(CrossValError::ConfigError(
                "n_threads must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvaluationConfig::default();
        assert_eq!(config.n_folds, 5);
        assert_eq!(config.shuffle_seed, None);
        assert_eq!(config.scoring, Scoring::Accuracy);
        assert!(!config.parallel);
    }

    #[test]
    fn test_builder() {
        let config = EvaluationConfig::new(10)
            .with_shuffle_seed(7)
            .with_scoring(Scoring::R2)
            .with_threads(2);

        assert_eq!(config.n_folds, 10);
        assert_eq!(config.shuffle_seed, Some(7));
        assert!(config.parallel);
        assert_eq!(config.n_threads, Some(2));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EvaluationConfig::from_json_str(r#"{"n_folds": 3, "scoring": "r2"}"#).unwrap();
        assert_eq!(config.n_folds, 3);
        assert_eq!(config.scoring, Scoring::R2);
        assert_eq!(config.shuffle_seed, None);
    }

    #[test]
    fn test_invalid_json_config() {
        assert!(matches!(
            EvaluationConfig::from_json_str(r#"{"n_folds": 1}"#),
            Err(CrossValError::ConfigError(_))
        ));
        assert!(matches!(
            EvaluationConfig::from_json_str("{not json"),
            Err(CrossValError::Serialization(_))
        ));
    }
}
