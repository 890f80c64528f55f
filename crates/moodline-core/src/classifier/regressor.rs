//! Custom regressor: a logistic model over word weights, loaded read-only from a JSON artifact.
//!
//! Artifact layout:
//!
//! ```json
//! { "bias": -0.1, "weights": { "good": 1.3, "awful": -2.0 } }
//! ```

use super::SentimentBackend;
use crate::error::{AnalysisError, AnalysisResult};
use crate::types::SentimentScore;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct LinearRegressor {
    #[serde(default)]
    bias: f64,
    weights: HashMap<String, f64>,
}

impl LinearRegressor {
    /// Load the artifact at `path`. A missing or malformed file is a `ModelLoad` error.
    pub fn load(path: impl AsRef<Path>) -> AnalysisResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AnalysisError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        let model: LinearRegressor = serde_json::from_str(&content)
            .map_err(|e| AnalysisError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        tracing::info!(
            target: "moodline::classifier",
            path = %path.display(),
            vocabulary = model.weights.len(),
            "custom regressor loaded"
        );
        Ok(model)
    }

    pub fn from_weights(bias: f64, weights: HashMap<String, f64>) -> Self {
        Self { bias, weights }
    }

    /// Positive-class probability for `text`.
    pub fn predict(&self, text: &str) -> f64 {
        let logit = self.bias
            + text
                .split_whitespace()
                .map(normalize_token)
                .filter_map(|t| self.weights.get(&t))
                .sum::<f64>();
        sigmoid(logit)
    }
}

#[async_trait]
impl SentimentBackend for LinearRegressor {
    fn name(&self) -> &str {
        "custom-regressor"
    }

    async fn score_batch(&self, texts: &[String]) -> AnalysisResult<Vec<SentimentScore>> {
        Ok(texts
            .iter()
            .map(|t| SentimentScore::from_positive(self.predict(t)))
            .collect())
    }
}

fn normalize_token(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_ascii_punctuation()).to_lowercase()
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
