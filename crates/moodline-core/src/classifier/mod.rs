//! Classifier adapter: one capability over interchangeable sentiment backends.
//!
//! Implement `SentimentBackend` for any model that can score a batch of strings.
//! Use `classify` to score chunks: it keeps chunk order, and blank chunks get
//! `SentimentScore::NEUTRAL` without reaching the backend.

mod hosted;
mod regressor;

pub use hosted::{HostedClassifier, LabelScore, DEFAULT_INFERENCE_URL};
pub use regressor::LinearRegressor;

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{Chunk, SentimentScore};
use async_trait::async_trait;
use std::fmt;

/// A sentiment model that scores strings. Implementations must return exactly one
/// score per input, in input order, and are shared read-only across requests.
#[async_trait]
pub trait SentimentBackend: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Score every text. Never called with an empty slice or blank strings.
    async fn score_batch(&self, texts: &[String]) -> AnalysisResult<Vec<SentimentScore>>;
}

/// Which registered backend a request wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Pretrained transformer classifier (label + confidence).
    Pretrained,
    /// Custom regressor (positive probability).
    Custom,
}

impl BackendKind {
    /// Map the request flag `use_custom_model` to a kind.
    pub fn from_flag(use_custom_model: bool) -> Self {
        if use_custom_model {
            BackendKind::Custom
        } else {
            BackendKind::Pretrained
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Pretrained => write!(f, "pretrained"),
            BackendKind::Custom => write!(f, "custom"),
        }
    }
}

/// Score `chunks` with `backend`, one score per chunk, order preserved.
pub async fn classify(chunks: &[Chunk], backend: &dyn SentimentBackend) -> AnalysisResult<Vec<SentimentScore>> {
    let mut scores = vec![SentimentScore::NEUTRAL; chunks.len()];

    let (indices, texts): (Vec<usize>, Vec<String>) = chunks
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_blank())
        .map(|(i, c)| (i, c.text.clone()))
        .unzip();

    if texts.is_empty() {
        tracing::debug!(
            target: "moodline::classifier",
            chunks = chunks.len(),
            "all chunks blank; backend not invoked"
        );
        return Ok(scores);
    }

    tracing::info!(
        target: "moodline::classifier",
        backend = backend.name(),
        chunks = chunks.len(),
        scored = texts.len(),
        "classifying chunks"
    );

    let scored = backend.score_batch(&texts).await?;
    if scored.len() != texts.len() {
        return Err(AnalysisError::Backend(format!(
            "{} returned {} scores for {} texts",
            backend.name(),
            scored.len(),
            texts.len()
        )));
    }

    for (idx, score) in indices.into_iter().zip(scored) {
        scores[idx] = score;
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;
    use std::sync::Mutex;

    /// Scores by word length and records what it was asked to score.
    struct RecordingBackend {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SentimentBackend for RecordingBackend {
        fn name(&self) -> &str {
            "recording"
        }

        async fn score_batch(&self, texts: &[String]) -> AnalysisResult<Vec<SentimentScore>> {
            self.seen.lock().unwrap().extend(texts.iter().cloned());
            Ok(texts
                .iter()
                .map(|t| SentimentScore::from_positive(t.len() as f64 / 10.0))
                .collect())
        }
    }

    struct ShortBackend;

    #[async_trait]
    impl SentimentBackend for ShortBackend {
        fn name(&self) -> &str {
            "short"
        }

        async fn score_batch(&self, _texts: &[String]) -> AnalysisResult<Vec<SentimentScore>> {
            Ok(vec![SentimentScore::NEUTRAL])
        }
    }

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk::new(*t, Position::Word(i)))
            .collect()
    }

    #[tokio::test]
    async fn blank_chunks_stay_neutral_and_skip_backend() {
        let backend = RecordingBackend { seen: Mutex::new(Vec::new()) };
        let input = chunks(&["abcd", "", "  ", "abcdefgh"]);
        let scores = classify(&input, &backend).await.unwrap();

        assert_eq!(scores.len(), 4);
        assert!((scores[0].positive() - 0.4).abs() < 1e-9);
        assert_eq!(scores[1], SentimentScore::NEUTRAL);
        assert_eq!(scores[2], SentimentScore::NEUTRAL);
        assert!((scores[3].positive() - 0.8).abs() < 1e-9);
        assert_eq!(*backend.seen.lock().unwrap(), vec!["abcd".to_string(), "abcdefgh".to_string()]);
    }

    #[tokio::test]
    async fn all_blank_never_calls_backend() {
        let backend = RecordingBackend { seen: Mutex::new(Vec::new()) };
        let scores = classify(&chunks(&[""]), &backend).await.unwrap();
        assert_eq!(scores, vec![SentimentScore::NEUTRAL]);
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn short_backend_response_is_an_error() {
        let err = classify(&chunks(&["a", "b"]), &ShortBackend).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Backend(_)));
    }

    #[test]
    fn flag_selects_kind() {
        assert_eq!(BackendKind::from_flag(true), BackendKind::Custom);
        assert_eq!(BackendKind::from_flag(false), BackendKind::Pretrained);
        assert_eq!(BackendKind::Custom.to_string(), "custom");
    }
}
