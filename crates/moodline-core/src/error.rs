//! Error types for the Moodline analysis core

use thiserror::Error;

/// Result type alias for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that can occur while chunking, classifying, or aggregating
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Missing or empty request input (text, video id). User-facing.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Averaging over zero scores.
    #[error("Cannot aggregate an empty score sequence")]
    EmptyInput,

    /// Chunker and aggregator disagree on sequence length. Always a defect.
    #[error("Internal consistency violation: {scores} scores for {positions} positions")]
    InternalConsistency { scores: usize, positions: usize },

    #[error("Sentiment backend error: {0}")]
    Backend(String),

    #[error("Transcript provider error: {0}")]
    Transcript(String),

    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("No backend registered for {0}")]
    BackendUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    /// True when the caller sent bad input (maps to a 4xx at the HTTP boundary).
    pub fn is_user_error(&self) -> bool {
        matches!(self, AnalysisError::InvalidInput(_))
    }

    /// True when a collaborator (model backend, transcript provider) failed.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AnalysisError::Backend(_) | AnalysisError::Transcript(_) | AnalysisError::Http(_)
        )
    }
}
