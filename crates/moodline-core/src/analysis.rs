//! Analysis context: the immutable, startup-built set of model backends and the
//! caption source, plus the three request-level analyses built on them.
//!
//! ```text
//!  text ──► sizing ──► chunker ───┐
//!                                 ├──► classify(backend) ──► aggregator ──► result
//!  cues ──► sizing ──► segmenter ─┘
//! ```

use crate::aggregator::{aggregate_overall, assemble};
use crate::chunker::{chunk, word_count};
use crate::classifier::{classify, BackendKind, HostedClassifier, LinearRegressor, SentimentBackend};
use crate::config::MoodlineConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::segmenter::{segment_by_time, total_duration};
use crate::sizing::{pick_time_granularity, pick_word_granularity};
use crate::transcript::{TimedTextProvider, TranscriptProvider};
use crate::types::{Chunk, Cue, Position, SegmentResult, SentimentScore};
use std::collections::HashMap;
use std::sync::Arc;

/// Window settings for overall (non-segmented) text analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverallWindow {
    pub max_word_count: usize,
    pub overlap: usize,
}

impl Default for OverallWindow {
    fn default() -> Self {
        Self {
            max_word_count: 400,
            overlap: 20,
        }
    }
}

/// Everything a request needs, built once before serving and shared read-only.
pub struct AnalysisContext {
    backends: HashMap<BackendKind, Arc<dyn SentimentBackend>>,
    transcripts: Arc<dyn TranscriptProvider>,
    overall: OverallWindow,
}

impl AnalysisContext {
    /// Start a context around a caption source. Register backends with `with_backend`.
    pub fn new(transcripts: Arc<dyn TranscriptProvider>) -> Self {
        Self {
            backends: HashMap::new(),
            transcripts,
            overall: OverallWindow::default(),
        }
    }

    pub fn with_backend(mut self, kind: BackendKind, backend: Arc<dyn SentimentBackend>) -> Self {
        self.backends.insert(kind, backend);
        self
    }

    pub fn with_overall_window(mut self, window: OverallWindow) -> Self {
        self.overall = window;
        self
    }

    /// Build the production context: hosted classifier, custom regressor from disk, timed-text captions.
    /// Fails if the regressor artifact cannot be loaded.
    pub fn from_config(cfg: &MoodlineConfig) -> AnalysisResult<Self> {
        let hosted = HostedClassifier::new(
            cfg.inference_url.clone(),
            cfg.inference_token.clone(),
            cfg.inference_batch_size,
        )?;
        let regressor = LinearRegressor::load(&cfg.regressor_path)?;
        let transcripts = TimedTextProvider::new(cfg.transcript_url.clone(), cfg.transcript_lang.clone());

        Ok(Self::new(Arc::new(transcripts))
            .with_backend(BackendKind::Pretrained, Arc::new(hosted))
            .with_backend(BackendKind::Custom, Arc::new(regressor))
            .with_overall_window(OverallWindow {
                max_word_count: cfg.overall_max_words,
                overlap: cfg.overall_overlap,
            }))
    }

    /// The backend registered for `kind`. No fallback to another kind.
    pub fn backend(&self, kind: BackendKind) -> AnalysisResult<&dyn SentimentBackend> {
        self.backends
            .get(&kind)
            .map(|b| b.as_ref())
            .ok_or_else(|| AnalysisError::BackendUnavailable(kind.to_string()))
    }

    /// One overall score for `text`, averaged over overlapping windows.
    pub async fn analyze_text_overall(&self, text: &str, kind: BackendKind) -> AnalysisResult<SentimentScore> {
        require_text(text)?;
        let backend = self.backend(kind)?;
        let chunks = chunk(text, self.overall.max_word_count, self.overall.overlap)?;
        let scores = classify(&chunks, backend).await?;
        let overall = aggregate_overall(&scores)?;
        tracing::info!(
            target: "moodline::analysis",
            backend = %kind,
            chunks = chunks.len(),
            negative = overall.negative(),
            positive = overall.positive(),
            "overall text analysis complete"
        );
        Ok(overall)
    }

    /// Per-chunk scores for `text` in disjoint windows sized by word count, tagged with start word index.
    pub async fn analyze_text_progression(&self, text: &str, kind: BackendKind) -> AnalysisResult<Vec<SegmentResult>> {
        require_text(text)?;
        let backend = self.backend(kind)?;
        let max_word_count = pick_word_granularity(word_count(text));
        let chunks = chunk(text, max_word_count, 0)?;
        let result = score_chunks(&chunks, backend).await?;
        tracing::info!(
            target: "moodline::analysis",
            backend = %kind,
            max_word_count,
            segments = result.len(),
            "text progression analysis complete"
        );
        Ok(result)
    }

    /// Per-bucket scores for caption cues, bucket width sized by total duration, tagged with start seconds.
    pub async fn analyze_cues(&self, cues: &[Cue], kind: BackendKind) -> AnalysisResult<Vec<SegmentResult>> {
        let backend = self.backend(kind)?;
        let bucket_seconds = pick_time_granularity(total_duration(cues));
        let chunks = segment_by_time(cues, bucket_seconds)?;
        let result = score_chunks(&chunks, backend).await?;
        tracing::info!(
            target: "moodline::analysis",
            backend = %kind,
            bucket_seconds,
            segments = result.len(),
            "caption analysis complete"
        );
        Ok(result)
    }

    /// Fetch captions for `video_id` and analyze them by time bucket.
    pub async fn analyze_video(&self, video_id: &str, kind: BackendKind) -> AnalysisResult<Vec<SegmentResult>> {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return Err(AnalysisError::InvalidInput("No video id provided".to_string()));
        }
        // Resolve the backend before the network round trip.
        self.backend(kind)?;
        let cues = self.transcripts.fetch_cues(video_id).await?;
        // Out-of-range cues come from the caption source, not the caller.
        self.analyze_cues(&cues, kind).await.map_err(|e| match e {
            AnalysisError::InvalidInput(msg) => {
                AnalysisError::Transcript(format!("captions for video {} unusable: {}", video_id, msg))
            }
            other => other,
        })
    }
}

async fn score_chunks(chunks: &[Chunk], backend: &dyn SentimentBackend) -> AnalysisResult<Vec<SegmentResult>> {
    let scores = classify(chunks, backend).await?;
    let positions: Vec<Position> = chunks.iter().map(|c| c.position).collect();
    assemble(&scores, &positions)
}

fn require_text(text: &str) -> AnalysisResult<()> {
    if text.trim().is_empty() {
        return Err(AnalysisError::InvalidInput("No text provided".to_string()));
    }
    Ok(())
}
