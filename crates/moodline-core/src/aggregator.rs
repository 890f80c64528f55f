//! Combines chunk scores into an overall signal or ordered chart data.

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{Position, SegmentResult, SentimentScore};

/// Component-wise arithmetic mean of `scores`. Fails on an empty slice.
pub fn aggregate_overall(scores: &[SentimentScore]) -> AnalysisResult<SentimentScore> {
    if scores.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    let mean_positive = scores.iter().map(SentimentScore::positive).sum::<f64>() / scores.len() as f64;
    Ok(SentimentScore::from_positive(mean_positive))
}

/// Pair each score with the position of the chunk it came from, in order.
pub fn assemble(scores: &[SentimentScore], positions: &[Position]) -> AnalysisResult<Vec<SegmentResult>> {
    if scores.len() != positions.len() {
        tracing::error!(
            target: "moodline::aggregator",
            scores = scores.len(),
            positions = positions.len(),
            "score/position count mismatch"
        );
        return Err(AnalysisError::InternalConsistency {
            scores: scores.len(),
            positions: positions.len(),
        });
    }
    Ok(scores
        .iter()
        .zip(positions)
        .map(|(&score, &position)| SegmentResult { score, position })
        .collect())
}
