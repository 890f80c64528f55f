//! Shared data model: cues, chunks, positions, and sentiment scores.

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

/// One timed caption event from a transcript provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    #[serde(default, alias = "dur")]
    pub duration: f64,
    pub text: String,
}

impl Cue {
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            duration,
            text: text.into(),
        }
    }

    /// End of the cue in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Where a chunk starts in its source: a word index (text mode) or a second offset (caption mode).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Position {
    Word(usize),
    Seconds(f64),
}

/// A contiguous span of input submitted to a classifier as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub position: Position,
}

impl Chunk {
    pub fn new(text: impl Into<String>, position: Position) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }

    /// True when there is nothing for a backend to score.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Normalized (negative, positive) probability pair. Components always sum to 1.
///
/// Serializes as `[negative, positive]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentScore {
    negative: f64,
    positive: f64,
}

impl SentimentScore {
    /// Score used for chunks with no text.
    pub const NEUTRAL: SentimentScore = SentimentScore {
        negative: 0.5,
        positive: 0.5,
    };

    /// Build from a positive-class probability. Out-of-range and NaN inputs are clamped.
    pub fn from_positive(p: f64) -> Self {
        let p = if p.is_nan() { 0.5 } else { p.clamp(0.0, 1.0) };
        Self {
            negative: 1.0 - p,
            positive: p,
        }
    }

    /// Build from a classifier label and its confidence.
    /// `NEGATIVE` (case-insensitive) puts the confidence on the negative side; any other label on the positive side.
    pub fn from_label(label: &str, confidence: f64) -> Self {
        if label.trim().eq_ignore_ascii_case("negative") {
            Self::from_positive(1.0 - confidence.clamp(0.0, 1.0))
        } else {
            Self::from_positive(confidence)
        }
    }

    pub fn negative(&self) -> f64 {
        self.negative
    }

    pub fn positive(&self) -> f64 {
        self.positive
    }
}

impl Serialize for SentimentScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.negative)?;
        tup.serialize_element(&self.positive)?;
        tup.end()
    }
}

/// One point of chart data: a chunk's score tagged with where the chunk starts.
///
/// Serializes as `[negative, positive, position]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentResult {
    pub score: SentimentScore,
    pub position: Position,
}

impl Serialize for SegmentResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(3)?;
        tup.serialize_element(&self.score.negative)?;
        tup.serialize_element(&self.score.positive)?;
        tup.serialize_element(&self.position)?;
        tup.end()
    }
}
