//! Moodline core library.
//! Splits text and caption tracks into model-sized chunks, scores each chunk with a
//! pluggable sentiment backend, and aggregates the scores into chart data.

pub mod aggregator;
pub mod analysis;
pub mod chunker;
pub mod classifier;
pub mod config;
pub mod error;
pub mod segmenter;
pub mod sizing;
pub mod transcript;
pub mod types;

pub use aggregator::{aggregate_overall, assemble};
pub use analysis::{AnalysisContext, OverallWindow};
pub use chunker::chunk;
pub use classifier::{classify, BackendKind, HostedClassifier, LinearRegressor, SentimentBackend};
pub use config::MoodlineConfig;
pub use error::{AnalysisError, AnalysisResult};
pub use segmenter::segment_by_time;
pub use sizing::{pick_time_granularity, pick_word_granularity};
pub use transcript::{TimedTextProvider, TranscriptProvider};
pub use types::{Chunk, Cue, Position, SegmentResult, SentimentScore};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
