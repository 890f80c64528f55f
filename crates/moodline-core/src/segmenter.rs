//! Time-bucket segmenter for caption cues.
//!
//! Cue `c` lands in bucket `floor(c.start / bucket_seconds)`. Buckets are dense from 0
//! to the highest index seen; a bucket with no cues is emitted with empty text so the
//! timeline stays uniform. Cues are expected in start order. A cue whose start is not
//! finite, or that would need more than [`MAX_BUCKETS`] buckets, is rejected.

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{Chunk, Cue, Position};

/// Upper bound on the dense timeline length.
pub const MAX_BUCKETS: usize = 10_000;

#[derive(Debug, Default)]
struct Bucket {
    text: String,
    first_start: Option<f64>,
}

/// Group `cues` into `bucket_seconds`-wide buckets.
///
/// Each bucket's text is its cues' text in order, every cue followed by one space.
/// Its position is the start of the first cue it received, or the bucket's nominal
/// start (`index * bucket_seconds`) when it received none.
pub fn segment_by_time(cues: &[Cue], bucket_seconds: f64) -> AnalysisResult<Vec<Chunk>> {
    if !(bucket_seconds.is_finite() && bucket_seconds > 0.0) {
        return Err(AnalysisError::InvalidConfiguration(format!(
            "bucket_seconds must be positive, got {}",
            bucket_seconds
        )));
    }

    let mut buckets: Vec<Bucket> = Vec::new();
    for cue in cues {
        let idx = bucket_index(cue.start, bucket_seconds)?;
        if idx >= buckets.len() {
            buckets.resize_with(idx + 1, Bucket::default);
        }
        let bucket = &mut buckets[idx];
        bucket.text.push_str(&cue.text);
        bucket.text.push(' ');
        bucket.first_start.get_or_insert(cue.start);
    }

    let chunks = buckets
        .into_iter()
        .enumerate()
        .map(|(idx, b)| {
            let start = b.first_start.unwrap_or(idx as f64 * bucket_seconds);
            Chunk::new(b.text, Position::Seconds(start))
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        target: "moodline::segmenter",
        cues = cues.len(),
        bucket_seconds,
        buckets = chunks.len(),
        "segmented cues"
    );
    Ok(chunks)
}

/// Total span covered by `cues`: the latest cue end, or 0 with no cues.
pub fn total_duration(cues: &[Cue]) -> f64 {
    cues.iter().map(Cue::end).fold(0.0, f64::max)
}

fn bucket_index(start: f64, bucket_seconds: f64) -> AnalysisResult<usize> {
    if !start.is_finite() {
        return Err(AnalysisError::InvalidInput(format!("cue start {} is not finite", start)));
    }
    let idx = (start.max(0.0) / bucket_seconds).floor();
    if idx >= MAX_BUCKETS as f64 {
        return Err(AnalysisError::InvalidInput(format!(
            "cue start {}s exceeds {} buckets of {}s",
            start, MAX_BUCKETS, bucket_seconds
        )));
    }
    Ok(idx as usize)
}
