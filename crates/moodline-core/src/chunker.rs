//! Word-window chunker.
//!
//! Text is split on single spaces (not general whitespace), so `"a  b"` has three
//! units: `"a"`, `""`, `"b"`. Windows of `max_word_count` units advance by
//! `max_word_count - overlap`; with `overlap == 0` every unit lands in exactly one
//! chunk and joining the chunks with `' '` reproduces the input.

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{Chunk, Position};

/// Split `text` into its word units.
pub fn words(text: &str) -> Vec<&str> {
    text.split(' ').collect()
}

/// Number of word units in `text` as the chunker counts them.
pub fn word_count(text: &str) -> usize {
    text.split(' ').count()
}

/// Split `text` into windows of at most `max_word_count` words, consecutive windows sharing `overlap` words.
///
/// Each chunk's position is the index of its first word. Empty input yields a single
/// empty chunk at position 0; callers must not send it to a backend as content.
pub fn chunk(text: &str, max_word_count: usize, overlap: usize) -> AnalysisResult<Vec<Chunk>> {
    if max_word_count == 0 {
        return Err(AnalysisError::InvalidConfiguration(
            "max_word_count must be at least 1".to_string(),
        ));
    }
    if overlap >= max_word_count {
        return Err(AnalysisError::InvalidConfiguration(format!(
            "overlap ({}) must be less than max_word_count ({})",
            overlap, max_word_count
        )));
    }

    let units = words(text);
    let stride = max_word_count - overlap;

    let chunks = (0..units.len())
        .step_by(stride)
        .map(|start| {
            let end = (start + max_word_count).min(units.len());
            Chunk::new(units[start..end].join(" "), Position::Word(start))
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        target: "moodline::chunker",
        words = units.len(),
        max_word_count,
        overlap,
        chunks = chunks.len(),
        "chunked text"
    );
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    fn starts(chunks: &[Chunk]) -> Vec<usize> {
        chunks
            .iter()
            .map(|c| match c.position {
                Position::Word(i) => i,
                Position::Seconds(_) => panic!("word mode produced a time position"),
            })
            .collect()
    }

    #[test]
    fn disjoint_chunks_are_lossless() {
        let text = "the quick brown fox jumps over the lazy dog";
        let chunks = chunk(text, 4, 0).unwrap();
        assert_eq!(texts(&chunks), vec!["the quick brown fox", "jumps over the lazy", "dog"]);
        assert_eq!(starts(&chunks), vec![0, 4, 8]);
        assert_eq!(texts(&chunks).join(" "), text);
    }

    #[test]
    fn disjoint_mode_keeps_empty_units_from_double_spaces() {
        let text = "a  b c";
        let chunks = chunk(text, 2, 0).unwrap();
        assert_eq!(texts(&chunks), vec!["a ", "b c"]);
        assert_eq!(texts(&chunks).join(" "), text);
    }

    #[test]
    fn overlapping_windows_share_overlap_words() {
        let text = "A B C D E F G H I J";
        let chunks = chunk(text, 5, 2).unwrap();
        assert_eq!(texts(&chunks), vec!["A B C D E", "D E F G H", "G H I J", "J"]);
        assert_eq!(starts(&chunks), vec![0, 3, 6, 9]);

        let first: Vec<&str> = chunks[0].text.split(' ').collect();
        let second: Vec<&str> = chunks[1].text.split(' ').collect();
        assert_eq!(&first[first.len() - 2..], &second[..2]);
    }

    #[test]
    fn positions_are_monotonic() {
        let text = (0..97).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let chunks = chunk(&text, 20, 5).unwrap();
        let s = starts(&chunks);
        assert!(s.windows(2).all(|w| w[0] < w[1]));
        assert!(chunks.iter().all(|c| !c.text.is_empty()));
    }

    #[test]
    fn empty_text_yields_single_empty_chunk() {
        let chunks = chunk("", 20, 0).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_blank());
        assert_eq!(chunks[0].position, Position::Word(0));
    }

    #[test]
    fn rejects_non_positive_stride() {
        assert!(matches!(chunk("a b", 5, 5), Err(AnalysisError::InvalidConfiguration(_))));
        assert!(matches!(chunk("a b", 5, 9), Err(AnalysisError::InvalidConfiguration(_))));
        assert!(matches!(chunk("a b", 0, 0), Err(AnalysisError::InvalidConfiguration(_))));
    }

    #[test]
    fn counts_units_like_the_chunker() {
        assert_eq!(word_count("good good good"), 3);
        assert_eq!(word_count(""), 1);
        assert_eq!(word_count("a  b"), 3);
    }
}
