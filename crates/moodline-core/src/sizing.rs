//! Granularity policy: how finely to split an input given its size.
//!
//! Both tables are evaluated top to bottom and the first tier whose bound is
//! `>=` the input wins. The last tier has no bound and always matches.

/// One row of a sizing decision table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier<B, V> {
    /// Inclusive upper bound on input size; `None` matches everything.
    pub up_to: Option<B>,
    pub value: V,
}

/// Words-per-chunk by total word count. Three tiers: <=100, <=250, rest.
pub const WORD_TIERS: &[Tier<usize, usize>] = &[
    Tier { up_to: Some(100), value: 20 },
    Tier { up_to: Some(250), value: 50 },
    Tier { up_to: None, value: 150 },
];

/// Bucket width in seconds by total caption duration.
pub const TIME_TIERS: &[Tier<f64, f64>] = &[
    Tier { up_to: Some(150.0), value: 20.0 },
    Tier { up_to: Some(300.0), value: 40.0 },
    Tier { up_to: None, value: 60.0 },
];

fn first_match<B: PartialOrd + Copy, V: Copy>(table: &[Tier<B, V>], size: B) -> Option<V> {
    table
        .iter()
        .find(|t| t.up_to.map_or(true, |bound| size <= bound))
        .map(|t| t.value)
}

/// Max words per chunk for a text of `word_count` words.
pub fn pick_word_granularity(word_count: usize) -> usize {
    first_match(WORD_TIERS, word_count).unwrap_or(150)
}

/// Bucket width in seconds for captions spanning `duration_seconds`.
pub fn pick_time_granularity(duration_seconds: f64) -> f64 {
    first_match(TIME_TIERS, duration_seconds).unwrap_or(60.0)
}
