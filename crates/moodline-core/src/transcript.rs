//! Caption source for video analysis.
//!
//! `TimedTextProvider` fetches the timed-text XML track for a video and turns every
//! `<text start=".." dur="..">..</text>` element into a `Cue`.

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::Cue;
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_TIMEDTEXT_URL: &str = "https://video.google.com/timedtext";

/// Anything that can turn a video id into ordered caption cues.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    async fn fetch_cues(&self, video_id: &str) -> AnalysisResult<Vec<Cue>>;
}

/// Fetches captions from a timed-text endpoint: `GET {base_url}?lang={lang}&v={video_id}`.
#[derive(Debug, Clone)]
pub struct TimedTextProvider {
    base_url: String,
    lang: String,
    client: reqwest::Client,
}

impl TimedTextProvider {
    pub fn new(base_url: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            lang: lang.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TranscriptProvider for TimedTextProvider {
    async fn fetch_cues(&self, video_id: &str) -> AnalysisResult<Vec<Cue>> {
        tracing::info!(target: "moodline::transcript", video_id, lang = %self.lang, "fetching captions");

        let res = self
            .client
            .get(&self.base_url)
            .query(&[("lang", self.lang.as_str()), ("v", video_id)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(AnalysisError::Transcript(format!(
                "timed-text {} for video {}",
                status.as_u16(),
                video_id
            )));
        }

        let cues = parse_timed_text(&body);
        if cues.is_empty() {
            return Err(AnalysisError::Transcript(format!("no captions for video {}", video_id)));
        }
        tracing::debug!(target: "moodline::transcript", video_id, cues = cues.len(), "captions parsed");
        Ok(cues)
    }
}

fn text_element() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<text\s+start="([0-9.]+)"(?:\s+dur="([0-9.]+)")?[^>]*>(.*?)</text>"#)
            .expect("timed-text pattern is valid")
    })
}

/// Parse timed-text XML into cues, in document order. Malformed elements, including
/// timestamps that overflow to infinity, are skipped.
pub fn parse_timed_text(xml: &str) -> Vec<Cue> {
    text_element()
        .captures_iter(xml)
        .filter_map(|cap| {
            let start = cap.get(1)?.as_str().parse::<f64>().ok().filter(|s| s.is_finite())?;
            let duration = cap
                .get(2)
                .and_then(|d| d.as_str().parse::<f64>().ok())
                .filter(|d| d.is_finite())
                .unwrap_or(0.0);
            let text = decode_entities(cap.get(3)?.as_str().trim());
            Some(Cue::new(start, duration, text))
        })
        .collect()
}

/// Decode the XML entities that appear in caption tracks. `&amp;` is decoded last.
fn decode_entities(s: &str) -> String {
    s.replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace('\n', " ")
        .replace("&amp;", "&")
}
