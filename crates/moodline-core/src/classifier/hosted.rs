//! Hosted transformer classifier (text-classification inference endpoint).
//! Default model: distilbert-base-uncased-finetuned-sst-2-english (POSITIVE / NEGATIVE).

use super::SentimentBackend;
use crate::error::{AnalysisError, AnalysisResult};
use crate::types::SentimentScore;
use async_trait::async_trait;
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INFERENCE_URL: &str =
    "https://router.huggingface.co/hf-inference/models/distilbert/distilbert-base-uncased-finetuned-sst-2-english";

/// One label/confidence pair as returned by the endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a [String],
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

/// The endpoint answers either with every label per input or only the top one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    AllLabels(Vec<Vec<LabelScore>>),
    TopLabel(Vec<LabelScore>),
}

/// Pretrained classifier reached over HTTP. Batches are sent concurrently and
/// re-joined in input order.
#[derive(Debug, Clone)]
pub struct HostedClassifier {
    url: String,
    token: Option<String>,
    batch_size: usize,
    client: reqwest::Client,
}

impl HostedClassifier {
    pub fn new(url: impl Into<String>, token: Option<String>, batch_size: usize) -> AnalysisResult<Self> {
        if batch_size == 0 {
            return Err(AnalysisError::InvalidConfiguration(
                "inference batch size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            url: url.into(),
            token: token.filter(|t| !t.trim().is_empty()),
            batch_size,
            client: reqwest::Client::new(),
        })
    }

    async fn score_one_batch(&self, texts: &[String]) -> AnalysisResult<Vec<SentimentScore>> {
        let body = InferenceRequest {
            inputs: texts,
            options: InferenceOptions { wait_for_model: true },
        };
        let mut req = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            return Err(AnalysisError::Backend(format!(
                "inference endpoint {}: {}",
                status.as_u16(),
                text
            )));
        }

        parse_response(&text, texts.len())
    }
}

#[async_trait]
impl SentimentBackend for HostedClassifier {
    fn name(&self) -> &str {
        "hosted-transformer"
    }

    async fn score_batch(&self, texts: &[String]) -> AnalysisResult<Vec<SentimentScore>> {
        let batches = texts.chunks(self.batch_size).map(|b| self.score_one_batch(b));
        let scored = try_join_all(batches).await?;
        Ok(scored.into_iter().flatten().collect())
    }
}

/// Turn a raw endpoint body into one normalized score per input.
pub(crate) fn parse_response(body: &str, expected: usize) -> AnalysisResult<Vec<SentimentScore>> {
    let parsed: InferenceResponse = serde_json::from_str(body)
        .map_err(|e| AnalysisError::Backend(format!("inference response parse: {}", e)))?;

    let top: Vec<LabelScore> = match parsed {
        InferenceResponse::AllLabels(per_input) => per_input
            .into_iter()
            .map(|labels| {
                labels
                    .into_iter()
                    .max_by(|a, b| a.score.total_cmp(&b.score))
                    .ok_or_else(|| AnalysisError::Backend("inference returned no labels for an input".to_string()))
            })
            .collect::<AnalysisResult<_>>()?,
        InferenceResponse::TopLabel(top) => top,
    };

    if top.len() != expected {
        return Err(AnalysisError::Backend(format!(
            "inference returned {} results for {} inputs",
            top.len(),
            expected
        )));
    }

    Ok(top
        .iter()
        .map(|ls| SentimentScore::from_label(&ls.label, ls.score))
        .collect())
}
