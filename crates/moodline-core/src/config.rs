//! Moodline configuration: defaults, optional TOML file, then environment.
//!
//! | Key | Env | Default |
//! |-----|-----|---------|
//! | app_name | MOODLINE__APP_NAME | Moodline |
//! | host | MOODLINE__HOST | 127.0.0.1 |
//! | port | MOODLINE__PORT | 5000 |
//! | regressor_path | MOODLINE__REGRESSOR_PATH | ./models/custom_regressor.json |
//! | inference_url | MOODLINE__INFERENCE_URL | hosted distilbert SST-2 |
//! | inference_token | MOODLINE__INFERENCE_TOKEN | (none) |
//! | inference_batch_size | MOODLINE__INFERENCE_BATCH_SIZE | 16 |
//! | transcript_url | MOODLINE__TRANSCRIPT_URL | timed-text endpoint |
//! | transcript_lang | MOODLINE__TRANSCRIPT_LANG | en |
//! | request_timeout_secs | MOODLINE__REQUEST_TIMEOUT_SECS | 120 |
//! | overall_max_words | MOODLINE__OVERALL_MAX_WORDS | 400 |
//! | overall_overlap | MOODLINE__OVERALL_OVERLAP | 20 |
//! | cors_origins | MOODLINE__CORS_ORIGINS | [] (any origin) |

use crate::classifier::DEFAULT_INFERENCE_URL;
use crate::error::{AnalysisError, AnalysisResult};
use crate::transcript::DEFAULT_TIMEDTEXT_URL;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodlineConfig {
    pub app_name: String,
    pub host: String,
    pub port: u16,
    /// Custom regressor artifact. Read once at startup; absence is fatal.
    pub regressor_path: String,
    pub inference_url: String,
    #[serde(default)]
    pub inference_token: Option<String>,
    pub inference_batch_size: usize,
    pub transcript_url: String,
    pub transcript_lang: String,
    /// Upper bound on one request, enforced at the HTTP boundary.
    pub request_timeout_secs: u64,
    /// Window size for overall (non-segmented) text analysis.
    pub overall_max_words: usize,
    /// Words shared by consecutive windows in overall analysis.
    pub overall_overlap: usize,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for MoodlineConfig {
    fn default() -> Self {
        Self {
            app_name: "Moodline".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            regressor_path: "./models/custom_regressor.json".to_string(),
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            inference_token: None,
            inference_batch_size: 16,
            transcript_url: DEFAULT_TIMEDTEXT_URL.to_string(),
            transcript_lang: "en".to_string(),
            request_timeout_secs: 120,
            overall_max_words: 400,
            overall_overlap: 20,
            cors_origins: Vec::new(),
        }
    }
}

impl MoodlineConfig {
    /// Load config. Precedence: env `MOODLINE__*` > file at `MOODLINE_CONFIG` (default `config/moodline`) > defaults.
    pub fn load() -> AnalysisResult<Self> {
        let config_path = std::env::var("MOODLINE_CONFIG").unwrap_or_else(|_| "config/moodline".to_string());
        Self::load_from(Some(Path::new(&config_path)))
    }

    /// Load with an explicit file (skipped when it does not exist), then environment overrides.
    pub fn load_from(path: Option<&Path>) -> AnalysisResult<Self> {
        let d = Self::default();
        let builder = config::Config::builder()
            .set_default("app_name", d.app_name)?
            .set_default("host", d.host)?
            .set_default("port", d.port as i64)?
            .set_default("regressor_path", d.regressor_path)?
            .set_default("inference_url", d.inference_url)?
            .set_default("inference_batch_size", d.inference_batch_size as i64)?
            .set_default("transcript_url", d.transcript_url)?
            .set_default("transcript_lang", d.transcript_lang)?
            .set_default("request_timeout_secs", d.request_timeout_secs as i64)?
            .set_default("overall_max_words", d.overall_max_words as i64)?
            .set_default("overall_overlap", d.overall_overlap as i64)?;

        let builder = match path {
            Some(p) => builder.add_source(config::File::from(p).required(false)),
            None => builder,
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("MOODLINE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: MoodlineConfig = built.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the chunker or backends cannot run with.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.overall_max_words == 0 || self.overall_overlap >= self.overall_max_words {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "overall_overlap ({}) must be less than overall_max_words ({})",
                self.overall_overlap, self.overall_max_words
            )));
        }
        if self.inference_batch_size == 0 {
            return Err(AnalysisError::InvalidConfiguration(
                "inference_batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
