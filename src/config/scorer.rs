// src/config/scorer.rs
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_MODEL: &str = "mrm8488/distilroberta-finetuned-financial-news-sentiment-analysis";
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
pub const ENV_API_TOKEN: &str = "HF_API_TOKEN";

fn default_enabled() -> bool {
    true
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_inference_url() -> String {
    DEFAULT_INFERENCE_URL.to_string()
}
fn default_api_token() -> String {
    "ENV".to_string()
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_connect_timeout_ms() -> u64 {
    4_000
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScorerConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model identifier on the inference endpoint.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_inference_url")]
    pub inference_url: String,
    /// "ENV" means: read from HF_API_TOKEN
    #[serde(default = "default_api_token")]
    pub api_token: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Seed for the keyword fallback's score sampling; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            model: default_model(),
            inference_url: default_inference_url(),
            api_token: default_api_token(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            seed: None,
        }
    }
}

impl ScorerConfig {
    /// Token to send, resolving `"ENV"`. Empty when none is configured; the
    /// classifier then counts as unavailable.
    pub fn resolved_token(&self) -> String {
        if self.api_token.trim().eq_ignore_ascii_case("env") {
            env::var(ENV_API_TOKEN).unwrap_or_default()
        } else {
            self.api_token.trim().to_string()
        }
    }

    /// Model endpoint, e.g. `https://api-inference.huggingface.co/models/<model>`.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.inference_url.trim_end_matches('/'),
            self.model.trim_matches('/')
        )
    }
}
