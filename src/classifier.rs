//! Sentiment classifier boundary: the pretrained model is reached over HTTP and treated
//! as a black box returning (label, confidence) per title.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::scorer::ScorerConfig;
use crate::error::ClassifyError;
use crate::sentiment::Sentiment;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// One model verdict. `label` is Positive, Negative or Neutral; `confidence` in [0,1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub label: Sentiment,
    pub confidence: f64,
}

/// Trait object used by the scorer (and tests).
pub trait Classifier: Send + Sync {
    fn classify<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Classification, ClassifyError>> + Send + 'a>>;
    /// Model identifier for diagnostics.
    fn model_name(&self) -> &str;
}

/// Convenient alias used by callers.
pub type DynClassifier = Arc<dyn Classifier>;

/// Env switch that forces the deterministic mock classifier.
pub const ENV_TEST_MODE: &str = "SENTIMENT_TEST_MODE";

/// Factory: build a classifier according to config and environment variables.
///
/// * If `SENTIMENT_TEST_MODE=mock`, returns a deterministic mock (Neutral, 0.5).
/// * Else if disabled or no API token is configured, returns `None` (keyword fallback).
/// * Else builds the Hugging Face inference client.
pub fn build_classifier_from_config(cfg: &ScorerConfig) -> Option<DynClassifier> {
    if std::env::var(ENV_TEST_MODE)
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Some(Arc::new(MockClassifier {
            fixed: Classification {
                label: Sentiment::Neutral,
                confidence: 0.5,
            },
        }));
    }

    if !cfg.enabled {
        tracing::info!(target: "scorer", "model disabled in config, keyword fallback active");
        return None;
    }

    let token = cfg.resolved_token();
    if token.is_empty() {
        tracing::warn!(target: "scorer", model = %cfg.model, "no API token, keyword fallback active");
        return None;
    }

    match HfInferenceClassifier::new(cfg, token) {
        Ok(c) => {
            tracing::info!(target: "scorer", model = %cfg.model, "sentiment model ready");
            Some(Arc::new(c))
        }
        Err(e) => {
            tracing::warn!(target: "scorer", error = %e, "model client unavailable, keyword fallback active");
            None
        }
    }
}

// ------------------------------------------------------------
// Hugging Face inference client
// ------------------------------------------------------------

pub struct HfInferenceClassifier {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    model: String,
}

impl HfInferenceClassifier {
    pub fn new(cfg: &ScorerConfig, token: String) -> Result<Self, ClassifyError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("commodity-news-ai/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| ClassifyError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint(),
            token,
            model: cfg.model.clone(),
        })
    }

    async fn classify_impl(&self, text: &str) -> Result<Classification, ClassifyError> {
        #[derive(Serialize)]
        struct Req<'a> {
            inputs: &'a str,
        }

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&Req { inputs: text })
            .send()
            .await
            .map_err(|e| ClassifyError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ClassifyError::Status(resp.status().as_u16()));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| ClassifyError::Transport(e.to_string()))?;
        parse_inference_body(&body)
    }
}

impl Classifier for HfInferenceClassifier {
    fn classify<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Classification, ClassifyError>> + Send + 'a>> {
        Box::pin(self.classify_impl(text))
    }
    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceBody {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// Decode a text-classification response (`[[{label, score}, …]]` or `[{label, score}, …]`)
/// into its highest-scoring label.
pub fn parse_inference_body(body: &str) -> Result<Classification, ClassifyError> {
    let parsed: InferenceBody =
        serde_json::from_str(body).map_err(|e| ClassifyError::Decode(e.to_string()))?;
    let candidates = match parsed {
        InferenceBody::Nested(v) => v.into_iter().flatten().collect::<Vec<_>>(),
        InferenceBody::Flat(v) => v,
    };
    let best = candidates
        .into_iter()
        .filter(|c| c.score.is_finite())
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| ClassifyError::Decode("no labels in response".into()))?;

    let label = match best.label.trim().to_ascii_lowercase().as_str() {
        "positive" => Sentiment::Positive,
        "negative" => Sentiment::Negative,
        "neutral" => Sentiment::Neutral,
        _ => return Err(ClassifyError::UnknownLabel(best.label)),
    };
    Ok(Classification {
        label,
        confidence: best.score.clamp(0.0, 1.0),
    })
}

// ------------------------------------------------------------
// Test/local doubles
// ------------------------------------------------------------

/// Returns the same verdict for every title.
#[derive(Clone)]
pub struct MockClassifier {
    pub fixed: Classification,
}

impl Classifier for MockClassifier {
    fn classify<'a>(
        &'a self,
        _text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Classification, ClassifyError>> + Send + 'a>> {
        let out = self.fixed;
        Box::pin(async move { Ok(out) })
    }
    fn model_name(&self) -> &str {
        "mock"
    }
}
