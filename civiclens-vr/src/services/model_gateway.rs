//! Vision model gateway with ordered multi-model fallback
//!
//! The external inference API is reached through one capability trait;
//! candidate model identifiers come from configuration, most capable
//! first. A rate-limit-class failure triggers a fixed cool-down before the
//! next candidate is tried; any other failure moves on immediately. Each
//! candidate is tried at most once per invocation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::EvidenceImage;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const USER_AGENT: &str = "CivicLens/0.1.0 (https://github.com/civiclens/civiclens)";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const RATE_LIMIT_COOLDOWN_MS: u64 = 1500;

/// Default candidate list, newest/most capable first
pub const DEFAULT_MODEL_CANDIDATES: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.0-flash",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

/// Vision model gateway errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Model returned empty response: {0}")]
    EmptyResponse(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("All candidate models failed or are busy")]
    AllModelsUnavailable,
}

impl ModelError {
    fn is_rate_limit(&self) -> bool {
        matches!(self, ModelError::RateLimited(_))
    }
}

/// One invocable vision/language model
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Model identifier for logging and fallback ordering
    fn id(&self) -> &str;

    /// Send a prompt (+ optional image) and return the raw text output
    async fn invoke(
        &self,
        prompt: &str,
        image: Option<&EvidenceImage>,
    ) -> Result<String, ModelError>;
}

/// Gemini generateContent response
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    error: Option<GeminiApiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

/// One Gemini model identifier behind the `VisionModel` trait
pub struct GeminiModel {
    model_id: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl GeminiModel {
    pub fn new(
        model_id: impl Into<String>,
        api_key: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            api_key: api_key.into(),
            http_client,
        }
    }
}

#[async_trait]
impl VisionModel for GeminiModel {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn invoke(
        &self,
        prompt: &str,
        image: Option<&EvidenceImage>,
    ) -> Result<String, ModelError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model_id, self.api_key
        );

        let mut parts = vec![json!({ "text": prompt })];
        if let Some(image) = image {
            parts.push(json!({
                "inline_data": {
                    "mime_type": image.media_type,
                    "data": image.data,
                }
            }));
        }
        let body = json!({ "contents": [{ "parts": parts }] });

        tracing::debug!(model = %self.model_id, "Querying vision model API");

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(ModelError::InvalidApiKey);
        }

        if status == 429 {
            return Err(ModelError::RateLimited(format!(
                "model {} returned HTTP 429",
                self.model_id
            )));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ModelError::ApiError(status.as_u16(), error_text));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::NetworkError(e.to_string()))?;

        if let Some(error) = parsed.error {
            if error.code == 429 {
                return Err(ModelError::RateLimited(error.message));
            }
            return Err(ModelError::ApiError(error.code, error.message));
        }

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.clone());

        match text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(ModelError::EmptyResponse(self.model_id.clone())),
        }
    }
}

/// Ordered fallback over candidate vision models
pub struct ModelGateway {
    candidates: Vec<Arc<dyn VisionModel>>,
    cooldown: Duration,
}

impl ModelGateway {
    pub fn new(candidates: Vec<Arc<dyn VisionModel>>) -> Self {
        Self {
            candidates,
            cooldown: Duration::from_millis(RATE_LIMIT_COOLDOWN_MS),
        }
    }

    /// Override the rate-limit cool-down interval (tests use a short one)
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Build a gateway of Gemini candidates over one shared HTTP client
    pub fn gemini(api_key: &str, model_ids: &[String]) -> Result<Self, ModelError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ModelError::NetworkError(e.to_string()))?;

        let candidates = model_ids
            .iter()
            .map(|id| {
                Arc::new(GeminiModel::new(id.clone(), api_key, http_client.clone()))
                    as Arc<dyn VisionModel>
            })
            .collect();

        Ok(Self::new(candidates))
    }

    /// Try candidates in priority order, returning the first text payload
    ///
    /// Rate-limited candidates cost one cool-down sleep before moving on;
    /// other failures move on immediately. No candidate is retried. When
    /// every candidate fails the caller gets `AllModelsUnavailable` — a
    /// hard failure, never a fabricated verdict.
    pub async fn generate(
        &self,
        prompt: &str,
        image: Option<&EvidenceImage>,
    ) -> Result<String, ModelError> {
        for model in &self.candidates {
            match model.invoke(prompt, image).await {
                Ok(text) => {
                    tracing::info!(model = %model.id(), "Vision model responded");
                    return Ok(text);
                }
                Err(e) if e.is_rate_limit() => {
                    tracing::warn!(
                        model = %model.id(),
                        cooldown_ms = self.cooldown.as_millis() as u64,
                        "Model rate-limited, cooling down before next candidate"
                    );
                    tokio::time::sleep(self.cooldown).await;
                }
                Err(e) => {
                    tracing::warn!(model = %model.id(), error = %e, "Model failed, trying next candidate");
                }
            }
        }

        Err(ModelError::AllModelsUnavailable)
    }
}
