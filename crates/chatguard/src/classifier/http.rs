//! HTTP classifier client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Classifier;
use crate::config::ClassifierConfig;
use crate::error::{GuardError, Result};
use crate::pii::Entity;
use crate::util::TimeoutConfig;

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest<'a> {
    /// Text to classify.
    pub text: &'a str,
}

/// Body of a successful `/analyze` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Entities in classifier order. A missing field means none.
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// Classifier reached over HTTP/JSON.
///
/// ```text
/// POST {endpoint}/analyze  {"text": "..."}  ->  {"entities": [{"text": "...", "label": "..."}]}
/// GET  {endpoint}/health                    ->  2xx when healthy
/// ```
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    timeouts: TimeoutConfig,
}

impl HttpClassifier {
    /// Create a client for `endpoint` with default bounds.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeouts(endpoint, TimeoutConfig::default())
    }

    /// Create a client with explicit bounds.
    pub fn with_timeouts(endpoint: impl Into<String>, timeouts: TimeoutConfig) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            endpoint,
            timeouts,
        }
    }

    /// Create a client from configuration.
    ///
    /// Fails when the classifier is disabled, so callers can fall back to
    /// [`NoClassifier`](super::NoClassifier).
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        if !config.enabled {
            return Err(GuardError::unavailable("classifier disabled in configuration"));
        }
        if !(config.endpoint.starts_with("http://") || config.endpoint.starts_with("https://")) {
            return Err(GuardError::config(format!(
                "classifier endpoint must be an http(s) URL, got {:?}",
                config.endpoint
            )));
        }
        Ok(Self::with_timeouts(&config.endpoint, config.timeouts()))
    }

    /// The base URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The configured bounds.
    #[must_use]
    pub const fn timeouts(&self) -> TimeoutConfig {
        self.timeouts
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.endpoint)
    }
}

fn map_send_error(error: reqwest::Error, bound: Duration) -> GuardError {
    if error.is_timeout() {
        GuardError::ClassifierTimeout { elapsed: bound }
    } else {
        GuardError::Transport(error)
    }
}

impl Classifier for HttpClassifier {
    async fn analyze(&self, text: &str) -> Result<Vec<Entity>> {
        let bound = self.timeouts.analyze;
        let response = self
            .client
            .post(self.url("analyze"))
            .timeout(bound)
            .json(&AnalyzeRequest { text })
            .send()
            .await
            .map_err(|e| map_send_error(e, bound))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "classifier rejected analyze request");
            return Err(GuardError::ClassifierStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| map_send_error(e, bound))?;
        let parsed: AnalyzeResponse = serde_json::from_slice(&body)?;
        tracing::debug!(
            text_len = text.len(),
            entities = parsed.entities.len(),
            "classifier analyze completed"
        );
        Ok(parsed.entities)
    }

    async fn probe(&self) -> Result<bool> {
        let bound = self.timeouts.probe;
        let response = self
            .client
            .get(self.url("health"))
            .timeout(bound)
            .send()
            .await
            .map_err(|e| map_send_error(e, bound))?;
        Ok(response.status().is_success())
    }
}
