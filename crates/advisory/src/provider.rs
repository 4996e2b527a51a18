//! Completion service seam and the advisory error type.

use async_trait::async_trait;
use serde_json::Value;

/// Errors raised while talking to the completion service.
///
/// These never cross the [`crate::AdvisoryService`] boundary.
#[derive(Debug, thiserror::Error)]
pub enum AdvisoryError {
    #[error("completion service unavailable: {0}")]
    Unavailable(String),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("malformed completion response: {0}")]
    Parse(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AdvisoryError {
    fn from(e: reqwest::Error) -> Self {
        AdvisoryError::Http(e.to_string())
    }
}

impl From<serde_json::Error> for AdvisoryError {
    fn from(e: serde_json::Error) -> Self {
        AdvisoryError::Parse(e.to_string())
    }
}

pub type AdvisoryResult<T> = std::result::Result<T, AdvisoryError>;

/// One prompt sent to a model.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    /// When set, the model is asked for `application/json` output conforming to this schema.
    pub response_schema: Option<Value>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: None,
            top_p: None,
            response_schema: None,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, top_p: f32) -> Self {
        self.temperature = Some(temperature);
        self.top_p = Some(top_p);
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// A service that turns a prompt into model text.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Returns the raw text of the first candidate.
    async fn complete(&self, request: CompletionRequest) -> AdvisoryResult<String>;
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;
}
