//! `generateContent` REST client.

use crate::config::AdvisoryConfig;
use crate::provider::{AdvisoryError, AdvisoryResult, CompletionRequest, CompletionService};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

pub struct GeminiClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &AdvisoryConfig) -> AdvisoryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AdvisoryError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// Builds the JSON body for one request.
    pub fn request_body(request: &CompletionRequest) -> Value {
        let mut generation = Map::new();
        if let Some(t) = request.temperature {
            generation.insert("temperature".into(), json!(t));
        }
        if let Some(p) = request.top_p {
            generation.insert("topP".into(), json!(p));
        }
        if let Some(schema) = &request.response_schema {
            generation.insert("responseMimeType".into(), json!("application/json"));
            generation.insert("responseSchema".into(), schema.clone());
        }

        let mut body = json!({
            "contents": [{"parts": [{"text": request.prompt}]}]
        });
        if !generation.is_empty() {
            body["generationConfig"] = Value::Object(generation);
        }
        body
    }

    /// Extracts the first candidate's text.
    pub fn parse_response(json: &Value) -> AdvisoryResult<String> {
        json.pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                AdvisoryError::Parse("missing candidates[0].content.parts[0].text".to_string())
            })
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> AdvisoryResult<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AdvisoryError::Config("API_KEY is not set".into()));
        };

        let body = Self::request_body(&request);
        tracing::debug!(model = %request.model, "sending completion request");

        let resp = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisoryError::Unavailable(format!("gemini: {}", e)))?
            .error_for_status()?;

        let json: Value = resp.json().await?;
        Self::parse_response(&json)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_plain_prompt_has_no_generation_config() {
        let body = GeminiClient::request_body(&CompletionRequest::new("m", "hello"));
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_request_body_structured_prompt() {
        let req = CompletionRequest::new("m", "p")
            .with_sampling(0.5, 0.8)
            .with_schema(json!({"type": "ARRAY"}));
        let body = GeminiClient::request_body(&req);
        let gen = &body["generationConfig"];
        assert_eq!(gen["responseMimeType"], "application/json");
        assert_eq!(gen["responseSchema"]["type"], "ARRAY");
        assert_eq!(gen["temperature"], json!(0.5f32));
        assert_eq!(gen["topP"], json!(0.8f32));
    }

    #[test]
    fn test_parse_response_reads_first_candidate() {
        let raw = json!({
            "candidates": [{"content": {"parts": [{"text": "  [] \n"}]}}]
        });
        assert_eq!(GeminiClient::parse_response(&raw).expect("text present"), "[]");
        assert!(matches!(
            GeminiClient::parse_response(&json!({"candidates": []})),
            Err(AdvisoryError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_network() {
        let client = GeminiClient::new(&AdvisoryConfig::default()).expect("client builds");
        let err = client
            .complete(CompletionRequest::new("m", "p"))
            .await
            .expect_err("no key configured");
        assert!(matches!(err, AdvisoryError::Config(_)));
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let cfg = AdvisoryConfig {
            base_url: "http://localhost:9000/v1beta/".into(),
            ..AdvisoryConfig::default()
        };
        let client = GeminiClient::new(&cfg).expect("client builds");
        assert_eq!(
            client.endpoint("flash"),
            "http://localhost:9000/v1beta/models/flash:generateContent"
        );
    }
}
