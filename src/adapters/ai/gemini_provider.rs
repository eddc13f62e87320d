//! Gemini Provider - Implementation of AIProvider for Google's Generative Language API.
//!
//! Uses `models/{model}:generateContent`. Structured replies set
//! `responseMimeType: application/json` and a `responseSchema`; Gemini expects
//! upper-case OpenAPI type names, so schema types are rewritten on the way out.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key).with_model("gemini-1.5-flash");
//! let provider = GeminiProvider::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole,
    ProviderInfo, TokenUsage,
};

/// Default API base URL.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    api_key: Secret<String>,
    /// Model reported by `provider_info` (requests carry their own).
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-1.5-flash".to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.config.base_url, model)
    }

    fn translate_request(request: &CompletionRequest) -> GeminiRequest {
        let system_instruction = request.system_prompt.as_ref().map(|prompt| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: prompt.clone(),
            }],
        });

        let contents = request
            .messages
            .iter()
            .filter(|msg| !msg.content.is_empty())
            .map(|msg| GeminiContent {
                role: Some(
                    match msg.role {
                        MessageRole::User => "user",
                        MessageRole::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: msg.content.clone(),
                }],
            })
            .collect();

        let (response_mime_type, response_schema) = match &request.response_schema {
            Some(schema) => (
                Some("application/json".to_string()),
                Some(to_gemini_schema(&schema.schema)),
            ),
            None => (None, None),
        };

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: GeminiGenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
                response_mime_type,
                response_schema,
            },
        }
    }

    fn error_for_status(status: u16, body: &str) -> AIError {
        let message = serde_json::from_str::<GeminiErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());

        match status {
            400 => AIError::InvalidRequest(message),
            401 | 403 => AIError::AuthenticationFailed,
            429 => AIError::rate_limited(30),
            500..=599 => AIError::unavailable(format!("Server error {}: {}", status, message)),
            _ => AIError::network(format!("HTTP {}: {}", status, message)),
        }
    }

    fn normalize_response(resp: GeminiResponse, model: String) -> Result<CompletionResponse, AIError> {
        if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AIError::content_filtered(reason));
        }

        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AIError::parse("No candidates in response"))?;

        let finish_reason = match candidate.finish_reason.as_deref() {
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };
        if finish_reason == FinishReason::ContentFilter {
            return Err(AIError::content_filtered(
                candidate.finish_reason.unwrap_or_default(),
            ));
        }

        let content = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let usage = resp
            .usage_metadata
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            usage,
            model,
            finish_reason,
        })
    }
}

/// Rewrites JSON-schema `type` names to the upper-case form Gemini expects.
fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = match (key.as_str(), value) {
                        ("type", Value::String(kind)) => Value::String(kind.to_uppercase()),
                        _ => to_gemini_schema(value),
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

#[async_trait]
impl AIProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        tracing::debug!(
            model = %request.model,
            responder = %request.metadata.responder,
            structured = request.response_schema.is_some(),
            "Sending Gemini completion"
        );

        let body = Self::translate_request(&request);
        let response = self
            .client
            .post(self.generate_url(&request.model))
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AIError::network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::error_for_status(status.as_u16(), &text));
        }

        let parsed: GeminiResponse = serde_json::from_str(&text)
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        Self::normalize_response(parsed, request.model)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", &self.config.model)
    }
}

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionKey;
    use crate::domain::simulation::ListenerReply;
    use crate::ports::RequestMetadata;

    fn request() -> CompletionRequest {
        let key = SessionKey::parse("corp_sim", "test_user", "session_123").unwrap();
        CompletionRequest::new("gemini-1.5-flash", RequestMetadata::new(key, "Listener"))
            .with_system_prompt("You are the Listener")
            .with_message(MessageRole::User, "Our close takes nine days")
            .with_message(MessageRole::Assistant, "Who signs off on tooling?")
    }

    #[test]
    fn translates_roles_and_system_instruction() {
        let body = serde_json::to_value(GeminiProvider::translate_request(&request())).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are the Listener");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert!(body["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn structured_request_sets_json_mime_and_upper_case_schema() {
        let request = request().with_schema_for::<ListenerReply>();
        let body = serde_json::to_value(GeminiProvider::translate_request(&request)).unwrap();

        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["type"], "OBJECT");
        assert_eq!(
            config["responseSchema"]["properties"]["problem_summary"]["type"],
            "OBJECT"
        );
        assert_eq!(
            config["responseSchema"]["properties"]["reply"]["type"],
            "STRING"
        );
    }

    #[test]
    fn normalizes_candidate_text_and_usage() {
        let raw = r#"{
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there"}]}, "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3, "totalTokenCount": 15}
        }"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();

        let completion =
            GeminiProvider::normalize_response(parsed, "gemini-1.5-flash".to_string()).unwrap();

        assert_eq!(completion.content, "Hello there");
        assert_eq!(completion.usage.total_tokens, 15);
        assert_eq!(completion.finish_reason, FinishReason::Stop);
    }

    #[test]
    fn safety_stop_is_content_filtered() {
        let raw = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();

        let err = GeminiProvider::normalize_response(parsed, "m".to_string()).unwrap_err();
        assert!(matches!(err, AIError::ContentFiltered { .. }));
    }

    #[test]
    fn blocked_prompt_is_content_filtered() {
        let raw = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();

        let err = GeminiProvider::normalize_response(parsed, "m".to_string()).unwrap_err();
        assert_eq!(err, AIError::content_filtered("SAFETY"));
    }

    #[test]
    fn no_candidates_is_parse_error() {
        let parsed: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            GeminiProvider::normalize_response(parsed, "m".to_string()),
            Err(AIError::Parse(_))
        ));
    }

    #[test]
    fn status_mapping_uses_error_message() {
        let body = r#"{"error": {"code": 400, "message": "Invalid JSON payload", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(
            GeminiProvider::error_for_status(400, body),
            AIError::InvalidRequest("Invalid JSON payload".to_string())
        );
        assert_eq!(
            GeminiProvider::error_for_status(403, ""),
            AIError::AuthenticationFailed
        );
        assert!(GeminiProvider::error_for_status(429, "").is_retryable());
        assert!(GeminiProvider::error_for_status(503, "overloaded").is_retryable());
    }

    #[test]
    fn generate_url_includes_model() {
        let provider = GeminiProvider::new(
            GeminiConfig::new("key").with_base_url("http://localhost:8080/v1beta/"),
        )
        .unwrap();
        assert_eq!(
            provider.generate_url("gemini-1.5-flash"),
            "http://localhost:8080/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(provider.provider_info().name, "gemini");
    }
}
