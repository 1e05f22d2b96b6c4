//! Ollama HTTP API integration.
//!
//! Uses two endpoints:
//! - `GET /api/tags` to list pulled models
//! - `POST /api/chat` (non-streaming) to generate one completion

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{ServiceError, TextGenerator};

pub const DEFAULT_HOST: &str = "http://localhost:11434";
const HOST_ENV: &str = "OLLAMA_HOST";

pub struct OllamaClient {
    client: Client,
    host: String,
    temperature: Option<f64>,
}

impl OllamaClient {
    pub fn new(host: &str, temperature: Option<f64>) -> Result<Self, ServiceError> {
        // Generation on small local models can take minutes; no request timeout.
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| ServiceError::InvalidResponse(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            host: normalize_host(host),
            temperature,
        })
    }

    /// Resolve the host from an explicit value, else `OLLAMA_HOST` (`.env` included),
    /// else the local default.
    pub fn from_env(host: Option<&str>, temperature: Option<f64>) -> Result<Self, ServiceError> {
        dotenvy::dotenv().ok();
        let host = match host {
            Some(h) => h.to_string(),
            None => std::env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string()),
        };
        Self::new(&host, temperature)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn unavailable(&self, err: reqwest::Error) -> ServiceError {
        ServiceError::ServiceUnavailable {
            host: self.host.clone(),
            reason: err.to_string(),
        }
    }
}

impl TextGenerator for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn available_models(&self) -> Result<Vec<String>, ServiceError> {
        let url = format!("{}/api/tags", self.host);
        let resp = self.client.get(&url).send().map_err(|e| self.unavailable(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ServiceError::InvalidResponse(format!(
                "listing models failed with status {status}: {}",
                error_message(&body)
            )));
        }

        let tags: TagsResponse = resp
            .json()
            .map_err(|e| ServiceError::InvalidResponse(format!("Failed to parse model list: {e}")))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn generate(&mut self, model: &str, prompt: &str) -> Result<String, ServiceError> {
        let url = format!("{}/api/chat", self.host);
        let body = chat_request(model, prompt, self.temperature);

        tracing::debug!(model, prompt_chars = prompt.len(), "sending chat request");
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.unavailable(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(classify_failure(model, status, &text));
        }

        let chat: ChatResponse = resp
            .json()
            .map_err(|e| ServiceError::InvalidResponse(format!("Failed to parse chat response: {e}")))?;
        Ok(chat.message.content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

fn chat_request<'a>(model: &'a str, prompt: &str, temperature: Option<f64>) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        stream: false,
        options: temperature.map(|temperature| ChatOptions { temperature }),
    }
}

/// Add a scheme when missing and drop trailing slashes.
fn normalize_host(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

/// Extract `{"error": "..."}` from a failure body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn classify_failure(model: &str, status: StatusCode, body: &str) -> ServiceError {
    let message = error_message(body);
    if status == StatusCode::NOT_FOUND || message.to_lowercase().contains("not found") {
        return ServiceError::ModelNotFound {
            model: model.to_string(),
        };
    }
    ServiceError::InvalidResponse(format!("chat request failed with status {status}: {message}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosts_are_normalized() {
        assert_eq!(normalize_host("localhost:11434"), "http://localhost:11434");
        assert_eq!(normalize_host("http://10.0.0.2:11434/"), "http://10.0.0.2:11434");
        assert_eq!(normalize_host(" https://llm.local "), "https://llm.local");
    }

    #[test]
    fn chat_request_shape() {
        let json = serde_json::to_value(chat_request("gemma3:1b", "hi", None)).unwrap();
        assert_eq!(json["model"], "gemma3:1b");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert!(json.get("options").is_none());

        let json = serde_json::to_value(chat_request("m", "p", Some(0.7))).unwrap();
        assert_eq!(json["options"]["temperature"], 0.7);
    }

    #[test]
    fn chat_response_parses_message_content() {
        let body = r#"{"model":"m","message":{"role":"assistant","content":"Hello"},"done":true}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message.content, "Hello");
    }

    #[test]
    fn tags_response_lists_names() {
        let body = r#"{"models":[{"name":"gemma3:1b","size":1},{"name":"qwen3:0.6b"}]}"#;
        let parsed: TagsResponse = serde_json::from_str(body).unwrap();
        let names: Vec<String> = parsed.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["gemma3:1b", "qwen3:0.6b"]);
    }

    #[test]
    fn failures_are_classified() {
        let body = r#"{"error":"model 'x' not found, try pulling it first"}"#;
        assert_eq!(
            classify_failure("x", StatusCode::NOT_FOUND, body),
            ServiceError::ModelNotFound { model: "x".to_string() }
        );
        assert_eq!(
            classify_failure("x", StatusCode::BAD_REQUEST, body),
            ServiceError::ModelNotFound { model: "x".to_string() }
        );
        match classify_failure("x", StatusCode::INTERNAL_SERVER_ERROR, "boom") {
            ServiceError::InvalidResponse(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("boom"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unreachable_host_is_service_unavailable() {
        // Port 1 on loopback is not served in test environments.
        let client = OllamaClient::new("http://127.0.0.1:1", None).unwrap();
        let err = client.available_models().unwrap_err();
        assert!(matches!(err, ServiceError::ServiceUnavailable { .. }));
    }
}
