//! HTTP-based guide generator that calls an OpenAI-compatible chat completions API

use crate::generators::{GuideGenerator, RemoteError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f32 = 0.7;

/// Request to the chat completions endpoint
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the chat completions endpoint
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Error envelope returned on non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// OpenAI chat completions generator
pub struct OpenAiGuideGen {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiGuideGen {
    /// Create a generator; `timeout` bounds each remote call
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Pull the human-readable message out of an error body
    fn error_message(status: reqwest::StatusCode, body: &str) -> String {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => envelope.error.message,
            Err(_) => format!("{} {}", status, body.trim()),
        }
    }

    /// Extract the first choice's text
    fn extract_text(response: ChatResponse) -> Result<String, RemoteError> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| RemoteError::new(None, "OpenAI returned an empty response"))
    }
}

#[async_trait]
impl GuideGenerator for OpenAiGuideGen {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, RemoteError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
        };

        tracing::info!("Calling OpenAI chat completions (model={})", self.model);

        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RemoteError::new(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::new(
                Some(status.as_u16()),
                Self::error_message(status, &body),
            ));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            RemoteError::new(None, format!("Failed to parse OpenAI response: {}", e))
        })?;

        Self::extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_envelope() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        let msg = OpenAiGuideGen::error_message(reqwest::StatusCode::UNAUTHORIZED, body);
        assert_eq!(msg, "Incorrect API key provided");
    }

    #[test]
    fn test_error_message_from_plain_body() {
        let msg = OpenAiGuideGen::error_message(reqwest::StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(msg, "502 Bad Gateway upstream down");
    }

    #[test]
    fn test_extract_text() {
        let ok: ChatResponse =
            serde_json::from_str(r##"{"choices":[{"message":{"role":"assistant","content":"# Guide"}}]}"##)
                .unwrap();
        assert_eq!(OpenAiGuideGen::extract_text(ok).unwrap(), "# Guide");

        let empty: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        let err = OpenAiGuideGen::extract_text(empty).unwrap_err();
        assert_eq!(err.status, None);
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![ChatMessage { role: "user", content: "hi" }],
            temperature: TEMPERATURE,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_base_url_is_normalized() {
        let gen = OpenAiGuideGen::new("k", DEFAULT_MODEL, "http://localhost:9/v1/", Duration::from_secs(1))
            .unwrap();
        assert_eq!(gen.url(), "http://localhost:9/v1/chat/completions");
        assert_eq!(gen.model(), "gpt-4o-mini");
    }
}
