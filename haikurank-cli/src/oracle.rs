/// Judge backends: a local Ollama server or the hosted Anthropic API.
///
/// Both are the same capability to the rest of the program: send a system
/// message plus one user prompt, get text back. Which one is used is decided
/// once, from the model name, in `build_oracle`.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;

/// Model names with this prefix go to the hosted API.
const HOSTED_MODEL_PREFIX: &str = "claude-";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const HOSTED_MAX_TOKENS: u32 = 512;

#[async_trait]
pub trait Oracle: Send + Sync {
    /// Human-readable backend name for logs.
    fn label(&self) -> String;

    /// Submit one prompt and return the raw response text.
    async fn submit(&self, system: &str, prompt: &str) -> Result<String, OracleError>;
}

/// Connection settings for both backends.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub model: String,
    pub ollama_url: String,
    pub anthropic_url: String,
    pub api_key: Option<String>,
}

pub fn is_hosted_model(model: &str) -> bool {
    model.starts_with(HOSTED_MODEL_PREFIX)
}

/// Pick the backend for `config.model`.
pub fn build_oracle(client: Client, config: &OracleConfig) -> Result<Box<dyn Oracle>, OracleError> {
    if is_hosted_model(&config.model) {
        let api_key = config
            .api_key
            .clone()
            .ok_or(OracleError::MissingApiKey { backend: "anthropic" })?;
        Ok(Box::new(AnthropicOracle {
            client,
            base_url: config.anthropic_url.clone(),
            model: config.model.clone(),
            api_key,
        }))
    } else {
        Ok(Box::new(OllamaOracle {
            client,
            base_url: config.ollama_url.clone(),
            model: config.model.clone(),
        }))
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Read the body of a non-2xx response into an error, truncated for logs.
async fn status_error(resp: reqwest::Response) -> OracleError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    OracleError::Status {
        status,
        body: body.chars().take(200).collect(),
    }
}

// ---------------------------------------------------------------------------
// Ollama
// ---------------------------------------------------------------------------

pub struct OllamaOracle {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaMessage>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: Option<String>,
}

#[async_trait]
impl Oracle for OllamaOracle {
    fn label(&self) -> String {
        format!("{} (local Ollama)", self.model)
    }

    async fn submit(&self, system: &str, prompt: &str) -> Result<String, OracleError> {
        let request = OllamaChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            stream: false,
            format: "json",
        };

        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        let resp = self.client.post(&url).json(&request).send().await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        let data: OllamaChatResponse = resp.json().await?;
        data.message
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(OracleError::EmptyResponse)
    }
}

// ---------------------------------------------------------------------------
// Anthropic
// ---------------------------------------------------------------------------

pub struct AnthropicOracle {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[async_trait]
impl Oracle for AnthropicOracle {
    fn label(&self) -> String {
        format!("{} (Anthropic API)", self.model)
    }

    async fn submit(&self, system: &str, prompt: &str) -> Result<String, OracleError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: HOSTED_MAX_TOKENS,
            system,
            messages: vec![ChatMessage { role: "user", content: prompt }],
        };

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        let data: MessagesResponse = resp.json().await?;
        data.content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or(OracleError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(model: &str, api_key: Option<&str>) -> OracleConfig {
        OracleConfig {
            model: model.to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            anthropic_url: "https://api.anthropic.com".to_string(),
            api_key: api_key.map(str::to_string),
        }
    }

    #[test]
    fn test_backend_selected_by_model_name() {
        let local = build_oracle(Client::new(), &config("llama3.1", None)).unwrap();
        assert!(local.label().contains("Ollama"));

        let hosted = build_oracle(Client::new(), &config("claude-haiku-4-5", Some("key"))).unwrap();
        assert!(hosted.label().contains("Anthropic"));
    }

    #[test]
    fn test_hosted_backend_needs_key() {
        let result = build_oracle(Client::new(), &config("claude-haiku-4-5", None));
        assert!(matches!(result, Err(OracleError::MissingApiKey { .. })));
    }

    #[test]
    fn test_ollama_request_shape() {
        let request = OllamaChatRequest {
            model: "llama3.1",
            messages: vec![
                ChatMessage { role: "system", content: "sys" },
                ChatMessage { role: "user", content: "prompt" },
            ],
            stream: false,
            format: "json",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["format"], "json");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "prompt");
    }

    #[test]
    fn test_anthropic_response_text_extraction() {
        let raw = r#"{"content": [{"type": "text", "text": "{\"winner\": \"a\"}"}], "stop_reason": "end_turn"}"#;
        let data: MessagesResponse = serde_json::from_str(raw).unwrap();
        let text = data.content.into_iter().find(|b| b.kind == "text").and_then(|b| b.text);
        assert_eq!(text.as_deref(), Some("{\"winner\": \"a\"}"));
    }
}
