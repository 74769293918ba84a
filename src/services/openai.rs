use serde::{Deserialize, Serialize};

use crate::services::completion::{BackendError, CompletionBackend, CompletionRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: Option<String>,
}

/// OpenAI-compatible chat completions client. Works against any endpoint
/// speaking the `/chat/completions` dialect (OpenAI, OpenRouter, ...).
pub struct OpenAiService {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiService {
    pub fn new(api_key: Option<String>, model: String, base_url: String) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_chat_request(&self, request: CompletionRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait::async_trait]
impl CompletionBackend for OpenAiService {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BackendError> {
        let api_key = self.api_key.as_deref().ok_or(BackendError::MissingCredential)?;
        let chat_request = self.build_chat_request(request);

        log::info!("🤖 Sending request to {} with model: {}", self.endpoint(), self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "Meal Parser")
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| {
                log::error!("❌ Completion request failed: {}", e);
                BackendError::Transport(e.to_string())
            })?;

        let status = response.status();
        log::debug!("📥 Completion response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Completion API error ({}): {}", status, error_text);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        log::debug!("📄 Raw completion response size: {} bytes", response_text.len());

        content_from_envelope(&response_text)
    }
}

fn content_from_envelope(body: &str) -> Result<String, BackendError> {
    let chat_response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::MalformedEnvelope(e.to_string()))?;

    chat_response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| BackendError::MalformedEnvelope("no choices[0].message.content".to_string()))
}
