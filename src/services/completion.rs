use thiserror::Error;

/// A single system + user turn sent to a text-generation backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend credential is not configured")]
    MissingCredential,

    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend response had no completion text: {0}")]
    MalformedEnvelope(String),
}

/// Trait for text-generation backends (OpenAI, OpenRouter, etc.)
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the completion text. One outbound call, never retried.
    async fn complete(&self, request: CompletionRequest) -> Result<String, BackendError>;
}
