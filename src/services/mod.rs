pub mod completion; // Text-generation backend seam
pub mod openai; // OpenAI-compatible chat completions

pub use completion::{BackendError, CompletionBackend, CompletionRequest};
pub use openai::OpenAiService;
