//! Gemini API types (split by concern)

mod config;
mod content;
mod generation;

pub use config::{DEFAULT_BASE_URL, GeminiConfig};
pub use content::{
    ApiErrorBody, ApiErrorResponse, Blob, Candidate, Content, HarmCategory, Part, SafetySetting,
};
pub use generation::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, PromptFeedback,
    UsageMetadata,
};
