//! Google Gemini provider
//!
//! - `types`: wire structs (camelCase JSON)
//! - `convert`: request parts and options to wire structs
//! - `client`: HTTP calls with per-client proxy
//! - `streaming`: SSE chunk parsing

pub mod client;
pub mod convert;
pub mod streaming;
pub mod types;

pub use client::GeminiClient;
pub use types::{GeminiConfig, GenerateContentRequest, GenerateContentResponse};
