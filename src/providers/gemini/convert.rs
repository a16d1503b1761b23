//! Gemini request conversion helpers (pure functions)
//!
//! These helpers convert request parts and generation options into
//! Gemini's typed request structures without performing HTTP calls.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::types::{GenerationOptions, RequestPart};

use super::types::{
    Content, GenerateContentRequest, GenerationConfig, HarmCategory, Part, SafetySetting,
};

/// Convert one `RequestPart` to a Gemini `Part` (media inlined as base64)
pub fn convert_part(part: &RequestPart) -> Part {
    match part {
        RequestPart::Text(text) => Part::text(text.clone()),
        RequestPart::ImageBytes { data, mime_type }
        | RequestPart::AudioBytes { data, mime_type } => {
            Part::inline(mime_type.clone(), STANDARD.encode(data))
        }
    }
}

/// Map `GenerationOptions` to the wire generation config
pub fn convert_generation_config(options: &GenerationOptions) -> GenerationConfig {
    GenerationConfig {
        max_output_tokens: options.max_output_tokens,
        temperature: options.temperature,
        top_p: options.top_p,
        top_k: options.top_k,
        seed: options.seed,
        response_modalities: (!options.response_modalities.is_empty())
            .then(|| options.response_modalities.clone()),
    }
}

/// One setting per harm category, all at the same threshold
pub fn convert_safety_settings(options: &GenerationOptions) -> Option<Vec<SafetySetting>> {
    let threshold = options.safety_threshold?;
    Some(
        HarmCategory::ALL
            .iter()
            .map(|&category| SafetySetting {
                category,
                threshold,
            })
            .collect(),
    )
}

/// Build a single-turn request from ordered parts
pub fn build_request(parts: &[RequestPart], options: &GenerationOptions) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(parts.iter().map(convert_part).collect())],
        safety_settings: convert_safety_settings(options),
        generation_config: Some(convert_generation_config(options)),
    }
}
