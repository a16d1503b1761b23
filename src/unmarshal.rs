//! Response unmarshaling
//!
//! Pulls text or inline media out of a `GenerateContentResponse` and maps
//! image-edit outcomes onto [`EditStatus`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{NodeError, Result};
use crate::media;
use crate::providers::gemini::types::GenerateContentResponse;
use crate::types::{EditStatus, GenerationResult, ImageTensor};

/// Result of scanning a response for inline media
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaLookup {
    /// First inline blob found, already base64-decoded
    Found { data: Vec<u8>, mime_type: String },
    /// A candidate came back without any content parts
    NoParts,
    /// No candidate carried inline media
    NoUsableCandidate,
}

/// Text of the first candidate, thought parts skipped
pub fn first_text(response: &GenerateContentResponse) -> Result<String> {
    let Some(candidate) = response.candidates.first() else {
        let reason = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
            .map_or_else(
                || "response has no candidates".to_string(),
                |r| format!("prompt blocked: {r}"),
            );
        return Err(NodeError::EmptyResponse(reason));
    };

    let text: String = candidate
        .parts()
        .iter()
        .filter(|p| !p.is_thought())
        .filter_map(|p| p.text.as_deref())
        .collect();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .as_deref()
            .map_or_else(|| "no text in first candidate".to_string(), |r| {
                format!("no text in first candidate (finish reason {r})")
            });
        return Err(NodeError::EmptyResponse(reason));
    }
    Ok(text)
}

/// Scan candidates in order for the first inline blob
///
/// A candidate without parts stops the scan with [`MediaLookup::NoParts`].
pub fn find_inline_media(response: &GenerateContentResponse) -> Result<MediaLookup> {
    for candidate in &response.candidates {
        let parts = candidate.parts();
        if parts.is_empty() {
            return Ok(MediaLookup::NoParts);
        }
        if let Some(blob) = parts.iter().find_map(|p| p.inline_data.as_ref()) {
            let data = STANDARD.decode(blob.data.as_bytes())?;
            let mime_type = if blob.mime_type.is_empty() {
                sniff_mime(&data)
            } else {
                blob.mime_type.clone()
            };
            return Ok(MediaLookup::Found { data, mime_type });
        }
    }
    Ok(MediaLookup::NoUsableCandidate)
}

/// MIME type from magic bytes
pub fn sniff_mime(data: &[u8]) -> String {
    infer::get(data)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Collapse a response into one [`GenerationResult`]
///
/// Inline media wins over text; a response with neither becomes `Error`.
pub fn into_generation_result(response: &GenerateContentResponse) -> GenerationResult {
    match find_inline_media(response) {
        Ok(MediaLookup::Found { data, .. }) => return GenerationResult::ImageBytes(data),
        Ok(_) => {}
        Err(e) => return GenerationResult::Error(e.to_string()),
    }
    match first_text(response) {
        Ok(text) => GenerationResult::Text(text),
        Err(e) => GenerationResult::Error(e.to_string()),
    }
}

/// Edited image and status for an image-editing response
///
/// Anything short of decodable inline media hands back `original`.
pub fn edited_image(
    response: &GenerateContentResponse,
    original: &ImageTensor,
) -> (ImageTensor, EditStatus) {
    let lookup = match find_inline_media(response) {
        Ok(lookup) => lookup,
        Err(e) => {
            tracing::warn!(error = %e, "inline media could not be decoded");
            return (original.clone(), EditStatus::NoUsableCandidate);
        }
    };

    match lookup {
        MediaLookup::Found { data, mime_type } => match media::bytes_to_image_tensor(&data) {
            Ok(tensor) => (tensor, EditStatus::Success),
            Err(e) => {
                tracing::warn!(error = %e, mime_type, "returned media is not a decodable image");
                (original.clone(), EditStatus::NoUsableCandidate)
            }
        },
        MediaLookup::NoParts => (original.clone(), EditStatus::NoParts),
        MediaLookup::NoUsableCandidate => (original.clone(), EditStatus::NoUsableCandidate),
    }
}
