//! Shared helpers for integration tests: mock-server settings, credential
//! files and Gemini response bodies

#![allow(dead_code)]

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gemini_nodes::credentials::{CredentialStore, Credentials};
use gemini_nodes::media::{ImageFormat, image_tensor_to_bytes};
use gemini_nodes::prelude::*;
use serde_json::{Value, json};

pub const TEST_KEY: &str = "test-api-key";

/// Settings pointing at `base_url` with a credential file inside `dir`
pub fn settings(base_url: &str, dir: &Path) -> NodeSettings {
    NodeSettings::default()
        .with_base_url(base_url)
        .with_credentials_path(dir.join("config.json"))
}

/// Same as [`settings`] with a usable key already on disk
pub fn settings_with_key(base_url: &str, dir: &Path) -> NodeSettings {
    let settings = settings(base_url, dir);
    CredentialStore::new(&settings.credentials_path)
        .save(&Credentials::new(TEST_KEY, ""))
        .expect("write credentials");
    settings
}

pub fn text_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 2, "totalTokenCount": 6}
    })
}

pub fn png_base64(tensor: &ImageTensor) -> String {
    STANDARD.encode(image_tensor_to_bytes(tensor, ImageFormat::Png).expect("encode png"))
}

pub fn image_body(tensor: &ImageTensor) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [
                {"text": "Here is the edited image."},
                {"inlineData": {"mimeType": "image/png", "data": png_base64(tensor)}}
            ]},
            "finishReason": "STOP"
        }]
    })
}

/// Serialize JSON chunks as an SSE body
pub fn sse_body(chunks: &[Value]) -> String {
    chunks
        .iter()
        .map(|chunk| format!("data: {chunk}\r\n\r\n"))
        .collect()
}

/// Load a fixture from `tests/fixtures`
pub fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("read fixture {}: {e}", path.display()))
}
