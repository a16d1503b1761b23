//! Type Conversions for NodeError

use super::NodeError;

impl From<reqwest::Error> for NodeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<std::io::Error> for NodeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<image::ImageError> for NodeError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageCodec(err.to_string())
    }
}

impl From<hound::Error> for NodeError {
    fn from(err: hound::Error) -> Self {
        Self::AudioCodec(err.to_string())
    }
}

impl From<base64::DecodeError> for NodeError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Parse(format!("Invalid base64 payload: {err}"))
    }
}
