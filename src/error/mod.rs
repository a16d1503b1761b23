//! Error Handling Module
//!
//! Every node operation returns `Result<T, NodeError>`. Errors fall into two
//! groups that the nodes treat differently:
//!
//! - user-configuration errors (`MissingCredential`, `MissingInput`,
//!   malformed tensors) abort the invocation;
//! - vendor failures (`VendorCall`, `Http`, `EmptyResponse`, ...) degrade to
//!   a fallback payload (original image + status code, or an `"Error: "`
//!   string).
//!
//! ```rust,ignore
//! use gemini_nodes::error::{ErrorCategory, NodeError};
//!
//! let error = NodeError::vendor(401, "API key not valid");
//! assert_eq!(error.category(), ErrorCategory::Vendor);
//! assert!(error.is_vendor_failure());
//! ```

mod conversions;

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, NodeError>;

/// Errors produced by the marshaling pipeline and the Gemini client
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    /// No API key is configured at all
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// The selected modality's payload was not supplied
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Image tensor has the wrong rank or channel count
    #[error("Invalid tensor shape: {0}")]
    InvalidShape(String),

    /// Audio waveform has an unrecognized channel layout
    #[error("Unsupported audio shape: {0}")]
    UnsupportedAudioShape(String),

    /// The vendor API answered with an error status
    #[error("API error {code}: {message}")]
    VendorCall {
        /// HTTP status code
        code: u16,
        /// Error message reported by the API
        message: String,
    },

    /// Transport-level failure (connect, TLS, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response carried no usable content
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// Invalid client or node configuration (bad proxy URL, header, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Filesystem failure while reading or writing the credential file
    #[error("IO error: {0}")]
    Io(String),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(String),

    /// Image encode/decode failure
    #[error("Image codec error: {0}")]
    ImageCodec(String),

    /// WAV encode or resampling failure
    #[error("Audio codec error: {0}")]
    AudioCodec(String),

    /// Malformed vendor payload (bad base64, unparsable stream chunk)
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Coarse classification used by the nodes to pick a degradation path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller must fix its inputs or credentials
    UserConfiguration,
    /// Local media conversion failed
    Media,
    /// The remote call failed or returned nothing usable
    Vendor,
    /// Local environment (filesystem, serialization)
    Internal,
}

impl NodeError {
    /// Build a `VendorCall` error
    pub fn vendor(code: u16, message: impl Into<String>) -> Self {
        Self::VendorCall {
            code,
            message: message.into(),
        }
    }

    /// Classify the error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingCredential(_) | Self::MissingInput(_) | Self::Configuration(_) => {
                ErrorCategory::UserConfiguration
            }
            Self::InvalidShape(_)
            | Self::UnsupportedAudioShape(_)
            | Self::ImageCodec(_)
            | Self::AudioCodec(_) => ErrorCategory::Media,
            Self::VendorCall { .. } | Self::Http(_) | Self::EmptyResponse(_) | Self::Parse(_) => {
                ErrorCategory::Vendor
            }
            Self::Io(_) | Self::Json(_) => ErrorCategory::Internal,
        }
    }

    /// Whether a node should degrade gracefully instead of aborting
    pub fn is_vendor_failure(&self) -> bool {
        self.category() == ErrorCategory::Vendor
    }

    /// HTTP status code, when the error came from the API
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::VendorCall { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Message without the variant prefix, for host-facing strings
    pub fn user_message(&self) -> String {
        match self {
            Self::VendorCall { message, .. } => message.clone(),
            Self::MissingCredential(m)
            | Self::MissingInput(m)
            | Self::InvalidShape(m)
            | Self::UnsupportedAudioShape(m)
            | Self::Http(m)
            | Self::EmptyResponse(m)
            | Self::Configuration(m)
            | Self::Io(m)
            | Self::Json(m)
            | Self::ImageCodec(m)
            | Self::AudioCodec(m)
            | Self::Parse(m) => m.clone(),
        }
    }
}
