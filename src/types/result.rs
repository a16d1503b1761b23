//! Result-side types

use std::fmt;

/// Outcome of a single generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    /// Generated text
    Text(String),
    /// Inline media bytes returned by the model
    ImageBytes(Vec<u8>),
    /// The call failed; the reason is host-displayable
    Error(String),
}

impl GenerationResult {
    /// Prefix used when an error is rendered as the node's text output
    pub const ERROR_PREFIX: &'static str = "Error: ";

    /// Render as the string a text-output node returns
    pub fn into_output_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::ImageBytes(bytes) => format!("<{} bytes of inline media>", bytes.len()),
            Self::Error(reason) => format!("{}{reason}", Self::ERROR_PREFIX),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Status code returned next to an edited image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum EditStatus {
    /// The model returned edited media
    Success = 0,
    /// The vendor call failed
    VendorCallFailed = 1,
    /// A candidate came back without content parts
    NoParts = 2,
    /// No candidate contained usable media
    NoUsableCandidate = 3,
}

impl EditStatus {
    /// Integer code handed to the host
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for EditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::VendorCallFailed => "vendor call failed",
            Self::NoParts => "response had no parts",
            Self::NoUsableCandidate => "no candidate contained usable content",
        };
        write!(f, "{} ({label})", self.code())
    }
}
