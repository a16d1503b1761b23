//! Request-side types: modalities, node inputs and request parts

use std::fmt;
use std::str::FromStr;

use super::tensor::{AudioContainer, ImageTensor};
use crate::error::NodeError;

/// One element of an ordered request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPart {
    /// Plain text segment
    Text(String),
    /// Encoded image
    ImageBytes {
        /// Encoded bytes (PNG/JPEG)
        data: Vec<u8>,
        /// MIME type, e.g. `image/png`
        mime_type: String,
    },
    /// Encoded audio
    AudioBytes {
        /// Encoded bytes (WAV)
        data: Vec<u8>,
        /// MIME type, e.g. `audio/wav`
        mime_type: String,
    },
}

impl RequestPart {
    /// Text part
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Image part
    pub fn image(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self::ImageBytes {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Audio part
    pub fn audio(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self::AudioBytes {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Text content, if this is a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this part carries binary media
    pub fn is_media(&self) -> bool {
        !matches!(self, Self::Text(_))
    }
}

/// Kind of media a request carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    Text,
    Image,
    Video,
    Audio,
}

impl Modality {
    /// Host-facing identifier
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    /// All modalities in the order the host lists them
    pub const ALL: [Modality; 4] = [Self::Text, Self::Image, Self::Video, Self::Audio];
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            other => Err(NodeError::Configuration(format!(
                "Unknown input type '{other}'. Valid options: text, image, video, audio"
            ))),
        }
    }
}

/// Modality-specific payloads supplied by the host; all optional
#[derive(Debug, Clone, Default)]
pub struct ModalityInput {
    /// Extra text appended after the prompt (text modality)
    pub text: Option<String>,
    /// Image batch; the first frame is used (image modality)
    pub image: Option<ImageTensor>,
    /// Frame sequence (video modality)
    pub video: Option<ImageTensor>,
    /// Audio waveform (audio modality)
    pub audio: Option<AudioContainer>,
}

impl ModalityInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_image(mut self, image: ImageTensor) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_video(mut self, video: ImageTensor) -> Self {
        self.video = Some(video);
        self
    }

    pub fn with_audio(mut self, audio: AudioContainer) -> Self {
        self.audio = Some(audio);
        self
    }
}
