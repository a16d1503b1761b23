//! # gemini-nodes
//!
//! Processing core for Gemini-backed nodes in a node-graph authoring tool:
//! image editing, streamed image generation, and multimodal text generation
//! over text, image, video and audio inputs.
//!
//! ## Pipeline
//!
//! - **Media**: image tensors to PNG/JPEG and back, longest-side resizing,
//!   audio to mono 16 kHz WAV, video frame sampling.
//! - **Payload**: prompt + modality + payload to ordered request parts.
//! - **Dispatcher**: credentials, per-client proxy, one call per invocation.
//! - **Unmarshal**: text or inline media out of the response, with the
//!   0/1/2/3 status taxonomy for image edits.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gemini_nodes::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), NodeError> {
//!     let _guard = gemini_nodes::telemetry::init_from_env()?;
//!
//!     let mut node = GeminiFlash::new(NodeSettings::from_env()?)?;
//!     let request = FlashRequest::new("Write a haiku about rust", Modality::Text)
//!         .with_api_key("your-api-key");
//!     println!("{}", node.generate(&request).await?);
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod media;
pub mod nodes;
pub mod payload;
pub mod providers;
pub mod telemetry;
pub mod types;
pub mod unmarshal;

pub use error::{NodeError, Result};

/// Commonly used items
pub mod prelude {
    pub use crate::config::NodeSettings;
    pub use crate::credentials::{CredentialStore, Credentials};
    pub use crate::dispatcher::{BackendFactory, GenerationBackend, RequestDispatcher};
    pub use crate::error::{ErrorCategory, NodeError};
    pub use crate::nodes::{
        FlashRequest, GeminiFlash, GeminiImageEditor, GeminiImageGenerator, ImageGeneration,
    };
    pub use crate::types::{
        AudioContainer, EditStatus, GenerationOptions, GenerationResult, ImageTensor, Modality,
        ModalityInput, RequestPart,
    };
}
