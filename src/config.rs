//! Node settings
//!
//! Everything a node needs besides the credentials: endpoint, default model
//! ids, timeout and where the credential file lives. `from_env` reads
//! `GEMINI_*` overrides on top of the defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::credentials::DEFAULT_CREDENTIALS_FILE;
use crate::error::{NodeError, Result};
use crate::providers::gemini::types::DEFAULT_BASE_URL;

pub const BASE_URL_ENV: &str = "GEMINI_BASE_URL";
pub const MODEL_ENV: &str = "GEMINI_MODEL";
pub const IMAGE_MODEL_ENV: &str = "GEMINI_IMAGE_MODEL";
pub const TIMEOUT_ENV: &str = "GEMINI_TIMEOUT_SECS";
pub const CREDENTIALS_PATH_ENV: &str = "GEMINI_CREDENTIALS_PATH";

/// Default model for text and multimodal understanding
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";

/// Default model for image editing and generation
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-exp";

/// Default HTTP timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSettings {
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub timeout: Duration,
    pub credentials_path: PathBuf,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
        }
    }
}

impl NodeSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `GEMINI_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(base_url) = get(BASE_URL_ENV) {
            settings.base_url = base_url;
        }
        if let Some(model) = get(MODEL_ENV) {
            settings.text_model = model;
        }
        if let Some(model) = get(IMAGE_MODEL_ENV) {
            settings.image_model = model;
        }
        if let Some(secs) = get(TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|e| {
                NodeError::Configuration(format!("Invalid {TIMEOUT_ENV} '{secs}': {e}"))
            })?;
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = get(CREDENTIALS_PATH_ENV) {
            settings.credentials_path = PathBuf::from(path);
        }
        Ok(settings)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }
}
