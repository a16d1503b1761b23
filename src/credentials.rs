//! Persisted API credentials
//!
//! A small JSON file `{ "GEMINI_API_KEY": ..., "PROXY": ... }` that lives
//! next to the plugin. Reading and writing are explicit calls; nothing here
//! runs at construction time.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::Result;

/// Placeholder written into a fresh credential file
pub const PLACEHOLDER_API_KEY: &str = "your key";

/// Default file name, resolved relative to the working directory
pub const DEFAULT_CREDENTIALS_FILE: &str = "config.json";

/// API key and optional proxy address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "GEMINI_API_KEY", default)]
    pub api_key: String,
    /// Empty means "no proxy"
    #[serde(rename = "PROXY", default)]
    pub proxy: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, proxy: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            proxy: proxy.into(),
        }
    }

    /// Values written into a freshly created file
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_API_KEY, "")
    }

    /// A key that is neither empty nor the placeholder
    pub fn has_usable_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY
    }
}

/// JSON-file backed credential storage
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file, recreating it with placeholders when it is missing,
    /// empty or unparsable
    pub fn load_or_init(&self) -> Result<Credentials> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if !contents.trim().is_empty() => {
                match serde_json::from_str::<Credentials>(&contents) {
                    Ok(credentials) => return Ok(credentials),
                    Err(e) => tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "credential file unparsable, rewriting with placeholders"
                    ),
                }
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let credentials = Credentials::placeholder();
        self.save(&credentials)?;
        tracing::info!(path = %self.path.display(), "created credential file");
        Ok(credentials)
    }

    /// Overwrite the file with 4-space indented JSON
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        credentials.serialize(&mut serializer)?;

        std::fs::write(&self.path, buffer)?;
        tracing::debug!(path = %self.path.display(), "saved credentials");
        Ok(())
    }
}
