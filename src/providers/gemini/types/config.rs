use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::providers::http::HttpConfig;

/// Default endpoint of the Generative Language API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini-specific configuration parameters
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key for authentication
    pub api_key: SecretString,
    /// Base URL for the Gemini API
    pub base_url: String,
    /// HTTP configuration (timeout, proxy, user agent)
    pub http_config: HttpConfig,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("http_config", &self.http_config)
            .finish()
    }
}

impl GeminiConfig {
    /// Create a new Gemini configuration with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            http_config: HttpConfig::default(),
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set HTTP timeout
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.timeout = Some(timeout);
        self
    }

    /// Route every request through `proxy`
    ///
    /// An empty string disables proxying altogether, including the
    /// `HTTP_PROXY`/`HTTPS_PROXY` environment variables.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.http_config.proxy = Some(proxy.into().trim().to_string());
        self
    }

    /// Set HTTP config wholesale
    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http_config = http;
        self
    }

    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// `{base}/models/{model}:{method}` with trailing slashes trimmed
    pub(crate) fn method_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.base_url.trim_end_matches('/'),
            model,
            method
        )
    }
}
