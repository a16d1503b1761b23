//! HTTP client construction shared by provider clients

use std::time::Duration;

use crate::error::{NodeError, Result};

/// Transport options for one provider client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Option<Duration>,
    /// Connection timeout
    pub connect_timeout: Option<Duration>,
    /// Proxy URL applied to every scheme
    pub proxy: Option<String>,
    /// User agent
    pub user_agent: Option<String>,
}

/// Build a `reqwest::Client` from `HttpConfig`
///
/// The proxy is attached to this client only; process environment is left
/// untouched.
pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }

    match config.proxy.as_deref().map(str::trim) {
        Some(proxy_url) if !proxy_url.is_empty() => {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| NodeError::Configuration(format!("Invalid proxy URL: {e}")))?;
            builder = builder.proxy(proxy);
        }
        // An explicit empty proxy also opts out of system proxy detection.
        Some(_) => builder = builder.no_proxy(),
        None => {}
    }

    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent);
    }

    builder
        .build()
        .map_err(|e| NodeError::Http(format!("Failed to create HTTP client: {e}")))
}
