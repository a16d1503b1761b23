//! Gemini Client Implementation
//!
//! Thin HTTP client over `generateContent` and `streamGenerateContent`.

use reqwest::Client as HttpClient;

use crate::error::{NodeError, Result};
use crate::providers::http::build_http_client;

use super::streaming::{self, ResponseStream};
use super::types::{ApiErrorResponse, GeminiConfig, GenerateContentRequest, GenerateContentResponse};

/// Gemini client bound to one API key and one transport configuration
#[derive(Debug, Clone)]
pub struct GeminiClient {
    /// HTTP client for making requests
    http_client: HttpClient,
    /// Gemini configuration
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client with the given configuration
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http_client = build_http_client(&config.http_config)?;
        Ok(Self::with_http_client(config, http_client))
    }

    /// Create a new Gemini client with a custom HTTP client
    pub fn with_http_client(config: GeminiConfig, http_client: HttpClient) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// `POST models/{model}:generateContent`
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.config.method_url(model, "generateContent");
        let response = self.post(&url, request).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| NodeError::Parse(format!("Failed to parse Gemini response: {e}")))
    }

    /// `POST models/{model}:streamGenerateContent?alt=sse`
    pub async fn stream_generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<ResponseStream> {
        let url = format!(
            "{}?alt=sse",
            self.config.method_url(model, "streamGenerateContent")
        );
        let response = self.post(&url, request).await?;
        Ok(streaming::into_response_stream(response))
    }

    async fn post(&self, url: &str, request: &GenerateContentRequest) -> Result<reqwest::Response> {
        tracing::debug!(url, "sending Gemini request");
        let response = self
            .http_client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", self.config.api_key())
            .json(request)
            .send()
            .await
            .map_err(|e| NodeError::Http(format!("Request failed: {e}")))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(map_api_error(status.as_u16(), &error_text))
    }
}

/// Map a non-2xx body to `VendorCall`, preferring the API's own message
pub fn map_api_error(status: u16, body: &str) -> NodeError {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => {
            let message = match parsed.error.status {
                Some(code) => format!("{} ({code})", parsed.error.message),
                None => parsed.error.message,
            };
            NodeError::vendor(parsed.error.code.unwrap_or(status), message)
        }
        _ => NodeError::vendor(status, format!("Gemini API error {status}: {}", body.trim())),
    }
}
