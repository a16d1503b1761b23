//! Request dispatch
//!
//! [`RequestDispatcher`] owns the current credentials and the vendor client
//! built from them. The client is only rebuilt (and the credential file only
//! rewritten) when `configure` sees a different key or proxy.
//!
//! The vendor client sits behind [`GenerationBackend`] so tests and hosts can
//! swap the transport; [`GeminiBackendFactory`] builds the real one.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::NodeSettings;
use crate::credentials::{CredentialStore, Credentials};
use crate::error::{NodeError, Result};
use crate::providers::gemini::convert::build_request;
use crate::providers::gemini::streaming::{self, ChunkSelection};
use crate::providers::gemini::{
    GeminiClient, GeminiConfig, GenerateContentRequest, GenerateContentResponse,
};
use crate::types::{GenerationOptions, GenerationResult, RequestPart};
use crate::unmarshal;

/// One configured vendor client
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Non-streaming generation call
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;

    /// Streaming call; resolves to the chunk picked by `selection`
    async fn generate_stream_first(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        selection: ChunkSelection,
    ) -> Result<GenerateContentResponse>;
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        self.generate_content(model, request).await
    }

    async fn generate_stream_first(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        selection: ChunkSelection,
    ) -> Result<GenerateContentResponse> {
        let stream = self.stream_generate_content(model, request).await?;
        streaming::select_chunk(stream, selection).await
    }
}

/// Builds a backend for a given set of credentials
pub trait BackendFactory: Send + Sync {
    fn build(
        &self,
        credentials: &Credentials,
        settings: &NodeSettings,
    ) -> Result<Arc<dyn GenerationBackend>>;
}

/// Factory for [`GeminiClient`] with the proxy applied per client
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiBackendFactory;

impl BackendFactory for GeminiBackendFactory {
    fn build(
        &self,
        credentials: &Credentials,
        settings: &NodeSettings,
    ) -> Result<Arc<dyn GenerationBackend>> {
        let config = GeminiConfig::new(credentials.api_key.trim())
            .with_base_url(settings.base_url.clone())
            .with_timeout(settings.timeout)
            .with_proxy(credentials.proxy.trim());
        Ok(Arc::new(GeminiClient::new(config)?))
    }
}

/// Credentials plus the client bound to them
pub struct RequestDispatcher {
    settings: NodeSettings,
    store: CredentialStore,
    credentials: Credentials,
    factory: Arc<dyn BackendFactory>,
    backend: Option<Arc<dyn GenerationBackend>>,
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("settings", &self.settings)
            .field("store", &self.store)
            .field("has_key", &self.credentials.has_usable_key())
            .field("proxy", &self.credentials.proxy)
            .field("configured", &self.backend.is_some())
            .finish()
    }
}

impl RequestDispatcher {
    /// Load credentials from `settings.credentials_path` and build a Gemini client
    pub fn new(settings: NodeSettings) -> Result<Self> {
        let store = CredentialStore::new(settings.credentials_path.clone());
        Self::with_factory(settings, store, Arc::new(GeminiBackendFactory))
    }

    /// Same as [`new`](Self::new) with an explicit store and backend factory
    pub fn with_factory(
        settings: NodeSettings,
        store: CredentialStore,
        factory: Arc<dyn BackendFactory>,
    ) -> Result<Self> {
        let credentials = store.load_or_init()?;
        let backend = Self::build_backend(factory.as_ref(), &credentials, &settings)?;
        Ok(Self {
            settings,
            store,
            credentials,
            factory,
            backend,
        })
    }

    fn build_backend(
        factory: &dyn BackendFactory,
        credentials: &Credentials,
        settings: &NodeSettings,
    ) -> Result<Option<Arc<dyn GenerationBackend>>> {
        if !credentials.has_usable_key() {
            return Ok(None);
        }
        factory.build(credentials, settings).map(Some)
    }

    pub fn settings(&self) -> &NodeSettings {
        &self.settings
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Whether a usable key is configured
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Apply a key and/or proxy supplied by the host
    ///
    /// An empty `api_key` keeps the stored key; `None` keeps the stored proxy.
    /// When nothing differs, neither the file nor the client is touched.
    /// Returns whether anything changed.
    pub fn configure(&mut self, api_key: &str, proxy: Option<&str>) -> Result<bool> {
        let api_key = api_key.trim();
        let next = Credentials {
            api_key: if api_key.is_empty() {
                self.credentials.api_key.clone()
            } else {
                api_key.to_string()
            },
            proxy: proxy.map_or_else(|| self.credentials.proxy.clone(), |p| p.trim().to_string()),
        };

        if next == self.credentials {
            return Ok(false);
        }

        // Build before persisting so a bad proxy is never written out.
        let backend = Self::build_backend(self.factory.as_ref(), &next, &self.settings)?;
        self.store.save(&next)?;
        tracing::info!(
            key_changed = next.api_key != self.credentials.api_key,
            proxy_changed = next.proxy != self.credentials.proxy,
            proxy_enabled = !next.proxy.is_empty(),
            "credentials updated"
        );
        self.credentials = next;
        self.backend = backend;
        Ok(true)
    }

    fn backend(&self) -> Result<Arc<dyn GenerationBackend>> {
        self.backend.clone().ok_or_else(|| {
            NodeError::MissingCredential(format!(
                "no Gemini API key configured; set GEMINI_API_KEY in {} or pass api_key",
                self.store.path().display()
            ))
        })
    }

    /// Raw non-streaming call
    pub async fn send(
        &self,
        parts: &[RequestPart],
        model: &str,
        options: &GenerationOptions,
    ) -> Result<GenerateContentResponse> {
        let backend = self.backend()?;
        let request = build_request(parts, options);
        let span = tracing::info_span!(
            "gemini_request",
            request_id = %Uuid::new_v4(),
            model,
            stream = false
        );
        async move {
            tracing::debug!(parts = parts.len(), "dispatching");
            let result = backend.generate(model, &request).await;
            log_outcome(&result);
            result
        }
        .instrument(span)
        .await
    }

    /// Raw streaming call returning the first usable chunk
    pub async fn send_stream_first(
        &self,
        parts: &[RequestPart],
        model: &str,
        options: &GenerationOptions,
    ) -> Result<GenerateContentResponse> {
        self.send_stream(parts, model, options, ChunkSelection::FirstUsable)
            .await
    }

    /// Raw streaming call that reads past text-only chunks to the first
    /// inline media, falling back to the first text chunk
    pub async fn send_stream_media(
        &self,
        parts: &[RequestPart],
        model: &str,
        options: &GenerationOptions,
    ) -> Result<GenerateContentResponse> {
        self.send_stream(parts, model, options, ChunkSelection::PreferMedia)
            .await
    }

    async fn send_stream(
        &self,
        parts: &[RequestPart],
        model: &str,
        options: &GenerationOptions,
        selection: ChunkSelection,
    ) -> Result<GenerateContentResponse> {
        let backend = self.backend()?;
        let request = build_request(parts, options);
        let span = tracing::info_span!(
            "gemini_request",
            request_id = %Uuid::new_v4(),
            model,
            stream = true,
            ?selection
        );
        async move {
            tracing::debug!(parts = parts.len(), "dispatching");
            let result = backend
                .generate_stream_first(model, &request, selection)
                .await;
            log_outcome(&result);
            result
        }
        .instrument(span)
        .await
    }

    /// Generate and collapse into a [`GenerationResult`]
    ///
    /// Vendor failures come back as `GenerationResult::Error`; only local
    /// problems such as a missing key are returned as `Err`.
    pub async fn dispatch(
        &self,
        parts: &[RequestPart],
        model: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResult> {
        degrade(self.send(parts, model, options).await)
    }

    /// Streaming counterpart of [`dispatch`](Self::dispatch)
    pub async fn dispatch_stream(
        &self,
        parts: &[RequestPart],
        model: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResult> {
        degrade(self.send_stream_first(parts, model, options).await)
    }
}

fn log_outcome(result: &Result<GenerateContentResponse>) {
    match result {
        Ok(response) => tracing::debug!(
            candidates = response.candidates.len(),
            "response received"
        ),
        Err(e) => tracing::warn!(error = %e, "request failed"),
    }
}

fn degrade(result: Result<GenerateContentResponse>) -> Result<GenerationResult> {
    match result {
        Ok(response) => Ok(unmarshal::into_generation_result(&response)),
        Err(e) if e.is_vendor_failure() => Ok(GenerationResult::Error(e.to_string())),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedBackend(Result<GenerateContentResponse>);

    #[async_trait]
    impl GenerationBackend for FixedBackend {
        async fn generate(
            &self,
            _model: &str,
            _request: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse> {
            self.0.clone()
        }

        async fn generate_stream_first(
            &self,
            model: &str,
            request: &GenerateContentRequest,
            _selection: ChunkSelection,
        ) -> Result<GenerateContentResponse> {
            self.generate(model, request).await
        }
    }

    struct CountingFactory {
        builds: AtomicUsize,
        seen: Mutex<Vec<Credentials>>,
        response: Result<GenerateContentResponse>,
    }

    impl CountingFactory {
        fn new(response: Result<GenerateContentResponse>) -> Arc<Self> {
            Arc::new(Self {
                builds: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                response,
            })
        }
    }

    impl BackendFactory for CountingFactory {
        fn build(
            &self,
            credentials: &Credentials,
            _settings: &NodeSettings,
        ) -> Result<Arc<dyn GenerationBackend>> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(credentials.clone());
            Ok(Arc::new(FixedBackend(self.response.clone())))
        }
    }

    fn text_response(text: &str) -> GenerateContentResponse {
        serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        }))
        .unwrap()
    }

    fn dispatcher(
        dir: &tempfile::TempDir,
        factory: Arc<CountingFactory>,
    ) -> RequestDispatcher {
        let path = dir.path().join("config.json");
        RequestDispatcher::with_factory(
            NodeSettings::default().with_credentials_path(&path),
            CredentialStore::new(path),
            factory,
        )
        .unwrap()
    }

    #[test]
    fn test_configure_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let factory = CountingFactory::new(Ok(text_response("ok")));
        let mut dispatcher = dispatcher(&dir, factory.clone());
        assert!(!dispatcher.is_configured());
        assert_eq!(factory.builds.load(Ordering::SeqCst), 0);

        assert!(dispatcher.configure("key-1", Some("http://127.0.0.1:7890")).unwrap());
        assert_eq!(factory.builds.load(Ordering::SeqCst), 1);

        let path = dir.path().join("config.json");
        std::fs::remove_file(&path).unwrap();

        assert!(!dispatcher.configure("key-1", Some("http://127.0.0.1:7890")).unwrap());
        assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
        assert!(!path.exists(), "unchanged configure must not rewrite the file");
    }

    #[test]
    fn test_configure_keeps_stored_values() {
        let dir = tempfile::tempdir().unwrap();
        let factory = CountingFactory::new(Ok(text_response("ok")));
        let mut dispatcher = dispatcher(&dir, factory.clone());

        dispatcher.configure("key-1", Some("socks5://127.0.0.1:1080")).unwrap();
        assert!(!dispatcher.configure("", None).unwrap());
        assert!(dispatcher.configure("", Some("")).unwrap());
        assert_eq!(dispatcher.credentials(), &Credentials::new("key-1", ""));

        let saved = CredentialStore::new(dir.path().join("config.json"))
            .load_or_init()
            .unwrap();
        assert_eq!(saved, Credentials::new("key-1", ""));
        assert_eq!(factory.builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, CountingFactory::new(Ok(text_response("ok"))));
        let err = dispatcher
            .dispatch(&[RequestPart::text("hi")], "m", &GenerationOptions::text())
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::MissingCredential(_)));
    }

    #[tokio::test]
    async fn test_dispatch_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut dispatcher = dispatcher(&dir, CountingFactory::new(Ok(text_response("a cat"))));
        dispatcher.configure("key", None).unwrap();

        let result = dispatcher
            .dispatch(&[RequestPart::text("describe")], "m", &GenerationOptions::text())
            .await
            .unwrap();
        assert_eq!(result, GenerationResult::Text("a cat".into()));
    }

    #[tokio::test]
    async fn test_vendor_failure_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let factory = CountingFactory::new(Err(NodeError::Http("connection refused".into())));
        let mut dispatcher = dispatcher(&dir, factory);
        dispatcher.configure("key", None).unwrap();

        let result = dispatcher
            .dispatch_stream(&[RequestPart::text("x")], "m", &GenerationOptions::text())
            .await
            .unwrap();
        assert_eq!(
            result.into_output_text(),
            "Error: HTTP error: connection refused"
        );
    }
}
