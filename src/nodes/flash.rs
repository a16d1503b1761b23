use crate::config::NodeSettings;
use crate::dispatcher::RequestDispatcher;
use crate::error::Result;
use crate::payload::build_parts;
use crate::types::{GenerationOptions, Modality, ModalityInput};

/// One invocation of [`GeminiFlash`]
#[derive(Debug, Clone)]
pub struct FlashRequest {
    pub prompt: String,
    pub input_type: Modality,
    pub input: ModalityInput,
    /// Empty keeps the stored key
    pub api_key: String,
    /// `None` keeps the stored proxy, `Some("")` disables it
    pub proxy: Option<String>,
    /// Overrides the configured text model
    pub model: Option<String>,
    pub options: GenerationOptions,
}

impl FlashRequest {
    pub fn new(prompt: impl Into<String>, input_type: Modality) -> Self {
        Self {
            prompt: prompt.into(),
            input_type,
            input: ModalityInput::default(),
            api_key: String::new(),
            proxy: None,
            model: None,
            options: GenerationOptions::text(),
        }
    }

    pub fn with_input(mut self, input: ModalityInput) -> Self {
        self.input = input;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Text generation over text, image, video or audio input
///
/// Outputs a single string; vendor failures come back as `"Error: ..."`.
#[derive(Debug)]
pub struct GeminiFlash {
    dispatcher: RequestDispatcher,
}

impl GeminiFlash {
    pub const DISPLAY_NAME: &'static str = "Gemini Flash";
    pub const CATEGORY: &'static str = "Gemini";

    pub fn new(settings: NodeSettings) -> Result<Self> {
        Ok(Self::with_dispatcher(RequestDispatcher::new(settings)?))
    }

    pub fn with_dispatcher(dispatcher: RequestDispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    pub async fn generate(&mut self, request: &FlashRequest) -> Result<String> {
        self.dispatcher
            .configure(&request.api_key, request.proxy.as_deref())?;

        let parts = build_parts(&request.prompt, request.input_type, &request.input)?;
        let model = request
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.dispatcher.settings().text_model.clone());

        let result = self
            .dispatcher
            .dispatch(&parts, &model, &request.options)
            .await?;
        if result.is_error() {
            tracing::warn!(
                node = Self::DISPLAY_NAME,
                input_type = %request.input_type,
                "generation degraded to error text"
            );
        }
        Ok(result.into_output_text())
    }

    pub fn generate_blocking(&mut self, request: &FlashRequest) -> Result<String> {
        super::block_on(self.generate(request))?
    }
}
