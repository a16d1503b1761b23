use crate::config::NodeSettings;
use crate::dispatcher::RequestDispatcher;
use crate::error::Result;
use crate::payload::encode_for_request;
use crate::types::{EditStatus, GenerationOptions, GenerationResult, ImageTensor, RequestPart};
use crate::unmarshal;

/// Side length of the black image returned when nothing was generated
pub const PLACEHOLDER_SIZE: usize = 512;

/// Output of [`GeminiImageGenerator`]
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGeneration {
    pub image: ImageTensor,
    /// Accompanying model text, empty when there was none
    pub text: String,
    pub status: EditStatus,
}

/// Generates an image from a prompt over the streaming endpoint
///
/// The stream is read up to the first chunk carrying inline media; text seen
/// before it is kept. A stream with text only yields that text.
#[derive(Debug)]
pub struct GeminiImageGenerator {
    dispatcher: RequestDispatcher,
    options: GenerationOptions,
}

impl GeminiImageGenerator {
    pub const DISPLAY_NAME: &'static str = "Gemini Image Generator";
    pub const CATEGORY: &'static str = "Gemini Image Editor";

    pub fn new(settings: NodeSettings) -> Result<Self> {
        Ok(Self::with_dispatcher(RequestDispatcher::new(settings)?))
    }

    pub fn with_dispatcher(dispatcher: RequestDispatcher) -> Self {
        Self {
            dispatcher,
            options: GenerationOptions::image_and_text(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Generate from `prompt`, optionally guided by a reference image
    ///
    /// On failure the reference image (or a black placeholder) is returned
    /// with the matching status.
    pub async fn generate_image(
        &mut self,
        prompt: &str,
        reference: Option<&ImageTensor>,
        api_key: &str,
        seed: Option<i32>,
    ) -> Result<ImageGeneration> {
        self.dispatcher.configure(api_key, None)?;

        let mut parts = Vec::with_capacity(2);
        if let Some(reference) = reference {
            parts.push(encode_for_request(reference)?);
        }
        parts.push(RequestPart::text(prompt));

        let mut options = self.options.clone();
        if let Some(seed) = seed {
            options = options.with_seed(seed);
        }

        let fallback = || {
            reference.cloned().unwrap_or_else(|| {
                ImageTensor::zeros(1, PLACEHOLDER_SIZE, PLACEHOLDER_SIZE)
            })
        };

        let model = self.dispatcher.settings().image_model.clone();
        let output = match self
            .dispatcher
            .send_stream_media(&parts, &model, &options)
            .await
        {
            Ok(response) => {
                let original = fallback();
                let (image, status) = unmarshal::edited_image(&response, &original);
                ImageGeneration {
                    image,
                    text: unmarshal::first_text(&response).unwrap_or_default(),
                    status,
                }
            }
            Err(e) if e.is_vendor_failure() => {
                tracing::warn!(error = %e, "image generation failed");
                ImageGeneration {
                    image: fallback(),
                    text: GenerationResult::Error(e.to_string()).into_output_text(),
                    status: EditStatus::VendorCallFailed,
                }
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            status = %output.status,
            node = Self::DISPLAY_NAME,
            "image generation finished"
        );
        Ok(output)
    }

    pub fn generate_image_blocking(
        &mut self,
        prompt: &str,
        reference: Option<&ImageTensor>,
        api_key: &str,
        seed: Option<i32>,
    ) -> Result<ImageGeneration> {
        super::block_on(self.generate_image(prompt, reference, api_key, seed))?
    }
}
