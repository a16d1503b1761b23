use crate::config::NodeSettings;
use crate::dispatcher::RequestDispatcher;
use crate::error::Result;
use crate::payload::encode_for_request;
use crate::types::{EditStatus, GenerationOptions, ImageTensor, RequestPart};
use crate::unmarshal;

/// Edits an image from a text instruction
///
/// Outputs `(edited_image, status_code)`. Vendor failures never abort: the
/// original image comes back with a non-zero [`EditStatus`].
#[derive(Debug)]
pub struct GeminiImageEditor {
    dispatcher: RequestDispatcher,
    options: GenerationOptions,
}

impl GeminiImageEditor {
    pub const DISPLAY_NAME: &'static str = "Gemini Image Editor";
    pub const CATEGORY: &'static str = "Gemini Image Editor";
    pub const DEFAULT_PROMPT: &'static str = "Modify the image accordingly.";

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

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// Send `image` (resized to 1024 on the longest side) with `prompt`
    ///
    /// A non-empty `api_key` replaces the stored key.
    pub async fn edit_image(
        &mut self,
        prompt: &str,
        image: &ImageTensor,
        api_key: &str,
    ) -> Result<(ImageTensor, EditStatus)> {
        self.dispatcher.configure(api_key, None)?;

        let parts = vec![encode_for_request(image)?, RequestPart::text(prompt)];
        let model = self.dispatcher.settings().image_model.clone();

        let (edited, status) = match self.dispatcher.send(&parts, &model, &self.options).await {
            Ok(response) => unmarshal::edited_image(&response, image),
            Err(e) if e.is_vendor_failure() => {
                tracing::warn!(error = %e, "image edit failed, returning original");
                (image.clone(), EditStatus::VendorCallFailed)
            }
            Err(e) => return Err(e),
        };

        tracing::info!(%status, node = Self::DISPLAY_NAME, "image edit finished");
        Ok((edited, status))
    }

    pub fn edit_image_blocking(
        &mut self,
        prompt: &str,
        image: &ImageTensor,
        api_key: &str,
    ) -> Result<(ImageTensor, EditStatus)> {
        super::block_on(self.edit_image(prompt, image, api_key))?
    }
}
