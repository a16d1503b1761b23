//! Generation options shared by all nodes

use serde::{Deserialize, Serialize};

/// Blocking threshold applied to every harm category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SafetyThreshold {
    #[serde(rename = "BLOCK_NONE")]
    #[default]
    BlockNone,
    #[serde(rename = "BLOCK_ONLY_HIGH")]
    BlockOnlyHigh,
    #[serde(rename = "BLOCK_MEDIUM_AND_ABOVE")]
    BlockMediumAndAbove,
    #[serde(rename = "BLOCK_LOW_AND_ABOVE")]
    BlockLowAndAbove,
}

/// Output modality requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseModality {
    #[serde(rename = "TEXT")]
    Text,
    #[serde(rename = "IMAGE")]
    Image,
}

/// Sampling and safety knobs for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<i32>,
    pub max_output_tokens: Option<i32>,
    pub seed: Option<i32>,
    pub safety_threshold: Option<SafetyThreshold>,
    /// Empty means "let the model decide"
    pub response_modalities: Vec<ResponseModality>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: Some(1.0),
            top_p: Some(0.95),
            top_k: Some(40),
            max_output_tokens: Some(8192),
            seed: None,
            safety_threshold: Some(SafetyThreshold::BlockNone),
            response_modalities: Vec::new(),
        }
    }
}

impl GenerationOptions {
    /// Defaults used by the text/vision node
    pub fn text() -> Self {
        Self::default()
    }

    /// Defaults used by the image editing and generation nodes
    pub fn image_and_text() -> Self {
        Self {
            response_modalities: vec![ResponseModality::Image, ResponseModality::Text],
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: i32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_max_output_tokens(mut self, max: i32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    pub fn with_seed(mut self, seed: i32) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_safety_threshold(mut self, threshold: SafetyThreshold) -> Self {
        self.safety_threshold = Some(threshold);
        self
    }

    pub fn with_response_modalities(mut self, modalities: Vec<ResponseModality>) -> Self {
        self.response_modalities = modalities;
        self
    }
}
