use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, ServiceVariant};

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default)]
    pub max_length: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub generated_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<usize>,
    /// Output tokens minus prompt tokens. Negative when the generator
    /// returns less text than it was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<i64>,
    /// Wall-clock seconds spent in the generator, two decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_time: Option<f64>,
}

/// Options handed to the text generator for a single call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Total sequence length, prompt included.
    pub max_length: i64,
    pub num_return_sequences: usize,
    pub do_sample: bool,
    pub temperature: Option<f64>,
}

impl GenerationOptions {
    pub fn for_request(config: &AppConfig, requested_max_length: i64) -> Self {
        match config.variant {
            ServiceVariant::Basic => Self {
                max_length: requested_max_length,
                num_return_sequences: 1,
                do_sample: false,
                temperature: None,
            },
            ServiceVariant::Hardened => Self {
                max_length: requested_max_length.min(config.max_output_length),
                num_return_sequences: 1,
                do_sample: true,
                temperature: Some(config.temperature),
            },
        }
    }
}

/// One sequence produced by a generator. Pipelines either label the text or
/// hand back the bare string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedSequence {
    Record { generated_text: String },
    Text(String),
}

impl GeneratedSequence {
    pub fn into_text(self) -> String {
        match self {
            GeneratedSequence::Record { generated_text } => generated_text,
            GeneratedSequence::Text(text) => text,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelMetadata {
    pub model: String,
    pub variant: ServiceVariant,
    pub limits: GenerationLimits,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationLimits {
    pub max_prompt_length: usize,
    pub max_prompt_tokens: usize,
    pub min_max_length: i64,
    pub max_output_length: i64,
    pub default_max_length: i64,
}

impl From<&AppConfig> for GenerationLimits {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_prompt_length: config.max_prompt_length,
            max_prompt_tokens: config.max_prompt_tokens,
            min_max_length: config.min_max_length,
            max_output_length: config.max_output_length,
            default_max_length: config.default_max_length,
        }
    }
}
