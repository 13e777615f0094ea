use std::{sync::Arc, time::Instant};

use tokio::{task, time};
use tracing::info;

use crate::{
    config::{AppConfig, ServiceVariant},
    error::ServiceError,
    model::{
        GeneratedSequence, GenerationLimits, GenerationOptions, GenerationRequest,
        GenerationResponse, ModelMetadata, TextGenerator, TokenCounter, loader::ModelArtifacts,
        validation,
    },
};

/// Collaborators shared by every request: built once at startup.
pub struct ModelRegistry {
    model_id: String,
    generator: Arc<dyn TextGenerator>,
    tokenizer: Option<Arc<dyn TokenCounter>>,
}

impl ModelRegistry {
    pub fn initialize(config: &AppConfig) -> Result<Self, ServiceError> {
        let artifacts = ModelArtifacts::load(config)?;
        let tokenizer: Arc<dyn TokenCounter> = artifacts.tokenizer;
        Ok(Self::new(
            config.model_id.clone(),
            artifacts.generator,
            Some(tokenizer),
        ))
    }

    pub fn new(
        model_id: impl Into<String>,
        generator: Arc<dyn TextGenerator>,
        tokenizer: Option<Arc<dyn TokenCounter>>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            generator,
            tokenizer,
        }
    }

    pub fn metadata(&self, config: &AppConfig) -> ModelMetadata {
        ModelMetadata {
            model: self.model_id.clone(),
            variant: config.variant,
            limits: GenerationLimits::from(config),
        }
    }

    pub async fn generate(
        &self,
        request: GenerationRequest,
        config: &AppConfig,
    ) -> Result<GenerationResponse, ServiceError> {
        let max_length = validation::validate_request(&request, config)?;
        let accounting = config.variant == ServiceVariant::Hardened;

        let prompt_tokens = if accounting {
            let count = self.count_tokens(&request.prompt)?;
            validation::check_prompt_tokens(count, config)?;
            Some(count)
        } else {
            None
        };

        let options = GenerationOptions::for_request(config, max_length);
        let start = Instant::now();
        let sequences = self.spawn_inference(request.prompt, options, config).await?;
        let elapsed = start.elapsed();

        let generated_text = sequences
            .into_iter()
            .next()
            .map(GeneratedSequence::into_text)
            .ok_or_else(|| {
                ServiceError::GenerationFailed("generator returned no sequences".into())
            })?;

        let completion_tokens = match prompt_tokens {
            Some(prompt_tokens) => {
                let output_tokens = self.count_tokens(&generated_text)?;
                Some(output_tokens as i64 - prompt_tokens as i64)
            }
            None => None,
        };
        let generation_time = (elapsed.as_secs_f64() * 100.0).round() / 100.0;

        info!(completion_tokens, generation_time, "generation completed");

        Ok(GenerationResponse {
            generated_text,
            prompt_tokens,
            completion_tokens,
            generation_time: accounting.then_some(generation_time),
        })
    }

    fn count_tokens(&self, text: &str) -> Result<usize, ServiceError> {
        let tokenizer = self
            .tokenizer
            .as_ref()
            .ok_or_else(|| ServiceError::Internal("tokenizer not loaded".into()))?;
        tokenizer
            .count_tokens(text)
            .map_err(|e| ServiceError::Tokenizer(format!("{e:#}")))
    }

    async fn spawn_inference(
        &self,
        prompt: String,
        options: GenerationOptions,
        config: &AppConfig,
    ) -> Result<Vec<GeneratedSequence>, ServiceError> {
        let generator = self.generator.clone();
        let timeout = config.generation_timeout;

        let inference = task::spawn_blocking(move || generator.generate(&prompt, &options));

        time::timeout(timeout, inference)
            .await
            .map_err(|_| {
                ServiceError::GenerationFailed(format!(
                    "generation timed out after {:.1}s",
                    timeout.as_secs_f64()
                ))
            })?
            .map_err(|err| ServiceError::GenerationFailed(format!("inference task failed: {err}")))?
            .map_err(|err| ServiceError::GenerationFailed(format!("{err:#}")))
    }
}
