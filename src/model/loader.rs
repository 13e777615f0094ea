use std::sync::Arc;

use tokenizers::Tokenizer;
use tracing::info;

use crate::{config::AppConfig, error::ServiceError, model::TextGenerator};

pub struct ModelArtifacts {
    pub tokenizer: Arc<Tokenizer>,
    pub generator: Arc<dyn TextGenerator>,
}

impl ModelArtifacts {
    pub fn load(config: &AppConfig) -> Result<Self, ServiceError> {
        ensure_backend()?;
        let tokenizer = Arc::new(load_tokenizer(config)?);
        let generator = load_generator(config, tokenizer.clone())?;
        Ok(Self {
            tokenizer,
            generator,
        })
    }
}

pub fn load_tokenizer(config: &AppConfig) -> Result<Tokenizer, ServiceError> {
    match config.tokenizer_path.as_ref() {
        Some(path) => {
            if !path.exists() {
                return Err(ServiceError::Internal(format!(
                    "tokenizer artifact missing: {}",
                    path.display()
                )));
            }
            info!(path = %path.display(), "loading tokenizer from file");
            Tokenizer::from_file(path).map_err(|e| ServiceError::Tokenizer(e.to_string()))
        }
        None => {
            info!(model = %config.model_id, "fetching tokenizer from the hub");
            Tokenizer::from_pretrained(&config.model_id, None)
                .map_err(|e| ServiceError::Tokenizer(e.to_string()))
        }
    }
}

#[cfg(feature = "tch-backend")]
fn load_generator(
    config: &AppConfig,
    tokenizer: Arc<Tokenizer>,
) -> Result<Arc<dyn TextGenerator>, ServiceError> {
    let generator =
        crate::model::torch::TorchGenerator::load(&config.module_path, config.device, tokenizer)?;
    Ok(Arc::new(generator))
}

#[cfg(feature = "tch-backend")]
fn ensure_backend() -> Result<(), ServiceError> {
    Ok(())
}

#[cfg(not(feature = "tch-backend"))]
fn ensure_backend() -> Result<(), ServiceError> {
    Err(missing_backend())
}

#[cfg(not(feature = "tch-backend"))]
fn missing_backend() -> ServiceError {
    ServiceError::Internal(
        "no text generation backend compiled in; rebuild with --features tch-backend".into(),
    )
}

#[cfg(not(feature = "tch-backend"))]
fn load_generator(
    _config: &AppConfig,
    _tokenizer: Arc<Tokenizer>,
) -> Result<Arc<dyn TextGenerator>, ServiceError> {
    Err(missing_backend())
}
