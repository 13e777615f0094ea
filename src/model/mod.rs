mod generator;
mod loader;
mod registry;
mod types;
pub mod validation;

#[cfg(feature = "tch-backend")]
pub mod torch;

pub use generator::{TextGenerator, TokenCounter};
pub use loader::{ModelArtifacts, load_tokenizer};
pub use registry::ModelRegistry;
pub use types::{
    GeneratedSequence, GenerationLimits, GenerationOptions, GenerationRequest,
    GenerationResponse, ModelMetadata,
};
