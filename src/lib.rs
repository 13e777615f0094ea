pub mod config;
pub mod error;
pub mod model;
pub mod server;

pub use config::{AppConfig, ServiceVariant};
pub use error::ServiceError;
pub use model::{
    GeneratedSequence, GenerationOptions, GenerationRequest, GenerationResponse, ModelRegistry,
    TextGenerator, TokenCounter,
};
pub use server::build_router;
