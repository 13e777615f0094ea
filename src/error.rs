use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("text generation failed: {0}")]
    GenerationFailed(String),
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::GenerationFailed(_)
            | ServiceError::Tokenizer(_)
            | ServiceError::Io(_)
            | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable category reported alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidInput(_) => "invalid_input",
            ServiceError::GenerationFailed(_) => "generation_failed",
            ServiceError::Tokenizer(_) | ServiceError::Io(_) | ServiceError::Internal(_) => {
                "internal_error"
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            ServiceError::InvalidInput(_) => {
                tracing::warn!(error = %self, "rejected generation request");
                self.to_string()
            }
            ServiceError::GenerationFailed(_) => {
                tracing::error!(error = %self, "generation failed");
                self.to_string()
            }
            _ => {
                tracing::error!(error = %self, "unexpected failure while serving request");
                "internal server error".to_string()
            }
        };

        let body = serde_json::json!({
            "error": message,
            "kind": self.kind(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_to_stable_statuses() {
        let invalid = ServiceError::InvalidInput("prompt cannot be empty".into());
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.kind(), "invalid_input");

        let failed = ServiceError::GenerationFailed("CUDA out of memory".into());
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failed.kind(), "generation_failed");

        let tokenizer = ServiceError::Tokenizer("bad vocab".into());
        assert_eq!(tokenizer.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(tokenizer.kind(), "internal_error");
    }

    #[test]
    fn generation_failure_keeps_underlying_message() {
        let err = ServiceError::GenerationFailed("CUDA out of memory".into());
        assert_eq!(err.to_string(), "text generation failed: CUDA out of memory");
    }
}
