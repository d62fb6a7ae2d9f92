use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not configured")]
    Missing(&'static str),

    #[error("failed to parse {key}={value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Input problems a prospect can fix and resubmit. Shared between the
/// server handlers and the client-side form checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}.", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid email format.")]
    InvalidEmail,

    #[error("Photo count must be a whole number.")]
    InvalidPhotoCount,

    #[error("At least one file is required.")]
    NoFiles,

    #[error("Too many files: at most {max} are allowed.")]
    TooManyFiles { max: usize },

    #[error("File \"{0}\" is empty.")]
    EmptyFile(String),

    #[error("File \"{name}\" is not an image ({mime_type}).")]
    UnsupportedType { name: String, mime_type: String },

    #[error("File \"{name}\" exceeds the {max_bytes} byte limit.")]
    FileTooLarge { name: String, max_bytes: u64 },

    #[error("Invalid file URL: {0}")]
    InvalidFileUrl(String),

    #[error("Invalid request: {0}")]
    MalformedRequest(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("shared secret mismatch")]
    Unauthorized,

    #[error(transparent)]
    NotConfigured(#[from] ConfigError),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("upstream error: {0}")]
    Upstream(String),
}

impl AppError {
    fn client_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Unauthorized => "Unauthorized.".to_string(),
            AppError::NotConfigured(_) => "Server not configured.".to_string(),
            AppError::Storage(_) => "Server error".to_string(),
            AppError::Upstream(_) => "Failed to forward submission.".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotConfigured(_) | AppError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(e) => tracing::debug!(error = %e, "rejected invalid input"),
            AppError::Unauthorized => tracing::warn!("rejected request with bad shared secret"),
            _ => tracing::error!(error = %self, "request failed"),
        }

        HttpResponse::build(self.status_code()).json(json!({
            "ok": false,
            "error": self.client_message(),
        }))
    }
}
