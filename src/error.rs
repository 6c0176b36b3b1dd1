use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::models::ErrorResponse;

/// Which store operation a storage failure interrupted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    fn message(self) -> &'static str {
        match self {
            Self::Read => "Error reading video",
            Self::Create => "Error creating video",
            Self::Update => "Error updating video",
            Self::Delete => "Error deleting video",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required field is missing or has the wrong type.
    #[error("{field}: {help}")]
    Validation { field: &'static str, help: &'static str },

    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Video not found")]
    NotFound,

    #[error("Video already exists")]
    Conflict,

    #[error("{}: {cause}", .action.message())]
    Storage { action: Action, cause: String },
}

impl ApiError {
    pub fn storage(action: Action, cause: impl ToString) -> Self {
        Self::Storage {
            action,
            cause: cause.to_string(),
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            // Field errors are keyed by field name
            Self::Validation { field, help } => {
                (status, Json(json!({ "message": { field: help } }))).into_response()
            }
            Self::Storage { action, cause } => {
                error!("{}: {}", action.message(), cause);
                (
                    status,
                    Json(ErrorResponse {
                        message: action.message().to_string(),
                        error: Some(cause),
                    }),
                )
                    .into_response()
            }
            other => (
                status,
                Json(ErrorResponse {
                    message: other.to_string(),
                    error: None,
                }),
            )
                .into_response(),
        }
    }
}
