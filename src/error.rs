use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::storage::StoreError;

/// Every way a request can fail. Handlers return this and the
/// [`IntoResponse`] impl below is the only place errors become HTTP.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("User already exists")]
    DuplicateUser,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DuplicateUser
            | Self::Validation(_)
            | Self::MalformedIdentifier(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            // Same body for unknown email and wrong password.
            Self::InvalidCredentials => json!({ "message": self.to_string() }),
            Self::Store(_) | Self::Internal(_) => {
                error!(error = ?self, "request failed");
                json!({ "success": false, "message": "Internal server error" })
            }
            _ => json!({ "success": false, "message": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
