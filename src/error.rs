use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::store::StoreError;

pub const ACCESS_DENIED: &str = "Access Denied";
pub const COURSE_NOT_FOUND: &str = "We were unable to find the course you requested";
pub const NOT_COURSE_OWNER: &str =
    "The course you are attempting to modify is owned by a different user";
pub const ROUTE_NOT_FOUND: &str = "Route Not Found";
pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
pub const INTERNAL_ERROR: &str = "An unexpected error occurred";

/// Terminal outcome of a request pipeline.
///
/// 400 responses carry `{"errors": [...]}`, everything else `{"error": "..."}`.
/// Internal errors are logged and replaced with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<String>),
    #[error("unauthenticated")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    pub fn duplicate_email(email: &str) -> Self {
        Self::validation(format!(r#"The email address "{email}" is already in use"#))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(errors) => json!({ "errors": errors }),
            Self::Unauthorized => json!({ "error": ACCESS_DENIED }),
            Self::Forbidden(msg) | Self::NotFound(msg) => json!({ "error": msg }),
            Self::Internal(e) => {
                error!(error = ?e, "unhandled error");
                json!({ "error": INTERNAL_ERROR })
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail(email) => Self::duplicate_email(&email),
            StoreError::Database(e) => Self::Internal(e.into()),
        }
    }
}
