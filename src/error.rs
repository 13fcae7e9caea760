use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::db::StorageError;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Error,
    Success,
}

/// One-shot message shown on a form page.
#[derive(Debug, Clone, Serialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

/// Minimal body for form pages (login, register) and error responses.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub title: &'static str,
    pub flash: Option<Flash>,
}

impl Page {
    pub fn new(title: &'static str) -> Self {
        Self { title, flash: None }
    }

    pub fn error(title: &'static str, message: impl Into<String>) -> Self {
        Self {
            title,
            flash: Some(Flash {
                kind: FlashKind::Error,
                message: message.into(),
            }),
        }
    }
}

pub const INVALID_CREDENTIALS_MSG: &str = "Invalid username or password";
pub const DUPLICATE_USERNAME_MSG: &str = "Username already exists. Please choose a different one.";
const INTEGRITY_MSG: &str = "An integrity error occurred while processing your request. \
Please ensure that no duplicate entries are made.";
const UNAVAILABLE_MSG: &str =
    "A database error occurred while processing your request. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Same variant for unknown user and wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("username already exists")]
    DuplicateUsername,
    #[error("not permitted")]
    Forbidden,
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(Page::error("Login", INVALID_CREDENTIALS_MSG)),
            )
                .into_response(),
            AppError::DuplicateUsername => (
                StatusCode::CONFLICT,
                Json(Page::error("Register", DUPLICATE_USERNAME_MSG)),
            )
                .into_response(),
            AppError::Forbidden => Redirect::to("/").into_response(),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(Page::error("Error", msg))).into_response()
            }
            AppError::Storage(StorageError::ConstraintViolation(e)) => {
                error!(error = %e, "database integrity error");
                (StatusCode::CONFLICT, Json(Page::error("Error", INTEGRITY_MSG))).into_response()
            }
            AppError::Storage(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(Page::error("Error", UNAVAILABLE_MSG)),
                )
                    .into_response()
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(Page::error("Error", "Internal server error")),
                )
                    .into_response()
            }
        }
    }
}
