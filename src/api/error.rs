//! Unified API error handling.
//!
//! Every endpoint failure falls into one of three classes: invalid request
//! shape (400), missing or bad credentials (401), or a data-layer failure
//! (500). Errors render as `{"status": "<message>"}`, the same envelope the
//! success acknowledgements use.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::session::SessionError;

/// Error classes for API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed request fields
    Validation,
    /// Bad credentials or no valid session
    Auth,
    /// Any data-layer failure
    Store,
}

impl ErrorKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Auth => StatusCode::UNAUTHORIZED,
            ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Response body shared by error responses and acknowledgements.
#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub status: String,
}

#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    /// Client-facing status string; diagnostics stay in the server log.
    message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Missing or malformed request fields (400)
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Missing required fields (400), the common validation failure
    pub fn missing_fields() -> Self {
        Self::validation("Missing_fields")
    }

    /// Bad credentials (401)
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::Auth, "Invalid_credentials")
    }

    /// No valid session presented (401)
    pub fn not_logged_in() -> Self {
        Self::new(ErrorKind::Auth, "NOT_LOGGED_IN")
    }

    /// Data-layer failure (500), generic message to the client
    pub fn store() -> Self {
        Self::new(ErrorKind::Store, "Internal_server_error")
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.kind.status_code(),
            Json(StatusBody {
                status: self.message,
            }),
        )
            .into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "Error en la base de datos");
        ApiError::store()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        tracing::error!(error = %err, "Error en el almacén de sesiones");
        ApiError::store()
    }
}
