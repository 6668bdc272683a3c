use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Import Axum types for HTTP response conversion
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Structured validation errors with field-level error mapping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ValidationErrors {
    Single { field: String, message: String },
    Multiple { fields: IndexMap<String, String> },
}

impl ValidationErrors {
    /// Builds a single-field validation error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Single {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the message recorded for `field`, if any.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        match self {
            ValidationErrors::Single { field: f, message } if f == field => Some(message),
            ValidationErrors::Single { .. } => None,
            ValidationErrors::Multiple { fields } => fields.get(field).map(String::as_str),
        }
    }

    fn into_fields(self) -> IndexMap<String, String> {
        match self {
            ValidationErrors::Single { field, message } => IndexMap::from([(field, message)]),
            ValidationErrors::Multiple { fields } => fields,
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationErrors::Single { field, message } => write!(f, "{}: {}", field, message),
            ValidationErrors::Multiple { fields } => {
                let joined = fields
                    .iter()
                    .map(|(field, message)| format!("{}: {}", field, message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}", joined)
            }
        }
    }
}

/// Collects field errors in the order they are detected.
#[derive(Debug, Default)]
pub struct FieldErrors {
    fields: IndexMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error for `field`; the first error reported for a field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts into `Err(Error::Validation)` if any error was recorded.
    pub fn into_result(self) -> Result<()> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(ValidationErrors::Multiple {
                fields: self.fields,
            }))
        }
    }
}

/// The custom error type for the application.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from the sqlx library.
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// The backing store could not be reached or failed mid-operation.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A validation error with field-level details.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// A not found error (resource does not exist or was soft-deleted).
    #[error("Not found: {0}")]
    NotFound(String),

    /// An authentication error (missing/invalid token or credentials).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// An internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// A type alias for `Result<T, Error>` to simplify function signatures.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a single-field validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation(ValidationErrors::single(field, message))
    }

    /// Classifies a sqlx error: connectivity failures become `StoreUnavailable`.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if matches!(
            e,
            sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::WorkerCrashed
        ) {
            Error::StoreUnavailable(e.to_string())
        } else {
            Error::Sqlx(e)
        }
    }
}

/// Convert custom Error to HTTP response
///
/// Client errors carry their message; server-side faults are logged in full and
/// reported with a generic message only.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Error::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": "Validation failed",
                    "code": "VALIDATION_ERROR",
                    "fields": errors.into_fields()
                }),
            ),
            Error::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({
                    "error": msg,
                    "code": "NOT_FOUND"
                }),
            ),
            Error::Authentication(msg) => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({
                    "error": msg,
                    "code": "UNAUTHENTICATED"
                }),
            ),
            Error::StoreUnavailable(detail) => {
                tracing::error!(error = %detail, "Store unavailable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({
                        "error": "Server error",
                        "code": "STORE_UNAVAILABLE"
                    }),
                )
            }
            Error::Sqlx(e) => {
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({
                        "error": "Server error",
                        "code": "INTERNAL_ERROR"
                    }),
                )
            }
            Error::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({
                        "error": "Server error",
                        "code": "INTERNAL_ERROR"
                    }),
                )
            }
            Error::Config(e) => {
                tracing::error!(error = %e, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({
                        "error": "Configuration error",
                        "code": "CONFIG_ERROR"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
