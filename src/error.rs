//! Application error types with consistent JSON responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Failure reaching the backing data store.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Insufficient role for this resource")]
    Forbidden,

    #[error("Account is blocked")]
    AccountBlocked,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// No mail credential configured; the mail client was never built.
    #[error("Mail provider credential is not configured")]
    MailerNotConfigured,

    #[error("Mail provider rejected the message (status {status})")]
    MailRejected {
        status: u16,
        payload: serde_json::Value,
    },

    #[error("Could not process request: {0}")]
    Processing(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl AppError {
    /// Machine-readable code carried in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::AccountBlocked => "account_blocked",
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::MailerNotConfigured => "mailer_not_configured",
            AppError::MailRejected { .. } => "mail_rejected",
            AppError::Processing(_) => "processing_error",
            AppError::Repository(_) => "database_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::AccountBlocked => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::MailRejected { .. } => StatusCode::BAD_REQUEST,
            AppError::MailerNotConfigured
            | AppError::Processing(_)
            | AppError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) => {
                Some(serde_json::Value::String(msg.clone()))
            }
            AppError::MailerNotConfigured => {
                tracing::error!("Mail send attempted without RESEND_API_KEY");
                Some(serde_json::Value::String(
                    "internal configuration error".to_string(),
                ))
            }
            AppError::MailRejected { status, payload } => {
                tracing::warn!(provider_status = status, payload = %payload, "Mail rejected by provider");
                Some(payload.clone())
            }
            AppError::Processing(msg) => {
                tracing::error!(error = %msg, "Request processing failed");
                None
            }
            AppError::Repository(err) => {
                tracing::error!(error = %err, "Database error");
                None
            }
            _ => None,
        };

        let body = ErrorResponse {
            error: self.code().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
