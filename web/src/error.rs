//! Error types for web handlers.
//!
//! [`AppError`] bridges the marketplace error taxonomy and HTTP responses.
//! Every error reaches the client as `{"code": ..., "message": ...}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chaingo_core::MarketError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Data>, AppError> {
///     let listing = queries.get(id).await?; // MarketError converts via `From`
///     Ok(Json(listing))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code of this error.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "BAD_REQUEST".to_string())
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "UNAUTHORIZED".to_string())
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into(), "NOT_FOUND".to_string())
    }

    /// Create a 413 Payload Too Large error.
    #[must_use]
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            message.into(),
            "PAYLOAD_TOO_LARGE".to_string(),
        )
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_ERROR".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Map marketplace errors onto HTTP.
///
/// Store and internal failures keep their detail in `source` for the log and
/// send a generic message to the client.
impl From<MarketError> for AppError {
    fn from(err: MarketError) -> Self {
        let status = match &err {
            MarketError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MarketError::Conflict(_) | MarketError::NotAvailable => StatusCode::CONFLICT,
            MarketError::NotFound { .. }
            | MarketError::NotFoundOrForbidden
            | MarketError::UserNotFound => StatusCode::NOT_FOUND,
            MarketError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            MarketError::Forbidden { .. } => StatusCode::FORBIDDEN,
            MarketError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            MarketError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let code = err.code().to_string();

        if err.is_user_error() {
            Self::new(status, err.to_string(), code)
        } else {
            let message = match err {
                MarketError::StoreUnavailable(_) => "Storage is temporarily unavailable",
                _ => "An internal error occurred",
            };
            Self::new(status, message.to_string(), code).with_source(err.into())
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::payload_too_large(rejection.body_text());
        }
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_market_error_statuses() {
        let cases = [
            (MarketError::validation("x"), StatusCode::UNPROCESSABLE_ENTITY),
            (MarketError::conflict("x"), StatusCode::CONFLICT),
            (MarketError::not_found("User"), StatusCode::NOT_FOUND),
            (MarketError::NotFoundOrForbidden, StatusCode::NOT_FOUND),
            (MarketError::NotAvailable, StatusCode::CONFLICT),
            (MarketError::InvalidToken("x".into()), StatusCode::UNAUTHORIZED),
            (MarketError::UserNotFound, StatusCode::NOT_FOUND),
            (
                MarketError::Forbidden {
                    session: "a".into(),
                    requested: "b".into(),
                },
                StatusCode::FORBIDDEN,
            ),
            (MarketError::StoreUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (MarketError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            let code = err.code();
            let app: AppError = err.into();
            assert_eq!(app.status(), status);
            assert_eq!(app.code(), code);
        }
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let app: AppError = MarketError::Internal("connection string leaked".into()).into();
        assert!(!app.to_string().contains("leaked"));
        assert!(std::error::Error::source(&app).is_some());
    }

    #[test]
    fn test_user_errors_keep_message() {
        let app: AppError = MarketError::NotAvailable.into();
        assert_eq!(
            app.to_string(),
            "[NOT_AVAILABLE] Listing is not available for purchase"
        );
    }
}
