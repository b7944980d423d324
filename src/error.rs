//! Service error types with HTTP status code mapping.
//!
//! [`SwapperError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{EventId, SwapRequestId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1201,
///     "message": "forbidden: only the responder may accept this request",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`SwapperError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                    |
/// |-----------|-------------------|--------------------------------|
/// | 1000–1099 | Validation        | 400 Bad Request                |
/// | 1100–1199 | Authentication    | 401 Unauthorized               |
/// | 1200–1299 | Authorization     | 403 Forbidden                  |
/// | 2000–2099 | Not Found         | 404 Not Found                  |
/// | 2100–2199 | State             | 409 Conflict                   |
/// | 3000–3999 | Server            | 500 Internal Server Error      |
#[derive(Debug, thiserror::Error)]
pub enum SwapperError {
    /// Request validation failed (missing or malformed field).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Event status outside `Busy` / `Swappable`.
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// Missing, malformed or expired bearer credential.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Caller is authenticated but not the owner or participant required.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Event with the given ID was not found.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// Swap request with the given ID was not found.
    #[error("swap request not found: {0}")]
    SwapRequestNotFound(SwapRequestId),

    /// Operation not allowed in the record's current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SwapperError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidStatus(_) => 1002,
            Self::Unauthenticated(_) => 1101,
            Self::Forbidden(_) => 1201,
            Self::EventNotFound(_) => 2001,
            Self::SwapRequestNotFound(_) => 2002,
            Self::Conflict(_) => 2101,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::EventNotFound(_) | Self::SwapRequestNotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SwapperError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
