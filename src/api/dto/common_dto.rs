//! Shared DTO types used across multiple endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::CallerIdentity;

/// Plain confirmation body, e.g. for deletions.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

impl MessageResponse {
    /// Creates a confirmation with the given text.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for `GET /auth/validate`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidateResponse {
    /// Always `true`; invalid credentials produce a 401 instead.
    pub valid: bool,
    /// The resolved identity.
    pub user: CallerIdentity,
}
