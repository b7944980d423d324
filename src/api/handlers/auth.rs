//! Credential check endpoint.

use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::ValidateResponse;
use crate::app_state::AppState;
use crate::auth::Caller;
use crate::error::ErrorResponse;

/// `GET /auth/validate` — Resolve the bearer credential.
#[utoipa::path(
    get,
    path = "/api/v1/auth/validate",
    tag = "Auth",
    summary = "Validate a bearer credential",
    description = "Returns the identity carried by a valid credential, or 401.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Credential is valid", body = ValidateResponse),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
    )
)]
pub async fn validate(Caller(caller): Caller) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        valid: true,
        user: caller,
    })
}

/// Auth routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/validate", get(validate))
}
