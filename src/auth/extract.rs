//! Axum extractors for the caller identity.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::domain::CallerIdentity;
use crate::error::SwapperError;

/// Authenticated caller. Rejects the request with 401 when the credential
/// is missing or invalid.
#[derive(Debug, Clone)]
pub struct Caller(pub CallerIdentity);

/// Caller identity if a valid credential was presented, otherwise `None`.
#[derive(Debug, Clone)]
pub struct MaybeCaller(pub Option<CallerIdentity>);

fn authorization_header(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = SwapperError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .authenticator
            .authenticate(authorization_header(parts))
            .map(Self)
    }
}

impl FromRequestParts<AppState> for MaybeCaller {
    type Rejection = SwapperError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(
            state
                .authenticator
                .authenticate_optional(authorization_header(parts)),
        ))
    }
}
