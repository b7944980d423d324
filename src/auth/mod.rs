//! Authorization layer: resolves a caller identity from a bearer credential.
//!
//! Strict resolution fails closed with [`SwapperError::Unauthenticated`].
//! The best-effort mode, used only by the marketplace listing, degrades any
//! failure to "anonymous".

pub mod extract;
pub mod token;

pub use extract::{Caller, MaybeCaller};
pub use token::{TokenClaims, TokenCodec};

use crate::domain::CallerIdentity;
use crate::error::SwapperError;

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves `Authorization` header values into caller identities.
#[derive(Debug, Clone)]
pub struct Authenticator {
    codec: TokenCodec,
}

impl Authenticator {
    /// Creates an authenticator backed by `codec`.
    #[must_use]
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    /// The token codec, for minting credentials.
    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Resolves the caller from a raw `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::Unauthenticated`] when the header is missing,
    /// does not use the `Bearer` scheme, carries an empty token, or the token
    /// fails verification.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<CallerIdentity, SwapperError> {
        let header = authorization.ok_or_else(|| {
            SwapperError::Unauthenticated("missing authorization header".to_string())
        })?;
        let token = header.strip_prefix(BEARER_PREFIX).ok_or_else(|| {
            SwapperError::Unauthenticated(
                "invalid authorization format, expected 'Bearer <token>'".to_string(),
            )
        })?;
        let token = token.trim();
        if token.is_empty() {
            return Err(SwapperError::Unauthenticated("empty bearer token".to_string()));
        }
        self.codec.verify(token).map(TokenClaims::into_identity)
    }

    /// Best-effort resolution: an absent header yields `None`, and so does an
    /// invalid one (logged at `warn`).
    #[must_use]
    pub fn authenticate_optional(&self, authorization: Option<&str>) -> Option<CallerIdentity> {
        let header = authorization?;
        match self.authenticate(Some(header)) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring invalid credential on optional route");
                None
            }
        }
    }
}
