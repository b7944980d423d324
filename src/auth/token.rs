//! HS256 JSON Web Tokens.
//!
//! Claims are `{ "id": <user uuid>, "name": <display name>, "exp": <unix secs> }`.
//! Extra claims set by the issuer (`email`, `iat`) are ignored.

use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{CallerIdentity, UserId};
use crate::error::SwapperError;

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id.
    pub id: UserId,
    /// Display name at issuance.
    pub name: String,
    /// Expiry as unix seconds. The token is invalid from this instant on.
    pub exp: i64,
}

impl TokenClaims {
    /// Converts the claims into the identity handed to the core.
    #[must_use]
    pub fn into_identity(self) -> CallerIdentity {
        CallerIdentity::new(self.id, self.name)
    }
}

/// Issues and verifies HS256 bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("key", &"<redacted>")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl TokenCodec {
    /// Creates a codec from the shared secret and the lifetime of minted tokens.
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>, ttl_secs: u64) -> Self {
        let secret = secret.as_ref();
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Mints a token for `identity` valid from now for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::Internal`] if the token cannot be encoded.
    pub fn issue(&self, identity: &CallerIdentity) -> Result<String, SwapperError> {
        self.issue_at(identity, Utc::now())
    }

    /// Mints a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::Internal`] if the token cannot be encoded.
    pub fn issue_at(
        &self,
        identity: &CallerIdentity,
        now: DateTime<Utc>,
    ) -> Result<String, SwapperError> {
        let claims = TokenClaims {
            id: identity.user_id,
            name: identity.name.clone(),
            exp: now.timestamp().saturating_add(self.ttl_secs),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SwapperError::Internal(format!("token encoding: {e}")))
    }

    /// Verifies `token` against the current time.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::Unauthenticated`] on any encoding, algorithm,
    /// signature, claims or expiry failure.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, SwapperError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies `token` as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::Unauthenticated`] on any encoding, algorithm,
    /// signature, claims or expiry failure.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, SwapperError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| SwapperError::Unauthenticated(format!("invalid token: {e}")))?;
        if now.timestamp() >= data.claims.exp {
            return Err(SwapperError::Unauthenticated("token expired".to_string()));
        }
        Ok(data.claims)
    }
}
