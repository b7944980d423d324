//! Resolved identity of the user performing an operation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Caller identity handed to the core after credential validation.
///
/// The display name is a cache copied into the records the caller creates
/// (`owner_name`, `requester_name`); it is never used for authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CallerIdentity {
    /// Stable user identifier.
    pub user_id: UserId,
    /// Display name at the time the credential was issued.
    pub name: String,
}

impl CallerIdentity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
        }
    }
}
