//! Swap requests: a proposal to trade one slot for another.
//!
//! Status moves `pending → accepted` or `pending → rejected`; both are
//! terminal. The only way out of a terminal state is deleting the record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventId, SwapRequestId, UserId};
use crate::error::SwapperError;

/// Lifecycle state of a [`SwapRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    /// Awaiting the responder's decision.
    #[default]
    Pending,
    /// Ownership was exchanged.
    Accepted,
    /// Declined by the responder.
    Rejected,
}

impl SwapStatus {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwapStatus {
    type Err = SwapperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(SwapperError::Internal(format!(
                "unknown swap status {other:?}"
            ))),
        }
    }
}

/// Copy of an event's details taken when the request was created.
///
/// Later edits to the event are not reflected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SlotSnapshot {
    /// Referenced event.
    pub event_id: EventId,
    /// Title at creation time.
    pub title: String,
    /// Start at creation time.
    pub start: String,
    /// End at creation time.
    pub end: String,
}

/// A requester's offer to trade `offered_slot` for `requested_slot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Unique request identifier.
    pub id: SwapRequestId,
    /// User who proposed the swap.
    pub requester_id: UserId,
    /// Cached display name of the requester.
    pub requester_name: String,
    /// Owner of the requested event when the request was created.
    pub responder_id: UserId,
    /// Cached display name of the responder.
    pub responder_name: String,
    /// The requester's slot.
    pub offered_slot: SlotSnapshot,
    /// The responder's slot.
    pub requested_slot: SlotSnapshot,
    /// Current lifecycle state.
    pub status: SwapStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last status change.
    pub updated_at: DateTime<Utc>,
}

impl SwapRequest {
    /// Returns `true` if `user` is the requester or the responder.
    #[must_use]
    pub fn is_participant(&self, user: UserId) -> bool {
        self.requester_id == user || self.responder_id == user
    }

    /// Returns `true` if the request references `event` on either side.
    #[must_use]
    pub fn references(&self, event: EventId) -> bool {
        self.offered_slot.event_id == event || self.requested_slot.event_id == event
    }

    /// Fails unless `caller` is the responder.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::Forbidden`] for anyone else, including the
    /// requester.
    pub fn ensure_responder(&self, caller: UserId, action: &str) -> Result<(), SwapperError> {
        if self.responder_id == caller {
            Ok(())
        } else {
            Err(SwapperError::Forbidden(format!(
                "only the responder may {action} swap request {}",
                self.id
            )))
        }
    }

    /// Fails unless `caller` is a participant.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::Forbidden`] for non-participants.
    pub fn ensure_participant(&self, caller: UserId) -> Result<(), SwapperError> {
        if self.is_participant(caller) {
            Ok(())
        } else {
            Err(SwapperError::Forbidden(format!(
                "only the requester or responder may delete swap request {}",
                self.id
            )))
        }
    }

    /// Fails unless the request is still pending.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::Conflict`] for accepted or rejected requests.
    pub fn ensure_pending(&self) -> Result<(), SwapperError> {
        if self.status == SwapStatus::Pending {
            Ok(())
        } else {
            Err(SwapperError::Conflict(format!(
                "swap request {} is already {}",
                self.id, self.status
            )))
        }
    }

    /// Responder declines the request.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::Forbidden`] if `caller` is not the responder,
    /// or [`SwapperError::Conflict`] if the request is no longer pending.
    pub fn reject(&mut self, caller: UserId) -> Result<(), SwapperError> {
        self.ensure_responder(caller, "reject")?;
        self.ensure_pending()?;
        self.status = SwapStatus::Rejected;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Ordering used by incoming/outgoing listings: newest first.
pub fn sort_newest_first(requests: &mut [SwapRequest]) {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
