//! Swap request DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EventResponse;
use crate::domain::{
    EventId, SettledSwap, SlotSnapshot, SwapRequest, SwapRequestId, SwapStatus, UserId,
};

/// Request body for `POST /requests`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSwapRequest {
    /// The event the caller wants.
    #[serde(default)]
    pub target_event_id: Option<EventId>,
    /// The caller's event offered in exchange.
    #[serde(default)]
    pub offer_event_id: Option<EventId>,
}

/// A swap request as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SwapRequestResponse {
    /// Request identifier.
    pub id: SwapRequestId,
    /// Proposing user.
    pub requester_id: UserId,
    /// Requester display name.
    pub requester_name: String,
    /// User asked to answer.
    pub responder_id: UserId,
    /// Responder display name.
    pub responder_name: String,
    /// Snapshot of the requester's slot.
    pub offered_slot: SlotSnapshot,
    /// Snapshot of the responder's slot.
    pub requested_slot: SlotSnapshot,
    /// `pending`, `accepted` or `rejected`.
    pub status: SwapStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

impl From<SwapRequest> for SwapRequestResponse {
    fn from(request: SwapRequest) -> Self {
        Self {
            id: request.id,
            requester_id: request.requester_id,
            requester_name: request.requester_name,
            responder_id: request.responder_id,
            responder_name: request.responder_name,
            offered_slot: request.offered_slot,
            requested_slot: request.requested_slot,
            status: request.status,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// Response body for `PATCH /requests/{id}/accept`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AcceptSwapResponse {
    /// Confirmation text.
    pub message: String,
    /// The request, now `accepted`.
    pub request: SwapRequestResponse,
    /// The offered slot, now owned by the responder.
    pub offered_event: EventResponse,
    /// The requested slot, now owned by the requester.
    pub requested_event: EventResponse,
}

impl From<SettledSwap> for AcceptSwapResponse {
    fn from(settled: SettledSwap) -> Self {
        Self {
            message: "swap accepted".to_string(),
            request: settled.request.into(),
            offered_event: settled.offered_event.into(),
            requested_event: settled.requested_event.into(),
        }
    }
}

/// Response body for `PATCH /requests/{id}/reject`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RejectSwapResponse {
    /// Confirmation text.
    pub message: String,
    /// The request, now `rejected`.
    pub request: SwapRequestResponse,
}
