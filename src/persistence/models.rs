//! Database row models for the `events` and `swap_requests` tables.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Event, EventId, EventStatus, SlotSnapshot, SwapRequest, SwapRequestId, SwapStatus, UserId,
};
use crate::error::SwapperError;

/// Column list matching [`EventRow`].
pub const EVENT_COLUMNS: &str =
    "id, title, start_at, end_at, status, owner_id, owner_name, created_at, updated_at";

/// Column list matching [`SwapRequestRow`].
pub const SWAP_REQUEST_COLUMNS: &str = "id, requester_id, requester_name, responder_id, \
     responder_name, offered_event_id, offered_title, offered_start, offered_end, \
     requested_event_id, requested_title, requested_start, requested_end, status, \
     created_at, updated_at";

/// A stored row from the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Primary key.
    pub id: Uuid,
    /// Slot title.
    pub title: String,
    /// Start timestamp (opaque text).
    pub start_at: String,
    /// End timestamp (opaque text).
    pub end_at: String,
    /// `Busy` or `Swappable`.
    pub status: String,
    /// Current owner.
    pub owner_id: Uuid,
    /// Cached owner display name.
    pub owner_name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = SwapperError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let status: EventStatus = row.status.parse().map_err(|_| {
            SwapperError::PersistenceError(format!(
                "event {} has unknown status {:?}",
                row.id, row.status
            ))
        })?;
        Ok(Self {
            id: EventId::from_uuid(row.id),
            title: row.title,
            start: row.start_at,
            end: row.end_at,
            status,
            owner_id: UserId::from_uuid(row.owner_id),
            owner_name: row.owner_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A stored row from the `swap_requests` table. Slot snapshots are
/// flattened into `offered_*` / `requested_*` columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SwapRequestRow {
    /// Primary key.
    pub id: Uuid,
    /// Requesting user.
    pub requester_id: Uuid,
    /// Cached requester display name.
    pub requester_name: String,
    /// Responding user.
    pub responder_id: Uuid,
    /// Cached responder display name.
    pub responder_name: String,
    /// Offered event id.
    pub offered_event_id: Uuid,
    /// Offered slot title snapshot.
    pub offered_title: String,
    /// Offered slot start snapshot.
    pub offered_start: String,
    /// Offered slot end snapshot.
    pub offered_end: String,
    /// Requested event id.
    pub requested_event_id: Uuid,
    /// Requested slot title snapshot.
    pub requested_title: String,
    /// Requested slot start snapshot.
    pub requested_start: String,
    /// Requested slot end snapshot.
    pub requested_end: String,
    /// `pending`, `accepted` or `rejected`.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SwapRequestRow> for SwapRequest {
    type Error = SwapperError;

    fn try_from(row: SwapRequestRow) -> Result<Self, Self::Error> {
        let status: SwapStatus = row.status.parse().map_err(|_| {
            SwapperError::PersistenceError(format!(
                "swap request {} has unknown status {:?}",
                row.id, row.status
            ))
        })?;
        Ok(Self {
            id: SwapRequestId::from_uuid(row.id),
            requester_id: UserId::from_uuid(row.requester_id),
            requester_name: row.requester_name,
            responder_id: UserId::from_uuid(row.responder_id),
            responder_name: row.responder_name,
            offered_slot: SlotSnapshot {
                event_id: EventId::from_uuid(row.offered_event_id),
                title: row.offered_title,
                start: row.offered_start,
                end: row.offered_end,
            },
            requested_slot: SlotSnapshot {
                event_id: EventId::from_uuid(row.requested_event_id),
                title: row.requested_title,
                start: row.requested_start,
                end: row.requested_end,
            },
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
