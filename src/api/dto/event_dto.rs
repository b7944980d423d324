//! Event DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Event, EventId, EventStatus, UserId};

/// Request body for `POST /events`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Slot title.
    #[serde(default)]
    pub title: String,
    /// Start timestamp (any consistently ordered text, e.g. ISO-8601).
    #[serde(default)]
    pub start: String,
    /// End timestamp, not before `start`.
    #[serde(default)]
    pub end: String,
    /// `Busy` (default) or `Swappable`.
    #[serde(default)]
    pub status: Option<String>,
}

/// Request body for `PATCH /events/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// `Busy` or `Swappable`.
    #[serde(default)]
    pub status: String,
}

/// An event as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventResponse {
    /// Event identifier.
    pub id: EventId,
    /// Slot title.
    pub title: String,
    /// Start timestamp.
    pub start: String,
    /// End timestamp.
    pub end: String,
    /// Current status.
    pub status: EventStatus,
    /// Current owner.
    pub owner_id: UserId,
    /// Owner display name.
    pub owner_name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            start: event.start,
            end: event.end,
            status: event.status,
            owner_id: event.owner_id,
            owner_name: event.owner_name,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}
