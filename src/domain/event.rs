//! Time slot records ("events") and their status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CallerIdentity, EventId, SlotSnapshot, UserId};
use crate::error::SwapperError;

/// Whether a slot is offered for trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum EventStatus {
    /// Not offered.
    #[default]
    Busy,
    /// Open to trade on the marketplace.
    Swappable,
}

impl EventStatus {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Busy => "Busy",
            Self::Swappable => "Swappable",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = SwapperError;

    /// Parses the exact wire value; anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Busy" => Ok(Self::Busy),
            "Swappable" => Ok(Self::Swappable),
            other => Err(SwapperError::InvalidStatus(format!(
                "{other:?} (expected \"Busy\" or \"Swappable\")"
            ))),
        }
    }
}

/// Validated input for a new event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Slot title.
    pub title: String,
    /// Start timestamp (opaque, lexicographically ordered).
    pub start: String,
    /// End timestamp (opaque, lexicographically ordered).
    pub end: String,
    /// Initial status.
    pub status: EventStatus,
}

impl NewEvent {
    /// Builds a new-event draft, trimming and validating its fields.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::InvalidRequest`] if a field is blank or
    /// `end` orders before `start`.
    pub fn new(
        title: &str,
        start: &str,
        end: &str,
        status: EventStatus,
    ) -> Result<Self, SwapperError> {
        let title = required("title", title)?;
        let start = required("start", start)?;
        let end = required("end", end)?;
        if end < start {
            return Err(SwapperError::InvalidRequest(format!(
                "end ({end}) must not be before start ({start})"
            )));
        }
        Ok(Self {
            title,
            start,
            end,
            status,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, SwapperError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SwapperError::InvalidRequest(format!("missing {field}")));
    }
    Ok(trimmed.to_string())
}

/// A time slot owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier (immutable after creation).
    pub id: EventId,
    /// Slot title.
    pub title: String,
    /// Start timestamp.
    pub start: String,
    /// End timestamp.
    pub end: String,
    /// Busy or Swappable.
    pub status: EventStatus,
    /// Current owner. Changed only by an accepted swap.
    pub owner_id: UserId,
    /// Cached display name of the owner.
    pub owner_name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Creates an event owned by `owner`.
    #[must_use]
    pub fn create(draft: NewEvent, owner: &CallerIdentity) -> Self {
        let now = Utc::now();
        Self {
            id: EventId::new(),
            title: draft.title,
            start: draft.start,
            end: draft.end,
            status: draft.status,
            owner_id: owner.user_id,
            owner_name: owner.name.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` if `user` currently owns this event.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    /// Fails with [`SwapperError::Forbidden`] unless `caller` owns the event.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::Forbidden`] for any non-owner.
    pub fn ensure_owner(&self, caller: UserId, action: &str) -> Result<(), SwapperError> {
        if self.is_owned_by(caller) {
            Ok(())
        } else {
            Err(SwapperError::Forbidden(format!(
                "only the owner may {action} event {}",
                self.id
            )))
        }
    }

    /// Owner-initiated status change.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::Forbidden`] if `caller` is not the owner.
    pub fn set_status(&mut self, caller: UserId, status: EventStatus) -> Result<(), SwapperError> {
        self.ensure_owner(caller, "update")?;
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Immutable copy of the slot details for a swap request.
    #[must_use]
    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            event_id: self.id,
            title: self.title.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }
}

/// Ordering used by every event listing: `start` ascending, then creation.
pub fn sort_by_start(events: &mut [Event]) {
    events.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn alice() -> CallerIdentity {
        CallerIdentity::new(UserId::new(), "alice")
    }

    fn draft(start: &str) -> NewEvent {
        let Ok(draft) = NewEvent::new("Shift", start, "2024-12-31T23:59", EventStatus::Busy) else {
            panic!("valid draft");
        };
        draft
    }

    #[test]
    fn status_parses_exact_values_only() {
        assert!(matches!("Busy".parse(), Ok(EventStatus::Busy)));
        assert!(matches!("Swappable".parse(), Ok(EventStatus::Swappable)));
        for bad in ["busy", "SWAPPABLE", "", "Pending"] {
            assert!(matches!(
                bad.parse::<EventStatus>(),
                Err(SwapperError::InvalidStatus(_))
            ));
        }
    }

    #[test]
    fn status_serializes_as_wire_value() {
        let Ok(json) = serde_json::to_string(&EventStatus::Swappable) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"Swappable\"");
    }

    #[test]
    fn new_event_rejects_blank_fields() {
        let result = NewEvent::new("  ", "2024-01-01T09:00", "2024-01-01T17:00", EventStatus::Busy);
        assert!(matches!(result, Err(SwapperError::InvalidRequest(_))));
        let result = NewEvent::new("Shift", "", "2024-01-01T17:00", EventStatus::Busy);
        assert!(matches!(result, Err(SwapperError::InvalidRequest(_))));
    }

    #[test]
    fn new_event_rejects_end_before_start() {
        let result = NewEvent::new(
            "Shift",
            "2024-01-01T17:00",
            "2024-01-01T09:00",
            EventStatus::Busy,
        );
        assert!(matches!(result, Err(SwapperError::InvalidRequest(_))));
    }

    #[test]
    fn create_assigns_owner() {
        let owner = alice();
        let event = Event::create(draft("2024-01-01T09:00"), &owner);
        assert!(event.is_owned_by(owner.user_id));
        assert_eq!(event.owner_name, "alice");
        assert_eq!(event.status, EventStatus::Busy);
    }

    #[test]
    fn only_owner_sets_status() {
        let owner = alice();
        let mut event = Event::create(draft("2024-01-01T09:00"), &owner);

        let denied = event.set_status(UserId::new(), EventStatus::Swappable);
        assert!(matches!(denied, Err(SwapperError::Forbidden(_))));
        assert_eq!(event.status, EventStatus::Busy);

        assert!(event.set_status(owner.user_id, EventStatus::Swappable).is_ok());
        assert_eq!(event.status, EventStatus::Swappable);
    }

    #[test]
    fn sort_orders_by_start() {
        let owner = alice();
        let mut events = vec![
            Event::create(draft("2024-03-01T09:00"), &owner),
            Event::create(draft("2024-01-01T09:00"), &owner),
            Event::create(draft("2024-02-01T09:00"), &owner),
        ];
        sort_by_start(&mut events);
        let starts: Vec<&str> = events.iter().map(|e| e.start.as_str()).collect();
        assert_eq!(
            starts,
            ["2024-01-01T09:00", "2024-02-01T09:00", "2024-03-01T09:00"]
        );
    }

    #[test]
    fn sort_compares_start_bytewise() {
        // Locale collations would ignore the separator and case and order by the
        // hour instead. The `start_at` column is declared `COLLATE "C"` to match.
        let owner = alice();
        let mut events = vec![
            Event::create(draft("2024-01-01t08:00"), &owner),
            Event::create(draft("2024-01-01T10:00"), &owner),
            Event::create(draft("2024-01-01 11:00"), &owner),
        ];
        sort_by_start(&mut events);
        let starts: Vec<&str> = events.iter().map(|e| e.start.as_str()).collect();
        assert_eq!(
            starts,
            ["2024-01-01 11:00", "2024-01-01T10:00", "2024-01-01t08:00"]
        );
    }
}
