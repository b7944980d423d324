//! Event service: create, list, update and delete time slots.

use std::sync::Arc;

use crate::domain::{CallerIdentity, Event, EventId, EventStatus, NewEvent, UserId};
use crate::error::SwapperError;
use crate::persistence::SlotStore;

/// Orchestration layer for event operations.
#[derive(Debug, Clone)]
pub struct EventService {
    store: Arc<dyn SlotStore>,
}

impl EventService {
    /// Creates a new `EventService`.
    #[must_use]
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    /// Creates an event owned by `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::InvalidRequest`] for blank fields or an end
    /// before the start, or a storage error.
    pub async fn create_event(
        &self,
        caller: &CallerIdentity,
        draft: NewEvent,
    ) -> Result<Event, SwapperError> {
        let event = Event::create(draft, caller);
        self.store.insert_event(&event).await?;
        tracing::info!(
            event_id = %event.id,
            owner_id = %caller.user_id,
            status = %event.status,
            "event created"
        );
        Ok(event)
    }

    /// Events owned by `owner`, ordered by start.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn list_owned_events(&self, owner: UserId) -> Result<Vec<Event>, SwapperError> {
        self.store.list_events_by_owner(owner).await
    }

    /// Swappable events, excluding the viewer's own when one is given.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn list_marketplace(
        &self,
        viewer: Option<UserId>,
    ) -> Result<Vec<Event>, SwapperError> {
        self.store.list_swappable_events(viewer).await
    }

    /// Parses `status` and applies it to the caller's event.
    ///
    /// # Errors
    ///
    /// [`SwapperError::InvalidStatus`] for unknown values,
    /// [`SwapperError::EventNotFound`] or [`SwapperError::Forbidden`].
    pub async fn set_status(
        &self,
        id: EventId,
        caller: UserId,
        status: &str,
    ) -> Result<Event, SwapperError> {
        let status: EventStatus = status.parse()?;
        let event = self.store.update_event_status(id, caller, status).await?;
        tracing::info!(event_id = %id, status = %status, "event status changed");
        Ok(event)
    }

    /// Deletes the caller's event.
    ///
    /// # Errors
    ///
    /// [`SwapperError::EventNotFound`], [`SwapperError::Forbidden`], or
    /// [`SwapperError::Conflict`] while a pending request references it.
    pub async fn delete_event(&self, id: EventId, caller: UserId) -> Result<(), SwapperError> {
        self.store.delete_event(id, caller).await?;
        tracing::info!(event_id = %id, "event deleted");
        Ok(())
    }
}
