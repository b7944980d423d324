//! Persistence layer: the [`SlotStore`] trait and its implementations.
//!
//! Guarded mutations (`create_swap_request`, `update_event_status`,
//! `delete_event`, `accept_swap_request`, `reject_swap_request`,
//! `delete_swap_request`) take the caller's identity and perform their authorization and state checks
//! inside the same atomic unit as the write, so no concurrent operation can
//! slip in between check and act.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::domain::{
    CallerIdentity, Event, EventId, EventStatus, SettledSwap, SwapRequest, SwapRequestId, UserId,
};
use crate::error::SwapperError;

/// Storage for events and swap requests.
#[async_trait]
pub trait SlotStore: Send + Sync + std::fmt::Debug {
    /// Persists a new event.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::PersistenceError`] on storage failure.
    async fn insert_event(&self, event: &Event) -> Result<(), SwapperError>;

    /// Loads a single event.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::EventNotFound`] if no such event exists.
    async fn get_event(&self, id: EventId) -> Result<Event, SwapperError>;

    /// Events owned by `owner`, ordered by start ascending.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::PersistenceError`] on storage failure.
    async fn list_events_by_owner(&self, owner: UserId) -> Result<Vec<Event>, SwapperError>;

    /// Swappable events, optionally excluding one owner's, ordered by start.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::PersistenceError`] on storage failure.
    async fn list_swappable_events(
        &self,
        exclude_owner: Option<UserId>,
    ) -> Result<Vec<Event>, SwapperError>;

    /// Owner-only status change.
    ///
    /// # Errors
    ///
    /// [`SwapperError::EventNotFound`] or [`SwapperError::Forbidden`].
    async fn update_event_status(
        &self,
        id: EventId,
        caller: UserId,
        status: EventStatus,
    ) -> Result<Event, SwapperError>;

    /// Owner-only delete, refused while a pending request references the event.
    ///
    /// # Errors
    ///
    /// [`SwapperError::EventNotFound`], [`SwapperError::Forbidden`] or
    /// [`SwapperError::Conflict`].
    async fn delete_event(&self, id: EventId, caller: UserId) -> Result<(), SwapperError>;

    /// Proposes trading `offer` for `target` on behalf of `requester`.
    ///
    /// Both events are read, validated by
    /// [`crate::domain::swap_engine::propose`] and the pending request is
    /// stored in one atomic unit, so neither event can be deleted or change
    /// hands in between.
    ///
    /// # Errors
    ///
    /// [`SwapperError::EventNotFound`] (target checked first), plus the
    /// errors of [`crate::domain::swap_engine::propose`].
    async fn create_swap_request(
        &self,
        target: EventId,
        offer: EventId,
        requester: &CallerIdentity,
    ) -> Result<SwapRequest, SwapperError>;

    /// Requests where `responder` is the responder, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::PersistenceError`] on storage failure.
    async fn list_incoming(&self, responder: UserId) -> Result<Vec<SwapRequest>, SwapperError>;

    /// Requests where `requester` is the requester, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SwapperError::PersistenceError`] on storage failure.
    async fn list_outgoing(&self, requester: UserId) -> Result<Vec<SwapRequest>, SwapperError>;

    /// Accepts a pending request and exchanges slot ownership atomically.
    ///
    /// # Errors
    ///
    /// See [`crate::domain::swap_engine::settle`]; additionally
    /// [`SwapperError::SwapRequestNotFound`] / [`SwapperError::EventNotFound`].
    async fn accept_swap_request(
        &self,
        id: SwapRequestId,
        caller: UserId,
    ) -> Result<SettledSwap, SwapperError>;

    /// Responder-only rejection of a pending request.
    ///
    /// # Errors
    ///
    /// [`SwapperError::SwapRequestNotFound`], [`SwapperError::Forbidden`] or
    /// [`SwapperError::Conflict`].
    async fn reject_swap_request(
        &self,
        id: SwapRequestId,
        caller: UserId,
    ) -> Result<SwapRequest, SwapperError>;

    /// Participant-only delete, in any status.
    ///
    /// # Errors
    ///
    /// [`SwapperError::SwapRequestNotFound`] or [`SwapperError::Forbidden`].
    async fn delete_swap_request(
        &self,
        id: SwapRequestId,
        caller: UserId,
    ) -> Result<(), SwapperError>;
}

/// Error returned when deleting an event still referenced by a pending request.
pub(crate) fn pending_reference_conflict(id: EventId) -> SwapperError {
    SwapperError::Conflict(format!(
        "event {id} is referenced by a pending swap request"
    ))
}
