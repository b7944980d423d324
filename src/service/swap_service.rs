//! Swap service: proposes, settles and withdraws slot swaps.

use std::sync::Arc;

use crate::domain::{CallerIdentity, EventId, SettledSwap, SwapRequest, SwapRequestId, UserId};
use crate::error::SwapperError;
use crate::persistence::SlotStore;

/// Orchestration layer for the swap negotiation workflow.
///
/// Proposals and settlements both run inside the store, so the events they
/// validate against cannot change before the write lands.
#[derive(Debug, Clone)]
pub struct SwapService {
    store: Arc<dyn SlotStore>,
}

impl SwapService {
    /// Creates a new `SwapService`.
    #[must_use]
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    /// Proposes trading `offer` (owned by the caller) for `target`.
    ///
    /// # Errors
    ///
    /// [`SwapperError::EventNotFound`] if either event is missing, plus the
    /// errors of [`crate::domain::swap_engine::propose`].
    pub async fn create_swap(
        &self,
        caller: &CallerIdentity,
        target: EventId,
        offer: EventId,
    ) -> Result<SwapRequest, SwapperError> {
        let request = self.store.create_swap_request(target, offer, caller).await?;
        tracing::info!(
            request_id = %request.id,
            requester_id = %request.requester_id,
            responder_id = %request.responder_id,
            offered_event_id = %offer,
            requested_event_id = %target,
            "swap requested"
        );
        Ok(request)
    }

    /// Requests awaiting the caller's answer, and past ones, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn list_incoming(&self, caller: UserId) -> Result<Vec<SwapRequest>, SwapperError> {
        self.store.list_incoming(caller).await
    }

    /// Requests made by the caller, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn list_outgoing(&self, caller: UserId) -> Result<Vec<SwapRequest>, SwapperError> {
        self.store.list_outgoing(caller).await
    }

    /// Accepts a pending request, exchanging slot ownership.
    ///
    /// # Errors
    ///
    /// [`SwapperError::SwapRequestNotFound`], [`SwapperError::Forbidden`],
    /// [`SwapperError::Conflict`] or [`SwapperError::EventNotFound`]; on any
    /// error no record is modified.
    pub async fn accept_swap(
        &self,
        id: SwapRequestId,
        caller: UserId,
    ) -> Result<SettledSwap, SwapperError> {
        let settled = self.store.accept_swap_request(id, caller).await?;
        tracing::info!(
            request_id = %id,
            offered_event_id = %settled.offered_event.id,
            offered_new_owner = %settled.offered_event.owner_id,
            requested_event_id = %settled.requested_event.id,
            requested_new_owner = %settled.requested_event.owner_id,
            "swap accepted"
        );
        Ok(settled)
    }

    /// Rejects a pending request. Events are untouched.
    ///
    /// # Errors
    ///
    /// [`SwapperError::SwapRequestNotFound`], [`SwapperError::Forbidden`] or
    /// [`SwapperError::Conflict`].
    pub async fn reject_swap(
        &self,
        id: SwapRequestId,
        caller: UserId,
    ) -> Result<SwapRequest, SwapperError> {
        let request = self.store.reject_swap_request(id, caller).await?;
        tracing::info!(request_id = %id, "swap rejected");
        Ok(request)
    }

    /// Deletes a request the caller participates in, in any status.
    ///
    /// # Errors
    ///
    /// [`SwapperError::SwapRequestNotFound`] or [`SwapperError::Forbidden`].
    pub async fn delete_swap(&self, id: SwapRequestId, caller: UserId) -> Result<(), SwapperError> {
        self.store.delete_swap_request(id, caller).await?;
        tracing::info!(request_id = %id, "swap request deleted");
        Ok(())
    }
}
