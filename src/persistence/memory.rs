//! In-memory [`SlotStore`] used when persistence is disabled and in tests.
//!
//! Both tables live behind one [`tokio::sync::RwLock`]. Reads share the
//! lock; every guarded mutation holds the write guard from its first check
//! to its last write, which makes the multi-record swap settlement atomic
//! with respect to every other operation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SlotStore, pending_reference_conflict};
use crate::domain::event::sort_by_start;
use crate::domain::swap_engine::{self, SettledSwap};
use crate::domain::swap_request::sort_newest_first;
use crate::domain::{
    CallerIdentity, Event, EventId, EventStatus, SwapRequest, SwapRequestId, SwapStatus, UserId,
};
use crate::error::SwapperError;

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, Event>,
    requests: HashMap<SwapRequestId, SwapRequest>,
}

/// Process-local store backed by hash maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotStore for MemoryStore {
    async fn insert_event(&self, event: &Event) -> Result<(), SwapperError> {
        let mut tables = self.tables.write().await;
        if tables.events.contains_key(&event.id) {
            return Err(SwapperError::Conflict(format!(
                "event {} already exists",
                event.id
            )));
        }
        tables.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn get_event(&self, id: EventId) -> Result<Event, SwapperError> {
        let tables = self.tables.read().await;
        tables
            .events
            .get(&id)
            .cloned()
            .ok_or(SwapperError::EventNotFound(id))
    }

    async fn list_events_by_owner(&self, owner: UserId) -> Result<Vec<Event>, SwapperError> {
        let tables = self.tables.read().await;
        let mut events: Vec<Event> = tables
            .events
            .values()
            .filter(|e| e.is_owned_by(owner))
            .cloned()
            .collect();
        sort_by_start(&mut events);
        Ok(events)
    }

    async fn list_swappable_events(
        &self,
        exclude_owner: Option<UserId>,
    ) -> Result<Vec<Event>, SwapperError> {
        let tables = self.tables.read().await;
        let mut events: Vec<Event> = tables
            .events
            .values()
            .filter(|e| e.status == EventStatus::Swappable)
            .filter(|e| exclude_owner.is_none_or(|owner| !e.is_owned_by(owner)))
            .cloned()
            .collect();
        sort_by_start(&mut events);
        Ok(events)
    }

    async fn update_event_status(
        &self,
        id: EventId,
        caller: UserId,
        status: EventStatus,
    ) -> Result<Event, SwapperError> {
        let mut tables = self.tables.write().await;
        let event = tables
            .events
            .get_mut(&id)
            .ok_or(SwapperError::EventNotFound(id))?;
        event.set_status(caller, status)?;
        Ok(event.clone())
    }

    async fn delete_event(&self, id: EventId, caller: UserId) -> Result<(), SwapperError> {
        let mut tables = self.tables.write().await;
        let event = tables
            .events
            .get(&id)
            .ok_or(SwapperError::EventNotFound(id))?;
        event.ensure_owner(caller, "delete")?;
        let referenced = tables
            .requests
            .values()
            .any(|r| r.status == SwapStatus::Pending && r.references(id));
        if referenced {
            return Err(pending_reference_conflict(id));
        }
        tables.events.remove(&id);
        Ok(())
    }

    async fn create_swap_request(
        &self,
        target: EventId,
        offer: EventId,
        requester: &CallerIdentity,
    ) -> Result<SwapRequest, SwapperError> {
        let mut tables = self.tables.write().await;
        let target_event = tables
            .events
            .get(&target)
            .ok_or(SwapperError::EventNotFound(target))?;
        let offer_event = tables
            .events
            .get(&offer)
            .ok_or(SwapperError::EventNotFound(offer))?;
        let request = swap_engine::propose(requester, target_event, offer_event)?;
        tables.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn list_incoming(&self, responder: UserId) -> Result<Vec<SwapRequest>, SwapperError> {
        let tables = self.tables.read().await;
        let mut requests: Vec<SwapRequest> = tables
            .requests
            .values()
            .filter(|r| r.responder_id == responder)
            .cloned()
            .collect();
        sort_newest_first(&mut requests);
        Ok(requests)
    }

    async fn list_outgoing(&self, requester: UserId) -> Result<Vec<SwapRequest>, SwapperError> {
        let tables = self.tables.read().await;
        let mut requests: Vec<SwapRequest> = tables
            .requests
            .values()
            .filter(|r| r.requester_id == requester)
            .cloned()
            .collect();
        sort_newest_first(&mut requests);
        Ok(requests)
    }

    async fn accept_swap_request(
        &self,
        id: SwapRequestId,
        caller: UserId,
    ) -> Result<SettledSwap, SwapperError> {
        let mut guard = self.tables.write().await;
        let Tables { events, requests } = &mut *guard;

        let mut request = requests
            .get(&id)
            .cloned()
            .ok_or(SwapperError::SwapRequestNotFound(id))?;
        swap_engine::authorize_settlement(&request, caller)?;

        let offered_id = request.offered_slot.event_id;
        let requested_id = request.requested_slot.event_id;
        let mut offered = events
            .get(&offered_id)
            .cloned()
            .ok_or(SwapperError::EventNotFound(offered_id))?;
        let mut requested = events
            .get(&requested_id)
            .cloned()
            .ok_or(SwapperError::EventNotFound(requested_id))?;

        swap_engine::settle(&mut request, &mut offered, &mut requested, caller)?;

        events.insert(offered.id, offered.clone());
        events.insert(requested.id, requested.clone());
        requests.insert(request.id, request.clone());

        Ok(SettledSwap {
            request,
            offered_event: offered,
            requested_event: requested,
        })
    }

    async fn reject_swap_request(
        &self,
        id: SwapRequestId,
        caller: UserId,
    ) -> Result<SwapRequest, SwapperError> {
        let mut tables = self.tables.write().await;
        let request = tables
            .requests
            .get_mut(&id)
            .ok_or(SwapperError::SwapRequestNotFound(id))?;
        request.reject(caller)?;
        Ok(request.clone())
    }

    async fn delete_swap_request(
        &self,
        id: SwapRequestId,
        caller: UserId,
    ) -> Result<(), SwapperError> {
        let mut tables = self.tables.write().await;
        let request = tables
            .requests
            .get(&id)
            .ok_or(SwapperError::SwapRequestNotFound(id))?;
        request.ensure_participant(caller)?;
        tables.requests.remove(&id);
        Ok(())
    }
}
