//! PostgreSQL implementation of [`SlotStore`].
//!
//! Guarded mutations run in a transaction and lock the rows they read with
//! `SELECT … FOR UPDATE`. Returning early with `?` drops the transaction,
//! which rolls it back, so a failed settlement never leaves a half-swapped
//! pair of events behind.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::models::{EVENT_COLUMNS, EventRow, SWAP_REQUEST_COLUMNS, SwapRequestRow};
use super::{SlotStore, pending_reference_conflict};
use crate::domain::swap_engine::{self, SettledSwap};
use crate::domain::{
    CallerIdentity, Event, EventId, EventStatus, SwapRequest, SwapRequestId, UserId,
};
use crate::error::SwapperError;

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`SwapperError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), SwapperError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| SwapperError::PersistenceError(e.to_string()))
    }
}

fn db_err(e: sqlx::Error) -> SwapperError {
    SwapperError::PersistenceError(e.to_string())
}

fn into_events(rows: Vec<EventRow>) -> Result<Vec<Event>, SwapperError> {
    rows.into_iter().map(Event::try_from).collect()
}

fn into_requests(rows: Vec<SwapRequestRow>) -> Result<Vec<SwapRequest>, SwapperError> {
    rows.into_iter().map(SwapRequest::try_from).collect()
}

async fn lock_event(conn: &mut PgConnection, id: EventId) -> Result<Event, SwapperError> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE");
    let row = sqlx::query_as::<_, EventRow>(&sql)
        .bind(Uuid::from(id))
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?
        .ok_or(SwapperError::EventNotFound(id))?;
    Event::try_from(row)
}

/// Locks the given events in id order, so concurrent transactions touching
/// the same pair cannot deadlock. Missing ids are simply absent from the map.
async fn lock_events(
    conn: &mut PgConnection,
    ids: &[EventId],
) -> Result<HashMap<EventId, Event>, SwapperError> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE id = ANY($1) ORDER BY id FOR UPDATE"
    );
    let ids: Vec<Uuid> = ids.iter().copied().map(Uuid::from).collect();
    let rows = sqlx::query_as::<_, EventRow>(&sql)
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;
    Ok(into_events(rows)?.into_iter().map(|e| (e.id, e)).collect())
}

async fn lock_request(
    conn: &mut PgConnection,
    id: SwapRequestId,
) -> Result<SwapRequest, SwapperError> {
    let sql = format!("SELECT {SWAP_REQUEST_COLUMNS} FROM swap_requests WHERE id = $1 FOR UPDATE");
    let row = sqlx::query_as::<_, SwapRequestRow>(&sql)
        .bind(Uuid::from(id))
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?
        .ok_or(SwapperError::SwapRequestNotFound(id))?;
    SwapRequest::try_from(row)
}

async fn write_event_state(conn: &mut PgConnection, event: &Event) -> Result<(), SwapperError> {
    sqlx::query(
        "UPDATE events SET status = $2, owner_id = $3, owner_name = $4, updated_at = $5 \
         WHERE id = $1",
    )
    .bind(Uuid::from(event.id))
    .bind(event.status.as_str())
    .bind(Uuid::from(event.owner_id))
    .bind(&event.owner_name)
    .bind(event.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;
    Ok(())
}

async fn write_request_status(
    conn: &mut PgConnection,
    request: &SwapRequest,
) -> Result<(), SwapperError> {
    sqlx::query("UPDATE swap_requests SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(Uuid::from(request.id))
        .bind(request.status.as_str())
        .bind(request.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;
    Ok(())
}

#[async_trait]
impl SlotStore for PostgresStore {
    async fn insert_event(&self, event: &Event) -> Result<(), SwapperError> {
        sqlx::query(
            "INSERT INTO events (id, title, start_at, end_at, status, owner_id, owner_name, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(Uuid::from(event.id))
        .bind(&event.title)
        .bind(&event.start)
        .bind(&event.end)
        .bind(event.status.as_str())
        .bind(Uuid::from(event.owner_id))
        .bind(&event.owner_name)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_event(&self, id: EventId) -> Result<Event, SwapperError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(SwapperError::EventNotFound(id))?;
        Event::try_from(row)
    }

    async fn list_events_by_owner(&self, owner: UserId) -> Result<Vec<Event>, SwapperError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE owner_id = $1 \
             ORDER BY start_at ASC, created_at ASC"
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(Uuid::from(owner))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        into_events(rows)
    }

    async fn list_swappable_events(
        &self,
        exclude_owner: Option<UserId>,
    ) -> Result<Vec<Event>, SwapperError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE status = $1 AND ($2::uuid IS NULL OR owner_id <> $2) \
             ORDER BY start_at ASC, created_at ASC"
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(EventStatus::Swappable.as_str())
            .bind(exclude_owner.map(Uuid::from))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        into_events(rows)
    }

    async fn update_event_status(
        &self,
        id: EventId,
        caller: UserId,
        status: EventStatus,
    ) -> Result<Event, SwapperError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut event = lock_event(&mut tx, id).await?;
        event.set_status(caller, status)?;
        write_event_state(&mut tx, &event).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(event)
    }

    async fn delete_event(&self, id: EventId, caller: UserId) -> Result<(), SwapperError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let event = lock_event(&mut tx, id).await?;
        event.ensure_owner(caller, "delete")?;

        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM swap_requests WHERE status = 'pending' \
             AND (offered_event_id = $1 OR requested_event_id = $1))",
        )
        .bind(Uuid::from(id))
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;
        if referenced {
            return Err(pending_reference_conflict(id));
        }

        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn create_swap_request(
        &self,
        target: EventId,
        offer: EventId,
        requester: &CallerIdentity,
    ) -> Result<SwapRequest, SwapperError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let locked = lock_events(&mut tx, &[target, offer]).await?;
        let target_event = locked
            .get(&target)
            .ok_or(SwapperError::EventNotFound(target))?;
        let offer_event = locked
            .get(&offer)
            .ok_or(SwapperError::EventNotFound(offer))?;
        let request = swap_engine::propose(requester, target_event, offer_event)?;

        let sql = format!(
            "INSERT INTO swap_requests ({SWAP_REQUEST_COLUMNS}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        );
        sqlx::query(&sql)
            .bind(Uuid::from(request.id))
            .bind(Uuid::from(request.requester_id))
            .bind(&request.requester_name)
            .bind(Uuid::from(request.responder_id))
            .bind(&request.responder_name)
            .bind(Uuid::from(request.offered_slot.event_id))
            .bind(&request.offered_slot.title)
            .bind(&request.offered_slot.start)
            .bind(&request.offered_slot.end)
            .bind(Uuid::from(request.requested_slot.event_id))
            .bind(&request.requested_slot.title)
            .bind(&request.requested_slot.start)
            .bind(&request.requested_slot.end)
            .bind(request.status.as_str())
            .bind(request.created_at)
            .bind(request.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(request)
    }

    async fn list_incoming(&self, responder: UserId) -> Result<Vec<SwapRequest>, SwapperError> {
        let sql = format!(
            "SELECT {SWAP_REQUEST_COLUMNS} FROM swap_requests WHERE responder_id = $1 \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, SwapRequestRow>(&sql)
            .bind(Uuid::from(responder))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        into_requests(rows)
    }

    async fn list_outgoing(&self, requester: UserId) -> Result<Vec<SwapRequest>, SwapperError> {
        let sql = format!(
            "SELECT {SWAP_REQUEST_COLUMNS} FROM swap_requests WHERE requester_id = $1 \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, SwapRequestRow>(&sql)
            .bind(Uuid::from(requester))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        into_requests(rows)
    }

    async fn accept_swap_request(
        &self,
        id: SwapRequestId,
        caller: UserId,
    ) -> Result<SettledSwap, SwapperError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let mut request = lock_request(&mut tx, id).await?;
        swap_engine::authorize_settlement(&request, caller)?;

        let offered_id = request.offered_slot.event_id;
        let requested_id = request.requested_slot.event_id;

        let mut locked = lock_events(&mut tx, &[offered_id, requested_id]).await?;
        let mut offered = locked
            .remove(&offered_id)
            .ok_or(SwapperError::EventNotFound(offered_id))?;
        let mut requested = locked
            .remove(&requested_id)
            .ok_or(SwapperError::EventNotFound(requested_id))?;

        swap_engine::settle(&mut request, &mut offered, &mut requested, caller)?;

        write_event_state(&mut tx, &offered).await?;
        write_event_state(&mut tx, &requested).await?;
        write_request_status(&mut tx, &request).await?;
        tx.commit().await.map_err(db_err)?;

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
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut request = lock_request(&mut tx, id).await?;
        request.reject(caller)?;
        write_request_status(&mut tx, &request).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(request)
    }

    async fn delete_swap_request(
        &self,
        id: SwapRequestId,
        caller: UserId,
    ) -> Result<(), SwapperError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let request = lock_request(&mut tx, id).await?;
        request.ensure_participant(caller)?;
        sqlx::query("DELETE FROM swap_requests WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }
}
