//! Event handlers: create, list, marketplace, status update, delete.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{CreateEventRequest, EventResponse, MessageResponse, UpdateStatusRequest};
use crate::api::extract::{ApiJson, ApiPath};
use crate::app_state::AppState;
use crate::auth::{Caller, MaybeCaller};
use crate::domain::{Event, EventId, EventStatus, NewEvent};
use crate::error::{ErrorResponse, SwapperError};

fn to_responses(events: Vec<Event>) -> Vec<EventResponse> {
    events.into_iter().map(EventResponse::from).collect()
}

/// `POST /events` — Create an event owned by the caller.
///
/// # Errors
///
/// Returns [`SwapperError`] on missing fields, a bad status or a bad credential.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Create an event",
    description = "Creates a time slot owned by the caller. `status` defaults to `Busy`.",
    request_body = CreateEventRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Missing field or invalid status", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> Result<impl IntoResponse, SwapperError> {
    let status = match req.status.as_deref() {
        Some(raw) => raw.parse()?,
        None => EventStatus::default(),
    };
    let draft = NewEvent::new(&req.title, &req.start, &req.end, status)?;
    let event = state.event_service.create_event(&caller, draft).await?;
    Ok((StatusCode::CREATED, Json(EventResponse::from(event))))
}

/// `GET /events/mine` — The caller's events, ordered by start.
///
/// # Errors
///
/// Returns [`SwapperError`] on a bad credential or storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/events/mine",
    tag = "Events",
    summary = "List own events",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's events", body = Vec<EventResponse>),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
    )
)]
pub async fn list_my_events(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<Vec<EventResponse>>, SwapperError> {
    let events = state.event_service.list_owned_events(caller.user_id).await?;
    Ok(Json(to_responses(events)))
}

/// `GET /events/marketplace` — Swappable events of other users.
///
/// Works without a credential. An invalid credential is ignored.
///
/// # Errors
///
/// Returns [`SwapperError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/events/marketplace",
    tag = "Events",
    summary = "Browse the marketplace",
    description = "Lists every Swappable event ordered by start. When a valid bearer credential is sent, the caller's own events are excluded.",
    security((), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Swappable events", body = Vec<EventResponse>),
    )
)]
pub async fn list_marketplace(
    State(state): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
) -> Result<Json<Vec<EventResponse>>, SwapperError> {
    let viewer = caller.map(|c| c.user_id);
    let events = state.event_service.list_marketplace(viewer).await?;
    Ok(Json(to_responses(events)))
}

/// `PATCH /events/{id}` — Change the status of the caller's event.
///
/// # Errors
///
/// Returns [`SwapperError`] on an invalid status, missing event or non-owner.
#[utoipa::path(
    patch,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Set event status",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = UpdateStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 400, description = "Invalid status", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn update_event_status(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<EventId>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<Json<EventResponse>, SwapperError> {
    let event = state
        .event_service
        .set_status(id, caller.user_id, &req.status)
        .await?;
    Ok(Json(event.into()))
}

/// `DELETE /events/{id}` — Delete the caller's event.
///
/// # Errors
///
/// Returns [`SwapperError`] on missing event, non-owner, or a pending
/// request still referencing the event.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Delete an event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Referenced by a pending swap request", body = ErrorResponse),
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<EventId>,
) -> Result<Json<MessageResponse>, SwapperError> {
    state.event_service.delete_event(id, caller.user_id).await?;
    Ok(Json(MessageResponse::new("event deleted")))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event))
        .route("/events/mine", get(list_my_events))
        .route("/events/marketplace", get(list_marketplace))
        .route(
            "/events/{id}",
            patch(update_event_status).delete(delete_event),
        )
}
