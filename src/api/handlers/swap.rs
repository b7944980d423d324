//! Swap request handlers: propose, list, accept, reject, delete.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{
    AcceptSwapResponse, CreateSwapRequest, MessageResponse, RejectSwapResponse,
    SwapRequestResponse,
};
use crate::api::extract::{ApiJson, ApiPath};
use crate::app_state::AppState;
use crate::auth::Caller;
use crate::domain::{SwapRequest, SwapRequestId};
use crate::error::{ErrorResponse, SwapperError};

fn to_responses(requests: Vec<SwapRequest>) -> Vec<SwapRequestResponse> {
    requests.into_iter().map(SwapRequestResponse::from).collect()
}

/// `POST /requests` — Offer one of the caller's events for another user's.
///
/// # Errors
///
/// Returns [`SwapperError`] on missing ids, missing events, or an offer
/// the caller does not own.
#[utoipa::path(
    post,
    path = "/api/v1/requests",
    tag = "Swaps",
    summary = "Request a swap",
    description = "Creates a pending swap request. The responder is the current owner of the target event; both slots are snapshotted.",
    request_body = CreateSwapRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Swap request created", body = SwapRequestResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Offered event not owned by caller", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn create_swap(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<CreateSwapRequest>,
) -> Result<impl IntoResponse, SwapperError> {
    let (Some(target), Some(offer)) = (req.target_event_id, req.offer_event_id) else {
        return Err(SwapperError::InvalidRequest(
            "target_event_id and offer_event_id are required".to_string(),
        ));
    };
    let request = state.swap_service.create_swap(&caller, target, offer).await?;
    Ok((StatusCode::CREATED, Json(SwapRequestResponse::from(request))))
}

/// `GET /requests/incoming` — Requests where the caller is the responder.
///
/// # Errors
///
/// Returns [`SwapperError`] on a bad credential or storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/requests/incoming",
    tag = "Swaps",
    summary = "List incoming requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Newest first", body = Vec<SwapRequestResponse>),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
    )
)]
pub async fn list_incoming(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<Vec<SwapRequestResponse>>, SwapperError> {
    let requests = state.swap_service.list_incoming(caller.user_id).await?;
    Ok(Json(to_responses(requests)))
}

/// `GET /requests/outgoing` — Requests made by the caller.
///
/// # Errors
///
/// Returns [`SwapperError`] on a bad credential or storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/requests/outgoing",
    tag = "Swaps",
    summary = "List outgoing requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Newest first", body = Vec<SwapRequestResponse>),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
    )
)]
pub async fn list_outgoing(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<Vec<SwapRequestResponse>>, SwapperError> {
    let requests = state.swap_service.list_outgoing(caller.user_id).await?;
    Ok(Json(to_responses(requests)))
}

/// `PATCH /requests/{id}/accept` — Accept and execute a swap.
///
/// # Errors
///
/// Returns [`SwapperError`]; on any error no record is modified.
#[utoipa::path(
    patch,
    path = "/api/v1/requests/{id}/accept",
    tag = "Swaps",
    summary = "Accept a swap",
    description = "Responder only. Exchanges ownership of both slots, sets both to Busy and marks the request accepted, all atomically.",
    params(
        ("id" = uuid::Uuid, Path, description = "Swap request UUID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Swap executed", body = AcceptSwapResponse),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Caller is not the responder", body = ErrorResponse),
        (status = 404, description = "Request or event not found", body = ErrorResponse),
        (status = 409, description = "Request not pending, or stale", body = ErrorResponse),
    )
)]
pub async fn accept_swap(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<SwapRequestId>,
) -> Result<Json<AcceptSwapResponse>, SwapperError> {
    let settled = state.swap_service.accept_swap(id, caller.user_id).await?;
    Ok(Json(settled.into()))
}

/// `PATCH /requests/{id}/reject` — Reject a swap.
///
/// # Errors
///
/// Returns [`SwapperError`] on missing request, non-responder, or a
/// request that is no longer pending.
#[utoipa::path(
    patch,
    path = "/api/v1/requests/{id}/reject",
    tag = "Swaps",
    summary = "Reject a swap",
    params(
        ("id" = uuid::Uuid, Path, description = "Swap request UUID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Swap rejected", body = RejectSwapResponse),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Caller is not the responder", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Request not pending", body = ErrorResponse),
    )
)]
pub async fn reject_swap(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<SwapRequestId>,
) -> Result<Json<RejectSwapResponse>, SwapperError> {
    let request = state.swap_service.reject_swap(id, caller.user_id).await?;
    Ok(Json(RejectSwapResponse {
        message: "swap rejected".to_string(),
        request: request.into(),
    }))
}

/// `DELETE /requests/{id}` — Delete a request the caller takes part in.
///
/// # Errors
///
/// Returns [`SwapperError`] on missing request or non-participant.
#[utoipa::path(
    delete,
    path = "/api/v1/requests/{id}",
    tag = "Swaps",
    summary = "Delete a swap request",
    params(
        ("id" = uuid::Uuid, Path, description = "Swap request UUID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Request deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Caller is not a participant", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
    )
)]
pub async fn delete_swap(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<SwapRequestId>,
) -> Result<Json<MessageResponse>, SwapperError> {
    state.swap_service.delete_swap(id, caller.user_id).await?;
    Ok(Json(MessageResponse::new("swap request deleted")))
}

/// Swap routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requests", post(create_swap))
        .route("/requests/incoming", get(list_incoming))
        .route("/requests/outgoing", get(list_outgoing))
        .route("/requests/{id}", delete(delete_swap))
        .route("/requests/{id}/accept", patch(accept_swap))
        .route("/requests/{id}/reject", patch(reject_swap))
}
