//! REST API layer: route handlers, DTOs, router composition and the
//! OpenAPI document.
//!
//! Resource endpoints are mounted under `/api/v1`; `/health` sits at the root.

pub mod dto;
pub mod extract;
pub mod handlers;

use axum::Router;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// OpenAPI description of every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "slot-swapper",
        description = "Publish time slots, browse the swappable marketplace and trade slots one for one."
    ),
    paths(
        handlers::event::create_event,
        handlers::event::list_my_events,
        handlers::event::list_marketplace,
        handlers::event::update_event_status,
        handlers::event::delete_event,
        handlers::swap::create_swap,
        handlers::swap::list_incoming,
        handlers::swap::list_outgoing,
        handlers::swap::accept_swap,
        handlers::swap::reject_swap,
        handlers::swap::delete_swap,
        handlers::auth::validate,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::CreateEventRequest,
        dto::UpdateStatusRequest,
        dto::EventResponse,
        dto::CreateSwapRequest,
        dto::SwapRequestResponse,
        dto::AcceptSwapResponse,
        dto::RejectSwapResponse,
        dto::MessageResponse,
        dto::ValidateResponse,
        handlers::system::HealthResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Events", description = "Time slot ownership"),
        (name = "Swaps", description = "Swap negotiation"),
        (name = "Auth", description = "Credential checks"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` security scheme referenced by handlers.
#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_routes_and_scheme() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/events",
            "/api/v1/events/marketplace",
            "/api/v1/requests/{id}/accept",
            "/api/v1/auth/validate",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let has_scheme = doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"));
        assert!(has_scheme);
    }
}
