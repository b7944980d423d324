//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::persistence::SlotStore;
use crate::service::{EventService, SwapService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event ownership operations.
    pub event_service: Arc<EventService>,
    /// Swap negotiation workflow.
    pub swap_service: Arc<SwapService>,
    /// Resolves bearer credentials for the `Caller` extractors.
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    /// Wires both services to `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SlotStore>, authenticator: Authenticator) -> Self {
        Self {
            event_service: Arc::new(EventService::new(Arc::clone(&store))),
            swap_service: Arc::new(SwapService::new(store)),
            authenticator: Arc::new(authenticator),
        }
    }
}
