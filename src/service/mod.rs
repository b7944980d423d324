//! Service layer: business operation orchestration.
//!
//! [`EventService`] covers slot ownership operations and [`SwapService`]
//! the swap negotiation workflow. Both are stateless coordinators over a
//! shared [`crate::persistence::SlotStore`].

pub mod event_service;
pub mod swap_service;

pub use event_service::EventService;
pub use swap_service::SwapService;
