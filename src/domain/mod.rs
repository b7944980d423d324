//! Domain layer: identifiers, slot and swap request records, and the swap
//! transaction engine.
//!
//! Nothing in here performs I/O. Stores and services call into these types
//! to validate and compute state changes, then persist the results.

pub mod caller;
pub mod event;
pub mod ids;
pub mod swap_engine;
pub mod swap_request;

pub use caller::CallerIdentity;
pub use event::{Event, EventStatus, NewEvent};
pub use ids::{EventId, SwapRequestId, UserId};
pub use swap_engine::SettledSwap;
pub use swap_request::{SlotSnapshot, SwapRequest, SwapStatus};
