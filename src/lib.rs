//! # slot-swapper
//!
//! REST service where users publish time slots, mark them swappable, browse
//! other users' swappable slots and trade them one for one through a
//! request / accept / reject workflow.
//!
//! The only multi-record invariant lives in the swap settlement: accepting a
//! request exchanges the owners of two events, forces both to `Busy` and
//! marks the request `accepted`, all or nothing.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── Caller extractors (auth/)
//!     │
//!     ├── EventService / SwapService (service/)
//!     ├── Swap engine, records, ids (domain/)
//!     │
//!     └── SlotStore (persistence/)
//!           ├── MemoryStore
//!           └── PostgresStore
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
