//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are snake_case. Request bodies default missing fields so
//! that blank or absent values reach domain validation; bodies that do not
//! parse at all are rejected by [`super::extract::ApiJson`]. Either way the
//! client gets the service's error shape.

pub mod common_dto;
pub mod event_dto;
pub mod swap_dto;

pub use common_dto::*;
pub use event_dto::*;
pub use swap_dto::*;
