//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs` — Rich domain types (validated, business-logic-ready)
//! - `wire.rs` — Raw serde structs matching backend responses
//! - `convert.rs` — `From` conversions from wire to domain
//! - `state.rs` — State containers with update methods (for WS-driven data)
//! - `client.rs` — Sub-client with HTTP methods

pub mod trade;
