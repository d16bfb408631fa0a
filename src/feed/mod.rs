//! Feed pipeline — throttled application of live-trade updates.
//!
//! The feed can burst; redrawing on every message is wasteful and jittery.
//! This module bounds the update rate (snapshot and incremental kinds
//! throttled independently, latest-wins) and owns the panel state machine
//! that the surrounding UI renders from.

pub mod panel;
pub mod throttle;

pub use panel::{PanelConfig, PanelPhase, PanelSnapshot, PanelState, TradePanel};
pub use throttle::ThrottleGate;
