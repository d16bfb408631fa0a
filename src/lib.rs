//! # XRPL Market Feed SDK
//!
//! A Rust client for an XRPL NFT/token marketplace: REST trade queries plus
//! the live-trade WebSocket feed with throttled, filtered delivery.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — Shared newtypes, trade domain models, errors
//! 2. **HTTP API** — `MarketHttp` with per-endpoint retry policies
//! 3. **WebSocket** — `WsClient` over `tokio-tungstenite` with fixed-delay reconnect
//! 4. **Feed pipeline** — throttle gates + `TradePanel` state machine
//! 5. **High-Level Client** — `MarketClient` with nested sub-clients
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use xrpl_market_feed::prelude::*;
//!
//! let client = MarketClient::builder()
//!     .base_url("https://api.xrplmarket.xyz")
//!     .build()?;
//!
//! let mut panel = client.trade_panel(PanelConfig::default());
//! panel.open().await;
//! panel.set_filter(TradeSizeBucket::Xrp1000).await;
//! let view = panel.snapshot().await;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Network URL constants.
pub mod network;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
pub mod http;

// ── Layer 3: WebSocket ───────────────────────────────────────────────────────

/// WebSocket client: feed messages, events, connection management.
pub mod ws;

// ── Layer 4: Feed pipeline ───────────────────────────────────────────────────

/// Throttle gates and the trade panel state machine.
pub mod feed;

// ── Layer 5: High-Level Client ───────────────────────────────────────────────

/// `MarketClient` — the primary entry point.
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{AccountId, Amount, TradeSizeBucket, TxHash};

    // Domain types — trade
    pub use crate::domain::trade::{Trade, TradeDirection, TradeHistory};

    // Errors
    pub use crate::error::{HttpError, SdkError, WsError};

    // Network
    pub use crate::network::{DEFAULT_API_URL, DEFAULT_WS_URL};

    // HTTP client + sub-clients
    pub use crate::client::{MarketClient, MarketClientBuilder, TradesClient};
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // WebSocket types
    pub use crate::ws::{FeedMessage, ReadyState, WsConfig, WsEvent};

    // Feed pipeline
    pub use crate::feed::{PanelConfig, PanelPhase, PanelSnapshot, PanelState, TradePanel};
}
