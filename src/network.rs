//! Network URL constants for the marketplace API.

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.xrplmarket.xyz";

/// Default live-trade feed WebSocket URL.
pub const DEFAULT_WS_URL: &str = "wss://ws.xrplmarket.xyz/v2/trades";
