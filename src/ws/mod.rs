//! WebSocket layer — feed messages, events, connection config.
//!
//! The feed endpoint is subscribe-by-URL: the server starts pushing as soon
//! as the socket opens, and the client never sends anything. Two payload
//! shapes are multiplexed over the one socket, decoded by shape at the
//! boundary into a tagged union.

pub mod native;

use crate::domain::trade::wire::TradeWire;
use crate::error::WsError;

// ─── Inbound messages ────────────────────────────────────────────────────────

/// A decoded message from the trade feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    /// A full replacement set of trade records, newest-first.
    Snapshot(Vec<TradeWire>),
    /// One incremental trade to prepend.
    Trade(Box<TradeWire>),
}

impl FeedMessage {
    /// Decode a raw text payload by shape: array first, then
    /// object-with-timestamp. Anything else is rejected.
    pub fn decode(raw: &str) -> Result<Self, WsError> {
        if let Ok(records) = serde_json::from_str::<Vec<TradeWire>>(raw) {
            return Ok(FeedMessage::Snapshot(records));
        }
        match serde_json::from_str::<TradeWire>(raw) {
            Ok(record) => Ok(FeedMessage::Trade(Box::new(record))),
            Err(e) => Err(WsError::MalformedMessage(e.to_string())),
        }
    }
}

// ─── WsEvent ─────────────────────────────────────────────────────────────────

/// High-level events emitted by the WS client to the consumer.
#[derive(Debug, Clone)]
pub enum WsEvent {
    /// A decoded feed message.
    Message(FeedMessage),
    /// Connection established.
    Connected,
    /// Connection lost (a reconnect may follow).
    Disconnected { code: Option<u16>, reason: String },
    /// A connection-level failure (e.g. the dial attempt failed).
    /// Malformed payloads are logged and dropped, not surfaced here.
    Error(String),
}

/// Connection state of the feed socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closed = 2,
}

impl From<u16> for ReadyState {
    fn from(v: u16) -> Self {
        match v {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            _ => ReadyState::Closed,
        }
    }
}

/// Configuration for the WS client.
#[derive(Debug, Clone)]
pub struct WsConfig {
    pub url: String,
    /// Reconnect after an unexpected close. Retried indefinitely with a
    /// fixed delay while enabled — failures are never escalated as fatal.
    pub reconnect: bool,
    pub reconnect_delay_ms: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: crate::network::DEFAULT_WS_URL.to_string(),
            reconnect: true,
            reconnect_delay_ms: 3000,
        }
    }
}
