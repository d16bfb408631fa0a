//! High-level client — `MarketClient` with nested sub-client accessors.
//!
//! The explicitly constructed session object for the application: created
//! once at startup and passed by reference to whatever needs it. Feed
//! connections and buffers are never ambient globals — each [`TradePanel`]
//! owns its own, nested inside the client's lifetime.

use crate::domain::trade::client::Trades;
use crate::error::SdkError;
use crate::feed::{PanelConfig, TradePanel};
use crate::http::MarketHttp;
use crate::ws::WsConfig;

// Re-export sub-client types for convenience.
pub use crate::domain::trade::client::Trades as TradesClient;

/// The primary entry point for the marketplace SDK.
pub struct MarketClient {
    pub(crate) http: MarketHttp,
    pub(crate) ws_config: WsConfig,
}

impl MarketClient {
    pub fn builder() -> MarketClientBuilder {
        MarketClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn trades(&self) -> Trades<'_> {
        Trades { client: self }
    }

    /// Get the WS config used for feed connections.
    ///
    /// The WS client is intentionally not embedded in `MarketClient`
    /// because feed connection lifetimes are managed at the application
    /// layer (tied to the trade panel's open/close lifecycle).
    pub fn ws_config(&self) -> &WsConfig {
        &self.ws_config
    }

    /// Create a new feed WS client from the current config.
    pub fn ws(&self) -> crate::ws::native::WsClient {
        crate::ws::native::WsClient::new(self.ws_config.clone())
    }

    /// Create a trade panel. Each panel owns an independent connection and
    /// buffer; call [`TradePanel::open`] when the view becomes visible.
    pub fn trade_panel(&self, config: PanelConfig) -> TradePanel {
        TradePanel::new(self.http.clone(), self.ws_config.clone(), config)
    }
}

impl Clone for MarketClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            ws_config: self.ws_config.clone(),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct MarketClientBuilder {
    base_url: String,
    ws_url: String,
}

impl Default for MarketClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            ws_url: crate::network::DEFAULT_WS_URL.to_string(),
        }
    }
}

impl MarketClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn ws_url(mut self, url: &str) -> Self {
        self.ws_url = url.to_string();
        self
    }

    pub fn build(self) -> Result<MarketClient, SdkError> {
        Ok(MarketClient {
            http: MarketHttp::new(&self.base_url),
            ws_config: WsConfig {
                url: self.ws_url,
                ..WsConfig::default()
            },
        })
    }
}
