//! Trade domain — observed on-ledger exchanges.

pub mod client;
mod convert;
pub mod state;
pub mod wire;

use crate::shared::{AccountId, Amount, TxHash};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use state::TradeHistory;

/// One observed on-ledger exchange between two counterparties.
///
/// Immutable once received: the feed only ever prepends new trades or
/// replaces the whole set, never updates an existing record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trade {
    pub timestamp: DateTime<Utc>,
    /// What the taker paid.
    pub paid: Amount,
    /// What the taker received.
    pub got: Amount,
    pub maker: AccountId,
    pub taker: AccountId,
    pub tx_hash: Option<TxHash>,
}

/// Buy vs. sell, classified from which side of the trade is the native asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    /// The taker paid XRP for a token.
    Buy,
    /// The taker sold a token for XRP.
    Sell,
}

impl Trade {
    /// Classify the trade by which side is the native asset.
    ///
    /// `None` for token-for-token trades where neither side is XRP.
    pub fn direction(&self) -> Option<TradeDirection> {
        if self.paid.is_native() {
            Some(TradeDirection::Buy)
        } else if self.got.is_native() {
            Some(TradeDirection::Sell)
        } else {
            None
        }
    }

    /// The trade's size in XRP, taken from whichever side is native.
    ///
    /// `None` for token-for-token trades: their XRP size is unknown.
    pub fn size_in_xrp(&self) -> Option<Decimal> {
        if self.paid.is_native() {
            Some(self.paid.value)
        } else if self.got.is_native() {
            Some(self.got.value)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn native(v: i64) -> Amount {
        Amount::native(Decimal::from(v))
    }

    fn token(v: i64) -> Amount {
        Amount::issued("NFT", AccountId::from("rIssuer"), Decimal::from(v))
    }

    fn trade(paid: Amount, got: Amount) -> Trade {
        Trade {
            timestamp: Utc::now(),
            paid,
            got,
            maker: AccountId::from("rMaker"),
            taker: AccountId::from("rTaker"),
            tx_hash: None,
        }
    }

    #[test]
    fn test_direction_buy_when_taker_pays_xrp() {
        let t = trade(native(500), token(1));
        assert_eq!(t.direction(), Some(TradeDirection::Buy));
        assert_eq!(t.size_in_xrp(), Some(Decimal::from(500)));
    }

    #[test]
    fn test_direction_sell_when_taker_receives_xrp() {
        let t = trade(token(1), native(750));
        assert_eq!(t.direction(), Some(TradeDirection::Sell));
        assert_eq!(t.size_in_xrp(), Some(Decimal::from(750)));
    }

    #[test]
    fn test_token_for_token_has_no_direction() {
        let t = trade(token(1), token(2));
        assert_eq!(t.direction(), None);
        assert_eq!(t.size_in_xrp(), None);
    }
}
