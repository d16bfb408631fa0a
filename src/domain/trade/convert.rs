//! Conversions from wire types to domain types for trades.

use super::wire::{AmountWire, TradeWire};
use super::Trade;
use crate::shared::Amount;

impl From<AmountWire> for Amount {
    fn from(a: AmountWire) -> Self {
        Self {
            currency: a.currency,
            issuer: a.issuer,
            value: a.value,
        }
    }
}

impl From<TradeWire> for Trade {
    fn from(t: TradeWire) -> Self {
        Self {
            timestamp: t.timestamp,
            paid: t.paid.into(),
            got: t.got.into(),
            maker: t.maker,
            taker: t.taker,
            tx_hash: t.hash,
        }
    }
}
