//! Wire types for trade records (REST + WS).
//!
//! The REST snapshot endpoint and the feed's incremental push use the same
//! record shape; a feed snapshot is a bare JSON array of these records.

use crate::shared::serde_util::timestamp_ms;
use crate::shared::{AccountId, TxHash};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One trade record as the backend sends it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeWire {
    /// Epoch milliseconds.
    #[serde(with = "timestamp_ms")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "paidAmount")]
    pub paid: AmountWire,
    #[serde(rename = "gotAmount")]
    pub got: AmountWire,
    pub maker: AccountId,
    pub taker: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<TxHash>,
}

/// One side of a trade on the wire.
///
/// The native asset omits `issuer`; issued tokens carry it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AmountWire {
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<AccountId>,
    pub value: Decimal,
}
