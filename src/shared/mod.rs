//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize
//! identically to the raw format the backend sends, so they can be used
//! directly in wire types without conversion overhead.

pub mod serde_util;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

// ─── AccountId ───────────────────────────────────────────────────────────────

/// Newtype for XRPL account identifiers (classic `r...` addresses).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for AccountId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AccountId(s.to_string()))
    }
}

impl Serialize for AccountId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(AccountId(s))
    }
}

// ─── TxHash ──────────────────────────────────────────────────────────────────

/// A ledger transaction hash, used to link a trade to an explorer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TxHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TxHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Serialize for TxHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(TxHash(s))
    }
}

// ─── Amount ──────────────────────────────────────────────────────────────────

/// Currency code for the network's native asset.
pub const NATIVE_CURRENCY: &str = "XRP";

/// A currency amount on one side of a trade.
///
/// The native asset carries no issuer; issued tokens always do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Amount {
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<AccountId>,
    pub value: Decimal,
}

impl Amount {
    pub fn native(value: Decimal) -> Self {
        Self {
            currency: NATIVE_CURRENCY.to_string(),
            issuer: None,
            value,
        }
    }

    pub fn issued(currency: impl Into<String>, issuer: AccountId, value: Decimal) -> Self {
        Self {
            currency: currency.into(),
            issuer: Some(issuer),
            value,
        }
    }

    /// Whether this is the network's native asset.
    pub fn is_native(&self) -> bool {
        self.currency == NATIVE_CURRENCY && self.issuer.is_none()
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

// ─── TradeSizeBucket ─────────────────────────────────────────────────────────

/// Minimum trade size filter, in native-asset units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSizeBucket {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "500")]
    Xrp500,
    #[serde(rename = "1000")]
    Xrp1000,
    #[serde(rename = "2500")]
    Xrp2500,
    #[serde(rename = "5000")]
    Xrp5000,
    #[serde(rename = "10000")]
    Xrp10000,
}

impl TradeSizeBucket {
    /// The minimum size this bucket admits, in XRP.
    pub fn threshold(&self) -> Decimal {
        match self {
            Self::All => Decimal::ZERO,
            Self::Xrp500 => Decimal::from(500),
            Self::Xrp1000 => Decimal::from(1000),
            Self::Xrp2500 => Decimal::from(2500),
            Self::Xrp5000 => Decimal::from(5000),
            Self::Xrp10000 => Decimal::from(10_000),
        }
    }

    /// Query-parameter value for the REST snapshot endpoint.
    /// `All` maps to no parameter at all.
    pub fn as_query(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Xrp500 => Some("500"),
            Self::Xrp1000 => Some("1000"),
            Self::Xrp2500 => Some("2500"),
            Self::Xrp5000 => Some("5000"),
            Self::Xrp10000 => Some("10000"),
        }
    }
}

impl std::fmt::Display for TradeSizeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_query() {
            Some(q) => write!(f, "{}+", q),
            None => write!(f, "All"),
        }
    }
}
