//! Custom serde helpers for backend wire formats.

/// (De)serializes a Unix-millis integer as `DateTime<Utc>`.
///
/// The backend sends trade timestamps as epoch milliseconds,
/// not ISO 8601 strings.
pub mod timestamp_ms {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid timestamp: {}", millis)))
    }

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(dt.timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "super::timestamp_ms")]
        ts: DateTime<Utc>,
    }

    #[test]
    fn test_timestamp_ms_roundtrip() {
        let w: Wrapper = serde_json::from_str(r#"{"ts":1740076800000}"#).unwrap();
        assert_eq!(w.ts.timestamp_millis(), 1_740_076_800_000);
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"ts":1740076800000}"#);
    }

    #[test]
    fn test_timestamp_ms_rejects_strings() {
        let r: Result<Wrapper, _> = serde_json::from_str(r#"{"ts":"2024-01-01"}"#);
        assert!(r.is_err());
    }
}
