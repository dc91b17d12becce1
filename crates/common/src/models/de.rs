//! Lenient deserializers for backend payloads
//!
//! The backend serializes decimals as numbers or strings and dates as either
//! `YYYY-MM-DD` or a full timestamp, depending on the endpoint.

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

fn value_to_f64<E: de::Error>(value: &Value) -> Result<Option<f64>, E> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| E::custom("decimal out of range")),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| E::custom(format!("invalid decimal: {}", s))),
        other => Err(E::custom(format!("expected decimal, got {}", other))),
    }
}

/// Parse the date part of `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS...`
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

pub fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_f64(&value)?.ok_or_else(|| de::Error::custom("missing decimal"))
}

pub fn opt_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_f64(&value)
}

pub fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_date(&s)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date: {}", s))),
    }
}

/// Envelope `status` is numeric on most endpoints, a reason phrase on a few
pub fn lenient_status<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "decimal")]
        price: f64,
        #[serde(default, deserialize_with = "opt_date")]
        day: Option<NaiveDate>,
    }

    #[test]
    fn test_decimal_accepts_strings() {
        let probe: Probe = serde_json::from_str(r#"{"price": "499.00"}"#).unwrap();
        assert_eq!(probe.price, 499.0);
        assert!(probe.day.is_none());
    }

    #[test]
    fn test_date_accepts_timestamps() {
        let probe: Probe =
            serde_json::from_str(r#"{"price": 1, "day": "2025-03-04T10:15:30.123"}"#).unwrap();
        assert_eq!(probe.day, NaiveDate::from_ymd_opt(2025, 3, 4));
    }

    #[test]
    fn test_bad_decimal_is_rejected() {
        assert!(serde_json::from_str::<Probe>(r#"{"price": "abc"}"#).is_err());
    }
}
