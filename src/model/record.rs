use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// One inbound stream update.
///
/// Price ticks and sentiment ticks may arrive as separate partial records, so every value
/// except the timestamp is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamRecord {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(deserialize_with = "timestamp_from_json")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub change_1m: Option<f64>,
    /// Rolling 5-minute sentiment average in [-1, 1].
    #[serde(default)]
    pub sentiment_avg_5m: Option<f64>,
    /// Predicted probability of an upward move in [0, 1].
    #[serde(default)]
    pub pred_up_prob: Option<f64>,
}

impl StreamRecord {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: None,
            timestamp,
            price: None,
            change_1m: None,
            sentiment_avg_5m: None,
            pred_up_prob: None,
        }
    }

    pub fn decode(text: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Local wall-clock label used on chart axes.
    pub fn display_time(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%H:%M:%S")
            .to_string()
    }
}

/// Parse an ISO-8601 timestamp. Strings without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(AppError::Timestamp(raw.to_string()))
}

fn timestamp_from_json<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    match v {
        serde_json::Value::String(s) => parse_timestamp(&s).map_err(serde::de::Error::custom),
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid epoch millis {}", n))),
        _ => Err(serde::de::Error::custom("timestamp must be a string or a number")),
    }
}
