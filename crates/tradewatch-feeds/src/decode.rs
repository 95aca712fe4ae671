//! Decoder for inbound stream payloads.
//!
//! Each SSE message carries a JSON object with any subset of `id`,
//! `timestamp`, `type`, `account`, `message` and `amount`. Absent or empty
//! fields fall back to defaults; anything that is not an object, or a field
//! with the wrong shape, is a [`FeedError::Decode`].

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tradewatch_core::{LogEvent, LogType};

use crate::error::FeedError;

/// Account used when the payload names none.
pub const DEFAULT_ACCOUNT: &str = "System";

/// Decode one payload into a [`LogEvent`] stamped with `received_at`.
///
/// `fallback_id` is only called when the payload has no usable `id`. The
/// payload's own `timestamp` is not trusted for buffer ordering; events are
/// placed by arrival.
pub fn decode_payload(
    payload: &str,
    received_at: DateTime<Utc>,
    fallback_id: impl FnOnce() -> String,
) -> Result<LogEvent, FeedError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| FeedError::Decode(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(FeedError::Decode(format!("expected a JSON object, got {payload:?}")));
    };

    let kind = match text_field(&fields, "type")? {
        Some(raw) => raw
            .parse::<LogType>()
            .map_err(|e| FeedError::Decode(e.to_string()))?,
        None => LogType::Info,
    };

    Ok(LogEvent {
        id: text_field(&fields, "id")?.unwrap_or_else(fallback_id),
        timestamp: received_at,
        kind,
        account: text_field(&fields, "account")?.unwrap_or_else(|| DEFAULT_ACCOUNT.to_string()),
        message: text_field(&fields, "message")?.unwrap_or_default(),
        amount: text_field(&fields, "amount")?,
    })
}

/// Read `key` as text. Numbers are rendered; `null`, missing and empty
/// strings are `None`.
fn text_field(fields: &Map<String, Value>, key: &str) -> Result<Option<String>, FeedError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(FeedError::Decode(format!("field {key:?} has unsupported value {other}"))),
    }
}
