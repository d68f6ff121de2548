//! Date parsing plus timestamp/event helpers for audit envelopes.

use crate::core::error::SipataniError;
use chrono::{Days, Local, NaiveDate, SecondsFormat, Utc};
use serde_json::{Map, Value as JsonValue};
use ulid::Ulid;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const ENVELOPE_VERSION: &str = "1.0.0";

/// Parse an operator-typed `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<NaiveDate, SipataniError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| {
        SipataniError::ValidationError(format!(
            "invalid date '{}': use YYYY-MM-DD",
            input.trim()
        ))
    })
}

/// clap value parser wrapper around [`parse_date`].
pub fn parse_date_arg(input: &str) -> Result<NaiveDate, String> {
    parse_date(input).map_err(|e| e.to_string())
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `from + days`, failing instead of wrapping past the calendar's end.
pub fn add_days(from: NaiveDate, days: u32) -> Result<NaiveDate, SipataniError> {
    from.checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| SipataniError::ValidationError(format!("{days} days after {from} is out of range")))
}

/// Current UTC time as RFC 3339 with whole seconds (`2025-05-01T08:30:00Z`).
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Sortable id for an audit event or command envelope.
pub fn event_id() -> String {
    Ulid::new().to_string()
}

/// Envelope printed by mutating commands under `--format json`.
///
/// Keys of an object `extra` sit next to the envelope fields but never
/// replace them; any other non-null value lands under `data`.
pub fn command_envelope(cmd: &str, status: &str, extra: JsonValue) -> JsonValue {
    let mut out = match extra {
        JsonValue::Object(map) => map,
        JsonValue::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    out.insert("envelope_version".to_string(), ENVELOPE_VERSION.into());
    out.insert("ts".to_string(), timestamp().into());
    out.insert("event_id".to_string(), event_id().into());
    out.insert("cmd".to_string(), cmd.into());
    out.insert("status".to_string(), status.into());
    JsonValue::Object(out)
}
