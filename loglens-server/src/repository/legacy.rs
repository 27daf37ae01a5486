//! Legacy log source
//!
//! The older `logs` table stores only the rendered message, an integer
//! level and the raw event as JSON. Typed fields are read out of
//! `log_event.Properties` by parsing it into [`LegacyEvent`]; a payload that
//! does not parse, or parses into the wrong shape, leaves those fields
//! absent instead of failing the query.

use chrono::NaiveDateTime;
use loglens_core::domain::log::{LogLevel, LogRecord};
use serde::Deserialize;
use serde_json::Value;

use super::query::{Columns, LevelColumn};

pub const LEGACY_COLUMNS: Columns = Columns {
    table: "logs",
    level: LevelColumn::Ordinal("level"),
    timestamp: "timestamp",
    message: "message",
    exception: "exception",
    user_id: "(log_event -> 'Properties' ->> 'UserId')",
    request_path: "(log_event -> 'Properties' ->> 'RequestPath')",
    http_method: "(log_event -> 'Properties' ->> 'HttpMethod')",
    // Same rule as `elapsed_millis`
    duration_ms: "(CASE WHEN (log_event -> 'Properties' ->> 'ElapsedMilliseconds') ~ '^[0-9]{1,15}(\\.[0-9]+)?$' \
                  THEN round((log_event -> 'Properties' ->> 'ElapsedMilliseconds')::numeric)::bigint END)",
    order_by: "timestamp DESC, level DESC, message DESC, exception DESC NULLS LAST, log_event::text DESC NULLS LAST",
};

pub const LEGACY_SELECT: &str = r#"
        SELECT message, level, timestamp, exception,
               log_event::text AS log_event
        FROM logs
        WHERE TRUE"#;

// =============================================================================
// Event Payload
// =============================================================================

/// The parts of a raw event this workspace reads
#[derive(Debug, Default, Deserialize)]
pub struct LegacyEvent {
    #[serde(rename = "Properties", default)]
    pub properties: Option<LegacyProperties>,
}

/// Known properties, each optional and loosely typed on the wire
#[derive(Debug, Default, Deserialize)]
pub struct LegacyProperties {
    #[serde(rename = "RequestPath", default)]
    pub request_path: Option<Value>,
    #[serde(rename = "HttpMethod", default)]
    pub http_method: Option<Value>,
    #[serde(rename = "UserId", default)]
    pub user_id: Option<Value>,
    #[serde(rename = "Application", default)]
    pub application: Option<Value>,
    #[serde(rename = "RequestId", default)]
    pub request_id: Option<Value>,
    #[serde(rename = "CorrelationId", default)]
    pub correlation_id: Option<Value>,
    #[serde(rename = "StatusCode", default)]
    pub status_code: Option<Value>,
    #[serde(rename = "ElapsedMilliseconds", default)]
    pub elapsed_ms: Option<Value>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, Value>,
}

impl LegacyEvent {
    /// Parses the raw payload; anything malformed yields an empty event
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }
}

/// Strings stay strings, numbers and booleans are rendered, everything
/// else is treated as absent
fn as_text(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

/// Longest whole part an elapsed time may have, in digits
const MAX_ELAPSED_DIGITS: usize = 15;

/// Elapsed milliseconds, rounded half up. Only plain non-negative decimals
/// count (`12`, `12.5`), whether sent as a JSON number or a string; padded,
/// signed or exponent forms are absent.
fn elapsed_millis(value: &Option<Value>) -> Option<u64> {
    let text = match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(whole) => whole.to_string(),
            None => n.as_f64()?.to_string(),
        },
        _ => return None,
    };

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(whole) || whole.len() > MAX_ELAPSED_DIGITS || fraction.is_some_and(|f| !is_digits(f)) {
        return None;
    }

    let millis: u64 = whole.parse().ok()?;
    let round_up = fraction.is_some_and(|f| f.as_bytes()[0] >= b'5');
    Some(millis + u64::from(round_up))
}

fn as_number(value: &Option<Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
pub struct LegacyRow {
    message: String,
    level: i32,
    timestamp: NaiveDateTime,
    exception: Option<String>,
    log_event: Option<String>,
}

impl From<LegacyRow> for LogRecord {
    fn from(row: LegacyRow) -> Self {
        let level = i16::try_from(row.level)
            .ok()
            .and_then(LogLevel::from_ordinal)
            .unwrap_or(LogLevel::Information);

        // Legacy rows carry no identity column
        let mut record = LogRecord::new(0, level, row.timestamp, row.message);
        record.exception = row.exception;

        let event = LegacyEvent::parse(row.log_event.as_deref());
        if let Some(props) = event.properties {
            record.request_path = as_text(&props.request_path);
            record.http_method = as_text(&props.http_method);
            record.user_id = as_text(&props.user_id);
            record.application = as_text(&props.application);
            record.request_id = as_text(&props.request_id);
            record.correlation_id = as_text(&props.correlation_id);
            record.response_status_code = as_number(&props.status_code)
                .filter(|s| s.fract() == 0.0 && *s >= 0.0 && *s <= i32::MAX as f64)
                .map(|s| s as i32);
            record.duration_ms = elapsed_millis(&props.elapsed_ms);
            record.properties = props.other;
        }

        record
    }
}
