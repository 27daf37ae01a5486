//! Naive local timestamps
//!
//! Every timestamp is stored, compared and bucketed as a naive local
//! wall-clock value. Producers and readers are assumed to share one
//! timezone; deployments spanning several timezones are unsupported.
//! Offsets arriving on the wire are dropped, not converted.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};

/// Current local wall-clock time without its offset
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Keeps the wall-clock reading of `value` and discards its offset
pub fn to_naive<Tz: TimeZone>(value: &DateTime<Tz>) -> NaiveDateTime {
    value.naive_local()
}

/// Parses either a naive timestamp or an RFC 3339 one with an offset.
/// A bare date is read as midnight.
pub fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(to_naive(&dt));
    }

    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

pub fn truncate_to_hour(value: NaiveDateTime) -> NaiveDateTime {
    value.date().and_time(NaiveTime::MIN) + chrono::Duration::hours(value.hour() as i64)
}

pub fn start_of_day(value: NaiveDateTime) -> NaiveDateTime {
    value.date().and_time(NaiveTime::MIN)
}

/// Human-readable description of the local offset the process runs under
pub fn local_offset_description() -> String {
    Local::now().offset().to_string()
}

/// Serde adapter for optional timestamps on the wire.
///
/// Accepts anything [`parse_naive`] understands and serializes back as a
/// naive ISO 8601 string.
pub mod naive_opt {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_naive(s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {s}"))),
        }
    }
}
