//! Log domain types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single persisted log entry
///
/// Records are append-only: once a producer has written one, nothing in
/// this workspace updates or deletes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub id: i64,
    pub message: String,
    pub level: LogLevel,
    /// Naive local wall-clock time, see [`crate::domain::time`]
    pub timestamp: NaiveDateTime,
    pub exception: Option<String>,
    pub properties: serde_json::Map<String, serde_json::Value>,
    pub application: Option<String>,
    pub user_id: Option<String>,
    pub request_id: Option<String>,
    pub correlation_id: Option<String>,
    pub http_method: Option<String>,
    pub request_path: Option<String>,
    pub response_status_code: Option<i32>,
    pub duration_ms: Option<u64>,
}

impl LogRecord {
    /// Creates a record with only the mandatory fields set
    pub fn new(id: i64, level: LogLevel, timestamp: NaiveDateTime, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
            level,
            timestamp,
            exception: None,
            properties: serde_json::Map::new(),
            application: None,
            user_id: None,
            request_id: None,
            correlation_id: None,
            http_method: None,
            request_path: None,
            response_status_code: None,
            duration_ms: None,
        }
    }

    pub fn has_exception(&self) -> bool {
        self.exception.as_deref().is_some_and(|e| !e.trim().is_empty())
    }

    /// Whether the record was produced while serving an HTTP request
    pub fn is_http(&self) -> bool {
        self.response_status_code.is_some()
    }
}

/// Severity tier, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Verbose,
    Debug,
    Information,
    Warning,
    Error,
    Fatal,
}

/// The one name <-> ordinal table shared by every store adapter.
const LEVEL_TABLE: [(LogLevel, &str, i16); 6] = [
    (LogLevel::Verbose, "Verbose", 0),
    (LogLevel::Debug, "Debug", 1),
    (LogLevel::Information, "Information", 2),
    (LogLevel::Warning, "Warning", 3),
    (LogLevel::Error, "Error", 4),
    (LogLevel::Fatal, "Fatal", 5),
];

/// Short spellings some producers emit instead of the full name
const ALIASES: [(&str, LogLevel); 4] = [
    ("trace", LogLevel::Verbose),
    ("info", LogLevel::Information),
    ("warn", LogLevel::Warning),
    ("critical", LogLevel::Fatal),
];

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Verbose,
        LogLevel::Debug,
        LogLevel::Information,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn name(self) -> &'static str {
        LEVEL_TABLE[self.ordinal() as usize].1
    }

    pub fn ordinal(self) -> i16 {
        match self {
            LogLevel::Verbose => 0,
            LogLevel::Debug => 1,
            LogLevel::Information => 2,
            LogLevel::Warning => 3,
            LogLevel::Error => 4,
            LogLevel::Fatal => 5,
        }
    }

    pub fn from_ordinal(ordinal: i16) -> Option<Self> {
        LEVEL_TABLE
            .iter()
            .find(|(_, _, o)| *o == ordinal)
            .map(|(level, _, _)| *level)
    }

    /// Case-insensitive lookup by name. Numeric ordinals and the short
    /// aliases some producers emit ("Info", "Warn", "Trace") are accepted too.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Ok(ordinal) = name.parse::<i16>() {
            return Self::from_ordinal(ordinal);
        }

        Self::spellings()
            .find(|(spelling, _)| spelling.eq_ignore_ascii_case(name))
            .map(|(_, level)| level)
    }

    /// Every non-numeric spelling [`LogLevel::from_name`] accepts, matched
    /// case-insensitively
    pub fn spellings() -> impl Iterator<Item = (&'static str, LogLevel)> {
        LEVEL_TABLE
            .iter()
            .map(|(level, name, _)| (*name, *level))
            .chain(ALIASES)
    }

    /// Every level at least as severe as `self`
    pub fn and_above(self) -> impl Iterator<Item = LogLevel> {
        Self::ALL.into_iter().filter(move |l| *l >= self)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering_follows_ordinal() {
        for pair in LogLevel::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].ordinal() < pair[1].ordinal());
        }
    }

    #[test]
    fn test_name_ordinal_table_roundtrip() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_ordinal(level.ordinal()), Some(level));
            assert_eq!(LogLevel::from_name(level.name()), Some(level));
        }
        assert_eq!(LogLevel::from_ordinal(6), None);
        assert_eq!(LogLevel::from_ordinal(-1), None);
    }

    #[test]
    fn test_from_name_lenient() {
        assert_eq!(LogLevel::from_name("error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_name(" WARNING "), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_name("Info"), Some(LogLevel::Information));
        assert_eq!(LogLevel::from_name("4"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_name("loud"), None);
    }

    #[test]
    fn test_every_spelling_resolves() {
        for (spelling, level) in LogLevel::spellings() {
            assert_eq!(LogLevel::from_name(spelling), Some(level));
            assert_eq!(LogLevel::from_name(&spelling.to_uppercase()), Some(level));
        }
        assert_eq!(LogLevel::spellings().count(), 10);
    }

    #[test]
    fn test_and_above() {
        let levels: Vec<_> = LogLevel::Error.and_above().collect();
        assert_eq!(levels, vec![LogLevel::Error, LogLevel::Fatal]);
    }

    #[test]
    fn test_has_exception_ignores_blank() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut record = LogRecord::new(1, LogLevel::Error, ts, "boom");
        assert!(!record.has_exception());
        record.exception = Some("   ".to_string());
        assert!(!record.has_exception());
        record.exception = Some("System.Exception: boom".to_string());
        assert!(record.has_exception());
    }
}
