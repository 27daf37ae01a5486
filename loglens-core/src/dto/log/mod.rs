//! Log record view returned by search and dashboard feeds

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::classify::{PerformanceTier, StatusCategory};
use crate::domain::log::LogRecord;

/// A log record annotated with its derived tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecordView {
    pub id: i64,
    pub message: String,
    pub level: String,
    pub timestamp: NaiveDateTime,
    pub exception: Option<String>,
    pub has_exception: bool,
    pub application: Option<String>,
    pub user_id: Option<String>,
    pub request_id: Option<String>,
    pub correlation_id: Option<String>,
    pub http_method: Option<String>,
    pub request_path: Option<String>,
    pub response_status_code: Option<i32>,
    pub duration_ms: Option<u64>,
    pub performance_level: PerformanceTier,
    pub status_category: StatusCategory,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl From<LogRecord> for LogRecordView {
    fn from(record: LogRecord) -> Self {
        Self {
            has_exception: record.has_exception(),
            performance_level: PerformanceTier::from_duration(record.duration_ms),
            status_category: StatusCategory::from_status(record.response_status_code),
            level: record.level.name().to_string(),
            id: record.id,
            message: record.message,
            timestamp: record.timestamp,
            exception: record.exception,
            application: record.application,
            user_id: record.user_id,
            request_id: record.request_id,
            correlation_id: record.correlation_id,
            http_method: record.http_method,
            request_path: record.request_path,
            response_status_code: record.response_status_code,
            duration_ms: record.duration_ms,
            properties: record.properties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::log::LogLevel;

    #[test]
    fn test_view_conversion_annotates_tiers() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut record = LogRecord::new(7, LogLevel::Warning, ts, "slow checkout");
        record.duration_ms = Some(750);
        record.response_status_code = Some(404);

        let view: LogRecordView = record.into();
        assert_eq!(view.id, 7);
        assert_eq!(view.level, "Warning");
        assert_eq!(view.performance_level, PerformanceTier::Fair);
        assert_eq!(view.status_category, StatusCategory::ClientError);
        assert!(!view.has_exception);
    }

    #[test]
    fn test_missing_duration_is_unknown() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let view: LogRecordView = LogRecord::new(1, LogLevel::Information, ts, "hi").into();

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["performanceLevel"], "Unknown");
        assert_eq!(json["statusCategory"], "Unknown");
    }
}
