//! Dashboard DTOs
//!
//! The dashboard is entirely derived from the stored records and is
//! recomputed for every request.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::classify::{PerformanceTier, SlowTier};
use crate::domain::time::naive_opt;
use crate::dto::log::LogRecordView;

pub const DEFAULT_TOP_ERRORS: i64 = 10;
pub const DEFAULT_TOP_ENDPOINTS: i64 = 10;
pub const DEFAULT_SLOW_REQUESTS: i64 = 20;
pub const DEFAULT_RECENT_LOGS: i64 = 50;
pub const MAX_LEADERBOARD_SIZE: i64 = 1000;

/// Dashboard request as received on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardRequest {
    #[serde(with = "naive_opt")]
    pub from_date: Option<NaiveDateTime>,
    #[serde(with = "naive_opt")]
    pub to_date: Option<NaiveDateTime>,
    pub top_errors_count: i64,
    pub top_endpoints_count: i64,
    pub slow_requests_count: i64,
    pub recent_logs_count: i64,
    pub include_hourly_trends: bool,
    pub include_performance_metrics: bool,
}

impl Default for DashboardRequest {
    fn default() -> Self {
        Self {
            from_date: None,
            to_date: None,
            top_errors_count: DEFAULT_TOP_ERRORS,
            top_endpoints_count: DEFAULT_TOP_ENDPOINTS,
            slow_requests_count: DEFAULT_SLOW_REQUESTS,
            recent_logs_count: DEFAULT_RECENT_LOGS,
            include_hourly_trends: true,
            include_performance_metrics: true,
        }
    }
}

impl DashboardRequest {
    /// Leaderboard sizes with non-positive values replaced by their
    /// defaults and oversized values capped
    pub fn sizes(&self) -> LeaderboardSizes {
        fn size(requested: i64, default: i64) -> usize {
            let size = if requested <= 0 { default } else { requested };
            size.min(MAX_LEADERBOARD_SIZE) as usize
        }

        LeaderboardSizes {
            top_errors: size(self.top_errors_count, DEFAULT_TOP_ERRORS),
            top_endpoints: size(self.top_endpoints_count, DEFAULT_TOP_ENDPOINTS),
            slow_requests: size(self.slow_requests_count, DEFAULT_SLOW_REQUESTS),
            recent_logs: size(self.recent_logs_count, DEFAULT_RECENT_LOGS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardSizes {
    pub top_errors: usize,
    pub top_endpoints: usize,
    pub slow_requests: usize,
    pub recent_logs: usize,
}

/// Full dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResult {
    pub from_date: NaiveDateTime,
    pub to_date: NaiveDateTime,
    pub statistics: LogStatistics,
    pub level_distribution: Vec<LevelShare>,
    pub hourly_trends: Vec<HourlyTrend>,
    pub top_errors: Vec<ErrorGroup>,
    pub slow_requests: Vec<SlowRequest>,
    pub endpoint_statistics: Vec<EndpointStatistics>,
    pub recent_logs: Vec<LogRecordView>,
    pub performance: Option<PerformanceSnapshot>,
    pub generated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStatistics {
    pub total_logs: u64,
    pub today_logs: u64,
    pub verbose_count: u64,
    pub debug_count: u64,
    pub information_count: u64,
    pub warning_count: u64,
    pub error_count: u64,
    pub fatal_count: u64,
    /// Records the HTTP figures and leaderboards were computed from. Lower
    /// than `total_logs` when the window held more records than one
    /// dashboard reads.
    pub analyzed_logs: u64,
    pub total_http_requests: u64,
    pub average_response_time_ms: f64,
    pub slow_request_count: u64,
    pub client_error_count: u64,
    pub server_error_count: u64,
    pub error_rate: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelShare {
    pub level: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyTrend {
    pub hour: NaiveDateTime,
    pub request_count: u64,
    pub error_count: u64,
    pub warning_count: u64,
    pub average_duration_ms: f64,
    pub slow_request_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorGroup {
    pub message: String,
    pub exception_type: Option<String>,
    pub count: u64,
    pub first_occurrence: NaiveDateTime,
    pub last_occurrence: NaiveDateTime,
    pub affected_endpoints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlowRequest {
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub request_path: Option<String>,
    pub http_method: Option<String>,
    pub duration_ms: u64,
    pub response_status_code: Option<i32>,
    pub user_id: Option<String>,
    pub performance_level: PerformanceTier,
    pub slow_tier: SlowTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointStatistics {
    pub request_path: String,
    pub http_method: String,
    pub request_count: u64,
    pub average_duration_ms: f64,
    pub min_duration_ms: Option<u64>,
    pub max_duration_ms: Option<u64>,
    pub error_count: u64,
    pub success_count: u64,
    pub error_rate: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    pub average_response_time_ms: f64,
    pub p95_response_time_ms: f64,
    pub p99_response_time_ms: f64,
    pub requests_per_minute: f64,
    pub errors_per_minute: f64,
    /// Requests per second over the window
    pub throughput: f64,
    pub error_rate: f64,
    pub health_status: HealthStatus,
}
