//! Dashboard aggregations
//!
//! Pure functions over one snapshot of records (newest first, as the store
//! returns them). Every rate and percentile is defined on empty input and
//! resolves to 0.

use chrono::{Duration, NaiveDateTime};
use loglens_core::domain::classify::{
    PerformanceTier, SlowTier, StatusCategory, exception_type, is_error, is_slow_request, is_warning,
};
use loglens_core::domain::log::{LogLevel, LogRecord};
use loglens_core::domain::time::truncate_to_hour;
use loglens_core::dto::dashboard::{
    EndpointStatistics, ErrorGroup, HealthStatus, HourlyTrend, LevelShare, LogStatistics,
    PerformanceSnapshot, SlowRequest,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

const DEGRADED_ERROR_RATE: f64 = 5.0;
const CRITICAL_ERROR_RATE: f64 = 10.0;
const DEGRADED_P99_MS: f64 = 5_000.0;
const CRITICAL_P99_MS: f64 = 10_000.0;

/// Widest window, in hours, whose trend buckets are zero-filled (93 days)
pub const MAX_ZERO_FILLED_HOURS: i64 = 24 * 93;

// =============================================================================
// Math
// =============================================================================

pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

/// `part / total * 100`, rounded to two decimals; 0 when `total` is 0
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

/// Nearest-rank percentile of an ascending sample
pub fn percentile(sorted: &[u64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (p * sorted.len() as f64 / 100.0).ceil() as usize;
    let index = rank.clamp(1, sorted.len()) - 1;
    sorted[index] as f64
}

fn mean(durations: impl Iterator<Item = u64>) -> f64 {
    let (sum, count) = durations.fold((0u128, 0u64), |(sum, count), d| (sum + d as u128, count + 1));
    if count == 0 {
        return 0.0;
    }
    round2(sum as f64 / count as f64)
}

fn per_minute(count: u64, window: Duration) -> f64 {
    let minutes = window.num_milliseconds() as f64 / 60_000.0;
    if minutes <= 0.0 {
        return 0.0;
    }
    round2(count as f64 / minutes)
}

// =============================================================================
// Statistics
// =============================================================================

pub fn level_counts(records: &[LogRecord]) -> BTreeMap<LogLevel, u64> {
    let mut counts: BTreeMap<LogLevel, u64> = LogLevel::ALL.into_iter().map(|l| (l, 0)).collect();
    for record in records {
        *counts.entry(record.level).or_default() += 1;
    }
    counts
}

/// Window totals read from the store. These stay exact when only the newest
/// part of a large window is materialised for the per-record sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowTotals {
    pub level_counts: BTreeMap<LogLevel, u64>,
    pub today_logs: u64,
}

impl WindowTotals {
    /// Totals of a fully materialised window
    pub fn from_records(records: &[LogRecord], today_start: NaiveDateTime) -> Self {
        Self {
            level_counts: level_counts(records),
            today_logs: records.iter().filter(|r| r.timestamp >= today_start).count() as u64,
        }
    }

    pub fn total(&self) -> u64 {
        self.level_counts.values().sum()
    }

    fn count(&self, level: LogLevel) -> u64 {
        self.level_counts.get(&level).copied().unwrap_or_default()
    }
}

/// Level totals and rates come from `totals`; the HTTP figures come from
/// the analysed `records`
pub fn statistics(records: &[LogRecord], totals: &WindowTotals) -> LogStatistics {
    let total_logs = totals.total();
    let error_count = totals.count(LogLevel::Error) + totals.count(LogLevel::Fatal);

    let mut stats = LogStatistics {
        total_logs,
        today_logs: totals.today_logs,
        verbose_count: totals.count(LogLevel::Verbose),
        debug_count: totals.count(LogLevel::Debug),
        information_count: totals.count(LogLevel::Information),
        warning_count: totals.count(LogLevel::Warning),
        error_count,
        fatal_count: totals.count(LogLevel::Fatal),
        analyzed_logs: records.len() as u64,
        total_http_requests: records.iter().filter(|r| r.is_http()).count() as u64,
        average_response_time_ms: mean(records.iter().filter_map(|r| r.duration_ms)),
        slow_request_count: records.iter().filter(|r| is_slow_request(r.duration_ms)).count() as u64,
        ..Default::default()
    };

    for record in records {
        match StatusCategory::from_status(record.response_status_code) {
            StatusCategory::ClientError => stats.client_error_count += 1,
            StatusCategory::ServerError => stats.server_error_count += 1,
            _ => {}
        }
    }

    stats.error_rate = percentage(error_count, total_logs);
    stats.success_rate = percentage(total_logs.saturating_sub(error_count), total_logs);
    stats
}

pub fn level_distribution(counts: &BTreeMap<LogLevel, u64>) -> Vec<LevelShare> {
    let total: u64 = counts.values().sum();
    LogLevel::ALL
        .into_iter()
        .map(|level| {
            let count = counts.get(&level).copied().unwrap_or_default();
            LevelShare {
                level: level.name().to_string(),
                count,
                percentage: percentage(count, total),
            }
        })
        .collect()
}

// =============================================================================
// Trends
// =============================================================================

#[derive(Default)]
struct HourBucket {
    requests: u64,
    errors: u64,
    warnings: u64,
    slow: u64,
    duration_sum: u128,
    duration_count: u64,
}

/// One bucket per calendar hour from `from` to `to`, ascending.
///
/// Windows of up to [`MAX_ZERO_FILLED_HOURS`] hours are zero-filled; wider
/// windows only get buckets for hours that hold records.
pub fn hourly_trends(records: &[LogRecord], from: NaiveDateTime, to: NaiveDateTime) -> Vec<HourlyTrend> {
    let mut buckets: BTreeMap<NaiveDateTime, HourBucket> = BTreeMap::new();

    let first = truncate_to_hour(from);
    let last = truncate_to_hour(to);
    if (last - first).num_hours() < MAX_ZERO_FILLED_HOURS {
        let mut hour = Some(first);
        while let Some(current) = hour.filter(|h| *h <= last) {
            buckets.insert(current, HourBucket::default());
            hour = current.checked_add_signed(Duration::hours(1));
        }
    }

    for record in records {
        let bucket = buckets.entry(truncate_to_hour(record.timestamp)).or_default();
        bucket.requests += 1;
        if is_error(record.level) {
            bucket.errors += 1;
        }
        if is_warning(record.level) {
            bucket.warnings += 1;
        }
        if is_slow_request(record.duration_ms) {
            bucket.slow += 1;
        }
        if let Some(d) = record.duration_ms {
            bucket.duration_sum += d as u128;
            bucket.duration_count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(hour, b)| HourlyTrend {
            hour,
            request_count: b.requests,
            error_count: b.errors,
            warning_count: b.warnings,
            average_duration_ms: if b.duration_count == 0 {
                0.0
            } else {
                round2(b.duration_sum as f64 / b.duration_count as f64)
            },
            slow_request_count: b.slow,
        })
        .collect()
}

// =============================================================================
// Leaderboards
// =============================================================================

/// Error/Fatal records grouped by message and exception type
pub fn top_errors(records: &[LogRecord], limit: usize) -> Vec<ErrorGroup> {
    let mut groups: HashMap<(String, Option<String>), ErrorGroup> = HashMap::new();
    let mut endpoints: HashMap<(String, Option<String>), BTreeSet<String>> = HashMap::new();

    for record in records.iter().filter(|r| is_error(r.level)) {
        let exception = record
            .exception
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .map(exception_type);
        let key = (record.message.clone(), exception.clone());

        let group = groups.entry(key.clone()).or_insert_with(|| ErrorGroup {
            message: record.message.clone(),
            exception_type: exception,
            count: 0,
            first_occurrence: record.timestamp,
            last_occurrence: record.timestamp,
            affected_endpoints: Vec::new(),
        });
        group.count += 1;
        group.first_occurrence = group.first_occurrence.min(record.timestamp);
        group.last_occurrence = group.last_occurrence.max(record.timestamp);

        if let Some(path) = &record.request_path {
            endpoints.entry(key).or_default().insert(path.clone());
        }
    }

    let mut ranked: Vec<ErrorGroup> = groups
        .into_iter()
        .map(|(key, mut group)| {
            group.affected_endpoints = endpoints.remove(&key).unwrap_or_default().into_iter().collect();
            group
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(b.last_occurrence.cmp(&a.last_occurrence))
            .then(a.message.cmp(&b.message))
            .then(a.exception_type.cmp(&b.exception_type))
    });
    ranked.truncate(limit);
    ranked
}

/// Requests over the slow threshold, slowest first
pub fn slow_requests(records: &[LogRecord], limit: usize) -> Vec<SlowRequest> {
    let mut slow: Vec<&LogRecord> = records.iter().filter(|r| is_slow_request(r.duration_ms)).collect();
    slow.sort_by(|a, b| {
        b.duration_ms
            .cmp(&a.duration_ms)
            .then(b.timestamp.cmp(&a.timestamp))
            .then(b.id.cmp(&a.id))
    });

    slow.into_iter()
        .take(limit)
        .map(|r| {
            let duration_ms = r.duration_ms.unwrap_or_default();
            SlowRequest {
                id: r.id,
                timestamp: r.timestamp,
                request_path: r.request_path.clone(),
                http_method: r.http_method.clone(),
                duration_ms,
                response_status_code: r.response_status_code,
                user_id: r.user_id.clone(),
                performance_level: PerformanceTier::from_duration(r.duration_ms),
                slow_tier: SlowTier::from_duration(duration_ms),
            }
        })
        .collect()
}

#[derive(Default)]
struct EndpointAcc {
    requests: u64,
    errors: u64,
    duration_sum: u128,
    duration_count: u64,
    min: Option<u64>,
    max: Option<u64>,
}

fn is_failed_request(record: &LogRecord) -> bool {
    is_error(record.level) || record.response_status_code.is_some_and(|s| s >= 400)
}

/// Per (path, method) statistics, busiest endpoints first
pub fn endpoint_statistics(records: &[LogRecord], limit: usize) -> Vec<EndpointStatistics> {
    let mut endpoints: BTreeMap<(String, String), EndpointAcc> = BTreeMap::new();

    for record in records {
        let Some(path) = &record.request_path else {
            continue;
        };
        let method = record
            .http_method
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_else(|| "UNKNOWN".to_string());

        let acc = endpoints.entry((path.clone(), method)).or_default();
        acc.requests += 1;
        if is_failed_request(record) {
            acc.errors += 1;
        }
        if let Some(d) = record.duration_ms {
            acc.duration_sum += d as u128;
            acc.duration_count += 1;
            acc.min = Some(acc.min.map_or(d, |m| m.min(d)));
            acc.max = Some(acc.max.map_or(d, |m| m.max(d)));
        }
    }

    let mut stats: Vec<EndpointStatistics> = endpoints
        .into_iter()
        .map(|((request_path, http_method), acc)| {
            let success_count = acc.requests - acc.errors;
            EndpointStatistics {
                request_path,
                http_method,
                request_count: acc.requests,
                average_duration_ms: if acc.duration_count == 0 {
                    0.0
                } else {
                    round2(acc.duration_sum as f64 / acc.duration_count as f64)
                },
                min_duration_ms: acc.min,
                max_duration_ms: acc.max,
                error_count: acc.errors,
                success_count,
                error_rate: percentage(acc.errors, acc.requests),
                success_rate: percentage(success_count, acc.requests),
            }
        })
        .collect();

    // stable sort keeps the (path, method) order among equal counts
    stats.sort_by(|a, b| b.request_count.cmp(&a.request_count));
    stats.truncate(limit);
    stats
}

// =============================================================================
// Performance
// =============================================================================

pub fn performance_snapshot(
    records: &[LogRecord],
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> PerformanceSnapshot {
    let mut durations: Vec<u64> = records.iter().filter_map(|r| r.duration_ms).collect();
    durations.sort_unstable();

    let window = to - from;
    let requests = records.iter().filter(|r| r.is_http()).count() as u64;
    let errors = records.iter().filter(|r| is_error(r.level)).count() as u64;
    let error_rate = percentage(errors, records.len() as u64);
    let p99 = percentile(&durations, 99.0);

    let seconds = window.num_milliseconds() as f64 / 1_000.0;
    let throughput = if seconds > 0.0 {
        round2(requests as f64 / seconds)
    } else {
        0.0
    };

    PerformanceSnapshot {
        average_response_time_ms: mean(durations.iter().copied()),
        p95_response_time_ms: percentile(&durations, 95.0),
        p99_response_time_ms: p99,
        requests_per_minute: per_minute(requests, window),
        errors_per_minute: per_minute(errors, window),
        throughput,
        error_rate,
        health_status: health_status(error_rate, p99),
    }
}

pub fn health_status(error_rate: f64, p99_ms: f64) -> HealthStatus {
    if error_rate >= CRITICAL_ERROR_RATE || p99_ms >= CRITICAL_P99_MS {
        HealthStatus::Critical
    } else if error_rate >= DEGRADED_ERROR_RATE || p99_ms >= DEGRADED_P99_MS {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 8, 20)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn http(id: i64, level: LogLevel, ts: NaiveDateTime, path: &str, status: i32, duration: Option<u64>) -> LogRecord {
        let mut record = LogRecord::new(id, level, ts, format!("{path} handled"));
        record.request_path = Some(path.to_string());
        record.http_method = Some("get".to_string());
        record.response_status_code = Some(status);
        record.duration_ms = duration;
        record
    }

    #[test]
    fn test_percentage_zero_guard() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
    }

    #[test]
    fn test_percentile_nearest_rank() {
        assert_eq!(percentile(&[], 95.0), 0.0);
        assert_eq!(percentile(&[42], 99.0), 42.0);

        let sample: Vec<u64> = (1..=100).collect();
        assert_eq!(percentile(&sample, 95.0), 95.0);
        assert_eq!(percentile(&sample, 99.0), 99.0);
        assert_eq!(percentile(&sample, 100.0), 100.0);
        assert_eq!(percentile(&sample, 0.0), 1.0);

        assert_eq!(percentile(&[10, 20, 30, 40], 95.0), 40.0);
        assert_eq!(percentile(&[10, 20, 30, 40], 50.0), 20.0);
    }

    #[test]
    fn test_statistics_on_empty_input() {
        let stats = statistics(&[], &WindowTotals::from_records(&[], at(0, 0)));
        assert_eq!(stats, LogStatistics::default());
        assert_eq!(stats.error_rate, 0.0);
        assert_eq!(stats.success_rate, 0.0);
    }

    #[test]
    fn test_statistics() {
        let records = vec![
            http(1, LogLevel::Information, at(1, 0), "/a", 200, Some(100)),
            http(2, LogLevel::Warning, at(2, 0), "/a", 404, Some(300)),
            http(3, LogLevel::Error, at(3, 0), "/b", 500, Some(6_000)),
            LogRecord::new(4, LogLevel::Fatal, at(4, 0), "crash"),
        ];
        let stats = statistics(&records, &WindowTotals::from_records(&records, at(2, 30)));

        assert_eq!(stats.total_logs, 4);
        assert_eq!(stats.analyzed_logs, 4);
        assert_eq!(stats.today_logs, 2);
        assert_eq!(stats.error_count, 2);
        assert_eq!(stats.fatal_count, 1);
        assert_eq!(stats.total_http_requests, 3);
        assert_eq!(stats.average_response_time_ms, 2_133.33);
        assert_eq!(stats.slow_request_count, 1);
        assert_eq!(stats.client_error_count, 1);
        assert_eq!(stats.server_error_count, 1);
        assert_eq!(stats.error_rate, 50.0);
        assert_eq!(stats.success_rate, 50.0);
    }

    #[test]
    fn test_level_distribution_covers_every_level() {
        let records = vec![
            LogRecord::new(1, LogLevel::Error, at(1, 0), "x"),
            LogRecord::new(2, LogLevel::Information, at(1, 0), "y"),
            LogRecord::new(3, LogLevel::Information, at(1, 0), "z"),
            LogRecord::new(4, LogLevel::Information, at(1, 0), "w"),
        ];
        let distribution = level_distribution(&level_counts(&records));
        assert_eq!(distribution.len(), 6);
        assert_eq!(distribution[0].level, "Verbose");
        assert_eq!(distribution[2].count, 3);
        assert_eq!(distribution[2].percentage, 75.0);
        assert_eq!(distribution[4].percentage, 25.0);
        assert_eq!(distribution.iter().map(|d| d.count).sum::<u64>(), 4);
    }

    #[test]
    fn test_hourly_trends_zero_fill() {
        let records = vec![
            http(1, LogLevel::Error, at(10, 5), "/a", 500, Some(6_000)),
            http(2, LogLevel::Warning, at(10, 40), "/a", 200, Some(1_000)),
        ];
        let trends = hourly_trends(&records, at(10, 0), at(11, 59));

        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].hour, at(10, 0));
        assert_eq!(trends[0].request_count, 2);
        assert_eq!(trends[0].error_count, 1);
        assert_eq!(trends[0].warning_count, 1);
        assert_eq!(trends[0].slow_request_count, 1);
        assert_eq!(trends[0].average_duration_ms, 3_500.0);

        assert_eq!(trends[1].hour, at(11, 0));
        assert_eq!(trends[1].request_count, 0);
        assert_eq!(trends[1].error_count, 0);
        assert_eq!(trends[1].warning_count, 0);
        assert_eq!(trends[1].slow_request_count, 0);
        assert_eq!(trends[1].average_duration_ms, 0.0);
    }

    #[test]
    fn test_totals_outweigh_a_partial_sample() {
        let sample = vec![
            http(1, LogLevel::Information, at(9, 0), "/a", 200, Some(100)),
            http(2, LogLevel::Error, at(9, 5), "/a", 500, Some(300)),
        ];
        let totals = WindowTotals {
            level_counts: [(LogLevel::Information, 90), (LogLevel::Error, 10)].into_iter().collect(),
            today_logs: 40,
        };
        let stats = statistics(&sample, &totals);

        assert_eq!(stats.total_logs, 100);
        assert_eq!(stats.analyzed_logs, 2);
        assert_eq!(stats.today_logs, 40);
        assert_eq!(stats.error_rate, 10.0);
        assert_eq!(stats.success_rate, 90.0);
        assert_eq!(stats.total_http_requests, 2);
        assert_eq!(stats.server_error_count, 1);

        let distribution = level_distribution(&totals.level_counts);
        assert_eq!(distribution.len(), 6);
        assert_eq!(distribution[4].percentage, 10.0);
    }

    #[test]
    fn test_hourly_trends_wide_window_is_sparse() {
        let from = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(hourly_trends(&[], from, at(23, 0)).is_empty());

        let records = vec![
            http(1, LogLevel::Information, at(3, 15), "/a", 200, Some(10)),
            http(2, LogLevel::Information, at(7, 45), "/a", 200, Some(30)),
        ];
        let trends = hourly_trends(&records, from, at(23, 0));
        let hours: Vec<NaiveDateTime> = trends.iter().map(|t| t.hour).collect();
        assert_eq!(hours, vec![at(3, 0), at(7, 0)]);

        let edge = at(0, 0) - Duration::hours(MAX_ZERO_FILLED_HOURS - 1);
        assert_eq!(hourly_trends(&[], edge, at(0, 0)).len(), MAX_ZERO_FILLED_HOURS as usize);
    }

    #[test]
    fn test_hourly_trends_at_the_end_of_time() {
        let to = NaiveDateTime::MAX;
        let from = to.checked_sub_signed(Duration::minutes(10)).unwrap();
        let trends = hourly_trends(&[], from, to);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].hour, truncate_to_hour(to));

        let start = NaiveDateTime::MIN;
        let trends = hourly_trends(&[], start, start.checked_add_signed(Duration::minutes(90)).unwrap());
        assert_eq!(trends.len(), 2);
    }

    #[test]
    fn test_top_errors_grouping() {
        let mut records = Vec::new();
        for i in 0..3 {
            let mut r = http(i, LogLevel::Error, at(5, i as u32), if i == 0 { "/x" } else { "/y" }, 500, None);
            r.message = "db down".to_string();
            r.exception = Some("Npgsql.NpgsqlException: refused".to_string());
            records.push(r);
        }
        let mut other = LogRecord::new(10, LogLevel::Fatal, at(6, 0), "db down");
        other.exception = Some("System.TimeoutException: slow".to_string());
        records.push(other);
        records.push(LogRecord::new(11, LogLevel::Warning, at(6, 0), "db down"));

        let top = top_errors(&records, 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].count, 3);
        assert_eq!(top[0].exception_type.as_deref(), Some("Npgsql.NpgsqlException"));
        assert_eq!(top[0].first_occurrence, at(5, 0));
        assert_eq!(top[0].last_occurrence, at(5, 2));
        assert_eq!(top[0].affected_endpoints, vec!["/x".to_string(), "/y".to_string()]);
        assert_eq!(top[1].count, 1);
        assert!(top[1].affected_endpoints.is_empty());

        assert_eq!(top_errors(&records, 1).len(), 1);
    }

    #[test]
    fn test_slow_requests_exclude_missing_duration() {
        let records = vec![
            http(1, LogLevel::Information, at(1, 0), "/a", 200, Some(5_001)),
            http(2, LogLevel::Information, at(1, 0), "/a", 200, None),
            http(3, LogLevel::Information, at(1, 0), "/a", 200, Some(12_000)),
            http(4, LogLevel::Information, at(1, 0), "/a", 200, Some(5_000)),
        ];
        let slow = slow_requests(&records, 20);
        let ids: Vec<i64> = slow.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(slow[0].performance_level, PerformanceTier::Critical);
        assert_eq!(slow[0].slow_tier, SlowTier::Critical);
        assert_eq!(slow[1].slow_tier, SlowTier::Slow);
    }

    #[test]
    fn test_endpoint_statistics() {
        let records = vec![
            http(1, LogLevel::Information, at(1, 0), "/a", 200, Some(100)),
            http(2, LogLevel::Information, at(1, 0), "/a", 404, Some(300)),
            http(3, LogLevel::Information, at(1, 0), "/a", 200, None),
            http(4, LogLevel::Error, at(1, 0), "/b", 200, Some(50)),
            LogRecord::new(5, LogLevel::Information, at(1, 0), "no endpoint"),
        ];
        let stats = endpoint_statistics(&records, 10);

        assert_eq!(stats.len(), 2);
        let a = &stats[0];
        assert_eq!((a.request_path.as_str(), a.http_method.as_str()), ("/a", "GET"));
        assert_eq!(a.request_count, 3);
        assert_eq!(a.average_duration_ms, 200.0);
        assert_eq!(a.min_duration_ms, Some(100));
        assert_eq!(a.max_duration_ms, Some(300));
        assert_eq!(a.error_count, 1);
        assert_eq!(a.success_count, 2);
        assert_eq!(a.error_rate, 33.33);
        assert_eq!(a.success_rate, 66.67);

        assert_eq!(stats[1].error_count, 1);
        assert_eq!(stats[1].error_rate, 100.0);
        assert_eq!(endpoint_statistics(&records, 1).len(), 1);
    }

    #[test]
    fn test_performance_snapshot_empty() {
        let snapshot = performance_snapshot(&[], at(0, 0), at(1, 0));
        assert_eq!(snapshot.average_response_time_ms, 0.0);
        assert_eq!(snapshot.p95_response_time_ms, 0.0);
        assert_eq!(snapshot.p99_response_time_ms, 0.0);
        assert_eq!(snapshot.requests_per_minute, 0.0);
        assert_eq!(snapshot.throughput, 0.0);
        assert_eq!(snapshot.health_status, HealthStatus::Healthy);

        let zero_window = performance_snapshot(&[], at(1, 0), at(1, 0));
        assert_eq!(zero_window.errors_per_minute, 0.0);
    }

    #[test]
    fn test_performance_snapshot_rates() {
        let records: Vec<LogRecord> = (0..60)
            .map(|i| http(i, LogLevel::Information, at(0, (i % 60) as u32), "/a", 200, Some(10 * (i as u64 + 1))))
            .collect();
        let snapshot = performance_snapshot(&records, at(0, 0), at(1, 0));

        assert_eq!(snapshot.requests_per_minute, 1.0);
        assert_eq!(snapshot.errors_per_minute, 0.0);
        assert_eq!(snapshot.throughput, 0.02);
        assert_eq!(snapshot.p95_response_time_ms, 570.0);
        assert_eq!(snapshot.p99_response_time_ms, 600.0);
        assert_eq!(snapshot.average_response_time_ms, 305.0);
        assert_eq!(snapshot.health_status, HealthStatus::Healthy);
    }

    #[test]
    fn test_health_status_thresholds() {
        assert_eq!(health_status(0.0, 0.0), HealthStatus::Healthy);
        assert_eq!(health_status(5.0, 0.0), HealthStatus::Degraded);
        assert_eq!(health_status(0.0, 5_000.0), HealthStatus::Degraded);
        assert_eq!(health_status(10.0, 0.0), HealthStatus::Critical);
        assert_eq!(health_status(0.0, 12_000.0), HealthStatus::Critical);
    }
}
