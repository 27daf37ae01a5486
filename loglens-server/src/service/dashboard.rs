//! Dashboard Service
//!
//! Builds the full analytics dashboard for a time window. Level totals and
//! the newest records of the window are read from the store together, and
//! every section is computed from that one read.

use chrono::{Duration, NaiveDateTime};
use loglens_core::domain::time::start_of_day;
use loglens_core::dto::dashboard::{DashboardRequest, DashboardResult};
use loglens_core::dto::log::LogRecordView;
use tokio_util::sync::CancellationToken;

use crate::repository::{LogQuery, RecordStore, StoreError};
use crate::service::aggregate;

/// Window used when the request leaves the start open
const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Most records one dashboard reads. Level totals, rates and today's count
/// always cover the whole window; the per-record sections cover the newest
/// records up to this bound.
pub const MAX_ANALYZED_RECORDS: u64 = 100_000;

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("dashboard build was cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DashboardError>;

/// Builds the dashboard for `request` as of `now`.
///
/// Identical records, request and `now` always produce an identical result.
/// Cancelling `cancel` aborts the build with [`DashboardError::Cancelled`];
/// no partial dashboard is returned.
pub async fn build_dashboard(
    store: &dyn RecordStore,
    request: &DashboardRequest,
    now: NaiveDateTime,
    cancel: &CancellationToken,
) -> Result<DashboardResult> {
    build_dashboard_bounded(store, request, now, cancel, MAX_ANALYZED_RECORDS).await
}

async fn build_dashboard_bounded(
    store: &dyn RecordStore,
    request: &DashboardRequest,
    now: NaiveDateTime,
    cancel: &CancellationToken,
    max_records: u64,
) -> Result<DashboardResult> {
    let (from, to) = resolve_window(request, now);
    let sizes = request.sizes();

    tracing::debug!("Building dashboard for {} .. {}", from, to);

    let query = LogQuery::new().between(Some(from), Some(to)).limit(max_records);
    let (records, level_counts) = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(DashboardError::Cancelled),
        fetched = store.fetch_with_level_counts(&query) => fetched?,
    };

    let total: u64 = level_counts.values().sum();
    let complete = records.len() as u64 >= total;
    let today_start = start_of_day(now);

    let today_logs = if complete {
        records.iter().filter(|r| r.timestamp >= today_start).count() as u64
    } else {
        tracing::debug!(
            "Window holds {} records; analysing the newest {}",
            total,
            records.len()
        );
        let today = LogQuery::new().between(Some(from.max(today_start)), Some(to));
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DashboardError::Cancelled),
            counted = store.count(&today) => counted?,
        }
    };

    // Rates and trends are taken over the span the analysed records cover
    let analyzed_from = if complete {
        from
    } else {
        records.last().map_or(from, |oldest| oldest.timestamp)
    };

    checkpoint(cancel)?;
    let totals = aggregate::WindowTotals {
        level_counts,
        today_logs,
    };
    let statistics = aggregate::statistics(&records, &totals);
    let level_distribution = aggregate::level_distribution(&totals.level_counts);

    checkpoint(cancel)?;
    let hourly_trends = if request.include_hourly_trends {
        aggregate::hourly_trends(&records, analyzed_from, to)
    } else {
        Vec::new()
    };

    checkpoint(cancel)?;
    let top_errors = aggregate::top_errors(&records, sizes.top_errors);
    let slow_requests = aggregate::slow_requests(&records, sizes.slow_requests);
    let endpoint_statistics = aggregate::endpoint_statistics(&records, sizes.top_endpoints);

    checkpoint(cancel)?;
    let performance = request
        .include_performance_metrics
        .then(|| aggregate::performance_snapshot(&records, analyzed_from, to));

    let recent_logs = records
        .into_iter()
        .take(sizes.recent_logs)
        .map(LogRecordView::from)
        .collect();

    checkpoint(cancel)?;

    tracing::debug!(
        "Dashboard built: {} logs, {} error groups",
        statistics.total_logs,
        top_errors.len()
    );

    Ok(DashboardResult {
        from_date: from,
        to_date: to,
        statistics,
        level_distribution,
        hourly_trends,
        top_errors,
        slow_requests,
        endpoint_statistics,
        recent_logs,
        performance,
        generated_at: now,
    })
}

/// Inclusive `[from, to]`, defaulting to the trailing day ending at `now`.
/// A default start that would fall before the earliest representable time
/// is clamped to it.
pub fn resolve_window(request: &DashboardRequest, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let to = request.to_date.unwrap_or(now);
    let from = request.from_date.unwrap_or_else(|| {
        to.checked_sub_signed(Duration::hours(DEFAULT_WINDOW_HOURS))
            .unwrap_or(NaiveDateTime::MIN)
    });

    if from > to { (to, from) } else { (from, to) }
}

fn checkpoint(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        tracing::debug!("Dashboard build cancelled");
        return Err(DashboardError::Cancelled);
    }
    Ok(())
}
