//! Log API Handlers
//!
//! Read-only HTTP endpoints for search, dashboards and quick lookups.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDateTime;
use loglens_core::domain::time::{local_now, naive_opt};
use loglens_core::dto::dashboard::{DashboardRequest, DashboardResult};
use loglens_core::dto::log::LogRecordView;
use loglens_core::dto::search::{SearchRequest, SearchResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::{dashboard_service, search_service};

const MAX_FEED_SIZE: u64 = 1000;

/// Widest trailing window the recent-errors feed accepts, in hours
const MAX_ERROR_WINDOW_HOURS: i64 = 24 * 366;

// =============================================================================
// Search & Dashboard
// =============================================================================

/// POST /logs/search
/// Filtered, paginated search
pub async fn search_logs(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> ApiResult<Json<SearchResult>> {
    tracing::debug!("Searching logs: page={} page_size={}", req.page, req.page_size);

    let result = search_service::search(state.store.as_ref(), &req).await?;

    Ok(Json(result))
}

/// POST /logs/dashboard
/// Full dashboard for a window
pub async fn get_dashboard(
    State(state): State<AppState>,
    Json(req): Json<DashboardRequest>,
) -> ApiResult<Json<DashboardResult>> {
    tracing::debug!("Building dashboard: from={:?} to={:?}", req.from_date, req.to_date);

    // Cancelled when the client goes away and this future is dropped
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let dashboard =
        dashboard_service::build_dashboard(state.store.as_ref(), &req, local_now(), &cancel).await?;

    Ok(Json(dashboard))
}

// =============================================================================
// Feeds & Counts
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub count: Option<u64>,
}

/// GET /logs/recent?count=50
/// Latest records of any level
pub async fn recent_logs(
    State(state): State<AppState>,
    Query(params): Query<RecentQuery>,
) -> ApiResult<Json<Vec<LogRecordView>>> {
    let count = params.count.unwrap_or(50).clamp(1, MAX_FEED_SIZE);
    tracing::debug!("Getting {} recent logs", count);

    let records = state.store.recent(count).await?;

    Ok(Json(records.into_iter().map(LogRecordView::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct RecentErrorsQuery {
    pub count: Option<u64>,
    pub hours: Option<i64>,
}

/// GET /logs/errors/recent?count=20&hours=24
/// Latest Error/Fatal records in a trailing window
pub async fn recent_errors(
    State(state): State<AppState>,
    Query(params): Query<RecentErrorsQuery>,
) -> ApiResult<Json<Vec<LogRecordView>>> {
    let count = params.count.unwrap_or(20).clamp(1, MAX_FEED_SIZE);
    let hours = params.hours.unwrap_or(24).clamp(1, MAX_ERROR_WINDOW_HOURS);
    tracing::debug!("Getting {} recent errors within {}h", count, hours);

    let records = state.store.recent_errors(count, hours, local_now()).await?;

    Ok(Json(records.into_iter().map(LogRecordView::from).collect()))
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    #[serde(default, with = "naive_opt")]
    pub from: Option<NaiveDateTime>,
    #[serde(default, with = "naive_opt")]
    pub to: Option<NaiveDateTime>,
}

/// GET /logs/levels?from=..&to=..
/// Record counts per level
pub async fn level_counts(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> ApiResult<Json<BTreeMap<String, u64>>> {
    tracing::debug!("Counting levels: from={:?} to={:?}", range.from, range.to);

    let counts = state.store.level_counts_in(range.from, range.to).await?;

    Ok(Json(
        counts
            .into_iter()
            .map(|(level, count)| (level.name().to_string(), count))
            .collect(),
    ))
}

/// GET /logs/count?from=..&to=..
/// Total number of records, optionally within a range
pub async fn count_logs(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> ApiResult<Json<u64>> {
    let count = match (range.from, range.to) {
        (None, None) => state.store.total_count().await?,
        (Some(from), Some(to)) => state.store.count_in_range(from, to).await?,
        (from, to) => {
            state
                .store
                .count(&crate::repository::LogQuery::new().between(from, to))
                .await?
        }
    };

    Ok(Json(count))
}
