//! Search Service
//!
//! Filtered, paginated search over stored log records.

use loglens_core::dto::log::LogRecordView;
use loglens_core::dto::search::{NormalizedSearch, SearchRequest, SearchResult, total_pages};

use crate::repository::{LogQuery, RecordStore, StoreError};

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// Runs a search. Out-of-range request values are corrected, never rejected.
pub async fn search(store: &dyn RecordStore, request: &SearchRequest) -> Result<SearchResult> {
    let search = request.normalize();
    let query = to_query(&search);

    tracing::debug!(
        "Searching logs: page={}, page_size={}, query={:?}",
        search.page,
        search.page_size,
        query
    );

    let (records, total_count) = store.fetch_page(&query).await?;

    Ok(SearchResult {
        items: records.into_iter().map(LogRecordView::from).collect(),
        total_count,
        page: search.page,
        page_size: search.page_size,
        total_pages: total_pages(total_count, search.page_size),
    })
}

fn to_query(search: &NormalizedSearch) -> LogQuery {
    LogQuery {
        from: search.from_date,
        to: search.to_date,
        levels: search.levels.clone(),
        min_level: None,
        search_text: search.search_text.clone(),
        user_id: search.user_id.clone(),
        request_path: search.request_path.clone(),
        http_method: search.http_method.clone(),
        min_duration: search.min_duration,
        max_duration: search.max_duration,
        has_exception: search.has_exception,
        requires_duration: false,
        offset: search.offset(),
        limit: Some(search.page_size as u64),
    }
}
