//! Repository Module
//!
//! Read-only access to stored log records.
//!
//! Every source implements [`RecordStore`]. Callers describe what they want
//! with a [`LogQuery`] and the store decides how to evaluate it; trend and
//! leaderboard logic lives in the services, never here.

pub mod legacy;
pub mod log;
pub mod memory;
pub mod query;

use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeDelta};
use loglens_core::domain::log::{LogLevel, LogRecord};
use std::collections::BTreeMap;

pub use self::log::{LogSource, PgLogStore};
pub use memory::MemoryLogStore;
pub use query::LogQuery;

/// Store error type
///
/// Infrastructure failures are surfaced to the caller as-is; nothing in
/// this workspace retries them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("query timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// A read-only source of log records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Records matching `query`, newest first, within its offset/limit window
    async fn fetch(&self, query: &LogQuery) -> Result<Vec<LogRecord>, StoreError>;

    /// Number of records matching `query`, ignoring its window
    async fn count(&self, query: &LogQuery) -> Result<u64, StoreError>;

    /// Per-level counts of records matching `query`. Every level is present.
    async fn level_counts(&self, query: &LogQuery) -> Result<BTreeMap<LogLevel, u64>, StoreError>;

    /// One window of records together with the total match count, read from
    /// a single consistent view where the source supports it
    async fn fetch_page(&self, query: &LogQuery) -> Result<(Vec<LogRecord>, u64), StoreError> {
        let total = self.count(query).await?;
        let records = self.fetch(query).await?;
        Ok((records, total))
    }

    /// Per-level counts of everything `query` matches, ignoring its window,
    /// plus the records inside the window. Read from a single consistent
    /// view where the source supports it.
    async fn fetch_with_level_counts(
        &self,
        query: &LogQuery,
    ) -> Result<(Vec<LogRecord>, BTreeMap<LogLevel, u64>), StoreError> {
        let counts = self.level_counts(&query.unbounded()).await?;
        let records = self.fetch(query).await?;
        Ok((records, counts))
    }

    /// Latest `count` records of any level
    async fn recent(&self, count: u64) -> Result<Vec<LogRecord>, StoreError> {
        self.fetch(&LogQuery::new().limit(count)).await
    }

    /// Latest `count` Error/Fatal records in the trailing `within_hours`
    async fn recent_errors(
        &self,
        count: u64,
        within_hours: i64,
        now: NaiveDateTime,
    ) -> Result<Vec<LogRecord>, StoreError> {
        // A span reaching past the representable range covers everything
        let since = TimeDelta::try_hours(within_hours.max(0)).and_then(|span| now.checked_sub_signed(span));
        let query = LogQuery::new()
            .between(since, None)
            .min_level(LogLevel::Error)
            .limit(count);
        self.fetch(&query).await
    }

    async fn total_count(&self) -> Result<u64, StoreError> {
        self.count(&LogQuery::new()).await
    }

    async fn count_in_range(&self, from: NaiveDateTime, to: NaiveDateTime) -> Result<u64, StoreError> {
        self.count(&LogQuery::new().between(Some(from), Some(to))).await
    }

    async fn level_counts_in(
        &self,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<BTreeMap<LogLevel, u64>, StoreError> {
        self.level_counts(&LogQuery::new().between(from, to)).await
    }
}

pub(crate) fn zeroed_level_counts() -> BTreeMap<LogLevel, u64> {
    LogLevel::ALL.into_iter().map(|level| (level, 0)).collect()
}
