//! Log Repository
//!
//! Read-only Postgres access to stored log records. Two table layouts are
//! supported: the typed `app_logs` table and the legacy `logs` table (see
//! [`super::legacy`]). Both are queried through the same [`LogQuery`]
//! predicates.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use loglens_core::domain::log::{LogLevel, LogRecord};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder, Transaction};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use super::legacy::{LEGACY_COLUMNS, LEGACY_SELECT, LegacyRow};
use super::query::{Columns, LevelColumn, LogQuery, push_predicates, push_window};
use super::{RecordStore, StoreError, zeroed_level_counts};

/// Which table layout a store reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    Typed,
    Legacy,
}

impl LogSource {
    fn columns(self) -> &'static Columns {
        match self {
            LogSource::Typed => &TYPED_COLUMNS,
            LogSource::Legacy => &LEGACY_COLUMNS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogSource::Typed => "typed",
            LogSource::Legacy => "legacy",
        }
    }
}

impl std::str::FromStr for LogSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "typed" => Ok(LogSource::Typed),
            "legacy" => Ok(LogSource::Legacy),
            other => Err(format!("unknown log source: {other}")),
        }
    }
}

const TYPED_COLUMNS: Columns = Columns {
    table: "app_logs",
    level: LevelColumn::Name("level"),
    timestamp: "timestamp",
    message: "message",
    exception: "exception",
    user_id: "user_id",
    request_path: "request_path",
    http_method: "http_method",
    duration_ms: "duration_ms",
    order_by: "timestamp DESC, id DESC",
};

const TYPED_SELECT: &str = r#"
        SELECT id, message, level, timestamp, exception,
               properties::text AS properties, application, user_id,
               request_id, correlation_id, http_method, request_path,
               response_status_code, duration_ms
        FROM app_logs
        WHERE TRUE"#;

/// Postgres-backed record store
#[derive(Clone)]
pub struct PgLogStore {
    pool: PgPool,
    source: LogSource,
    query_timeout: Duration,
}

impl PgLogStore {
    pub fn new(pool: PgPool, source: LogSource, query_timeout: Duration) -> Self {
        Self {
            pool,
            source,
            query_timeout,
        }
    }

    async fn timed<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout(self.query_timeout)),
        }
    }

    /// A read-only transaction that sees one snapshot for all its statements
    async fn begin_snapshot(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    async fn fetch_page_snapshot(&self, query: &LogQuery) -> Result<(Vec<LogRecord>, u64), sqlx::Error> {
        let mut tx = self.begin_snapshot().await?;

        let total = count_rows(&mut *tx, self.source, query).await?;
        let records = fetch_rows(&mut *tx, self.source, query).await?;

        tx.commit().await?;
        Ok((records, total))
    }

    async fn fetch_with_level_counts_snapshot(
        &self,
        query: &LogQuery,
    ) -> Result<(Vec<LogRecord>, BTreeMap<LogLevel, u64>), sqlx::Error> {
        let mut tx = self.begin_snapshot().await?;

        let counts = level_count_rows(&mut *tx, self.source, query).await?;
        let records = fetch_rows(&mut *tx, self.source, query).await?;

        tx.commit().await?;
        Ok((records, counts))
    }
}

#[async_trait]
impl RecordStore for PgLogStore {
    async fn fetch(&self, query: &LogQuery) -> Result<Vec<LogRecord>, StoreError> {
        self.timed(fetch_rows(&self.pool, self.source, query)).await
    }

    async fn count(&self, query: &LogQuery) -> Result<u64, StoreError> {
        self.timed(count_rows(&self.pool, self.source, query)).await
    }

    async fn level_counts(&self, query: &LogQuery) -> Result<BTreeMap<LogLevel, u64>, StoreError> {
        self.timed(level_count_rows(&self.pool, self.source, query)).await
    }

    async fn fetch_page(&self, query: &LogQuery) -> Result<(Vec<LogRecord>, u64), StoreError> {
        self.timed(self.fetch_page_snapshot(query)).await
    }

    async fn fetch_with_level_counts(
        &self,
        query: &LogQuery,
    ) -> Result<(Vec<LogRecord>, BTreeMap<LogLevel, u64>), StoreError> {
        self.timed(self.fetch_with_level_counts_snapshot(query)).await
    }
}

// =============================================================================
// Queries
// =============================================================================

async fn fetch_rows<'e, E>(executor: E, source: LogSource, query: &LogQuery) -> Result<Vec<LogRecord>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let cols = source.columns();
    let select = match source {
        LogSource::Typed => TYPED_SELECT,
        LogSource::Legacy => LEGACY_SELECT,
    };

    let mut builder = QueryBuilder::<Postgres>::new(select);
    push_predicates(&mut builder, query, cols);
    push_window(&mut builder, query, cols);

    let records = match source {
        LogSource::Typed => builder
            .build_query_as::<LogRow>()
            .fetch_all(executor)
            .await?
            .into_iter()
            .map(LogRecord::from)
            .collect(),
        LogSource::Legacy => builder
            .build_query_as::<LegacyRow>()
            .fetch_all(executor)
            .await?
            .into_iter()
            .map(LogRecord::from)
            .collect(),
    };

    Ok(records)
}

async fn count_rows<'e, E>(executor: E, source: LogSource, query: &LogQuery) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let cols = source.columns();
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {} WHERE TRUE", cols.table));
    push_predicates(&mut builder, query, cols);

    let (count,) = builder
        .build_query_as::<(i64,)>()
        .fetch_one(executor)
        .await?;

    Ok(count.max(0) as u64)
}

async fn level_count_rows<'e, E>(
    executor: E,
    source: LogSource,
    query: &LogQuery,
) -> Result<BTreeMap<LogLevel, u64>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let mut builder = level_count_query(source, query);

    let rows = builder
        .build_query_as::<(Option<i32>, i64)>()
        .fetch_all(executor)
        .await?;

    let mut counts = zeroed_level_counts();
    for (ordinal, count) in rows {
        let level = ordinal
            .and_then(|o| i16::try_from(o).ok())
            .and_then(LogLevel::from_ordinal)
            .unwrap_or(LogLevel::Information);
        *counts.entry(level).or_default() += count.max(0) as u64;
    }

    Ok(counts)
}

/// Groups on the same normalised level expression the level filter uses,
/// so a record is counted under the level a search for it would match
fn level_count_query(source: LogSource, query: &LogQuery) -> QueryBuilder<'static, Postgres> {
    let cols = source.columns();
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT {} AS level, COUNT(*) AS count FROM {} WHERE TRUE",
        cols.level.ordinal_sql(),
        cols.table
    ));
    push_predicates(&mut builder, query, cols);
    builder.push(" GROUP BY 1");
    builder
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Names and ordinals both resolve through the shared level table; anything
/// unrecognised reads as Information, matching `LevelColumn::ordinal_sql`
fn decode_level(raw: Option<&str>) -> LogLevel {
    raw.and_then(LogLevel::from_name)
        .unwrap_or(LogLevel::Information)
}

fn parse_properties(raw: Option<&str>) -> serde_json::Map<String, serde_json::Value> {
    match raw.map(serde_json::from_str::<serde_json::Value>) {
        Some(Ok(serde_json::Value::Object(map))) => map,
        _ => serde_json::Map::new(),
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct LogRow {
    id: i64,
    message: String,
    level: String,
    timestamp: NaiveDateTime,
    exception: Option<String>,
    properties: Option<String>,
    application: Option<String>,
    user_id: Option<String>,
    request_id: Option<String>,
    correlation_id: Option<String>,
    http_method: Option<String>,
    request_path: Option<String>,
    response_status_code: Option<i32>,
    duration_ms: Option<i64>,
}

impl From<LogRow> for LogRecord {
    fn from(row: LogRow) -> Self {
        let properties = parse_properties(row.properties.as_deref());
        let application = row.application.or_else(|| {
            properties
                .get("Application")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        });

        LogRecord {
            id: row.id,
            message: row.message,
            level: decode_level(Some(&row.level)),
            timestamp: row.timestamp,
            exception: row.exception,
            properties,
            application,
            user_id: row.user_id,
            request_id: row.request_id,
            correlation_id: row.correlation_id,
            http_method: row.http_method,
            request_path: row.request_path,
            response_status_code: row.response_status_code,
            duration_ms: row.duration_ms.and_then(|d| u64::try_from(d).ok()),
        }
    }
}
