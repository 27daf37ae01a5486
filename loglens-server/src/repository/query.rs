//! Log Query
//!
//! The one predicate builder behind search and dashboard slicing. A
//! [`LogQuery`] is evaluated in memory by [`LogQuery::matches`] and rendered
//! to SQL by [`push_predicates`]; both read the same fields so the two
//! paths cannot drift apart.

use chrono::NaiveDateTime;
use loglens_core::domain::log::{LogLevel, LogRecord};
use sqlx::{Postgres, QueryBuilder};
use std::collections::BTreeSet;

/// A set of optional, conjunctive predicates plus a result window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogQuery {
    /// Inclusive lower bound on the timestamp
    pub from: Option<NaiveDateTime>,
    /// Inclusive upper bound on the timestamp
    pub to: Option<NaiveDateTime>,
    pub levels: Option<BTreeSet<LogLevel>>,
    pub min_level: Option<LogLevel>,
    /// Case-insensitive substring of message or exception
    pub search_text: Option<String>,
    /// Exact match
    pub user_id: Option<String>,
    /// Case-insensitive substring
    pub request_path: Option<String>,
    /// Case-insensitive exact match
    pub http_method: Option<String>,
    pub min_duration: Option<u64>,
    pub max_duration: Option<u64>,
    pub has_exception: Option<bool>,
    pub requires_duration: bool,
    pub offset: u64,
    pub limit: Option<u64>,
}

impl LogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(mut self, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = Some(level);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Same predicates without the offset/limit window
    pub fn unbounded(&self) -> Self {
        Self {
            offset: 0,
            limit: None,
            ..self.clone()
        }
    }

    /// Levels a record may have to match, combining `levels` and
    /// `min_level`. `None` means every level matches.
    pub fn effective_levels(&self) -> Option<BTreeSet<LogLevel>> {
        match (&self.levels, self.min_level) {
            (None, None) => None,
            (Some(levels), None) => Some(levels.clone()),
            (None, Some(min)) => Some(min.and_above().collect()),
            (Some(levels), Some(min)) => Some(levels.iter().copied().filter(|l| *l >= min).collect()),
        }
    }

    /// Evaluates every predicate against `record`; the window is ignored
    pub fn matches(&self, record: &LogRecord) -> bool {
        if self.from.is_some_and(|from| record.timestamp < from) {
            return false;
        }
        if self.to.is_some_and(|to| record.timestamp > to) {
            return false;
        }
        if let Some(levels) = self.effective_levels() {
            if !levels.contains(&record.level) {
                return false;
            }
        }
        if let Some(text) = &self.search_text {
            let needle = text.to_lowercase();
            let in_message = record.message.to_lowercase().contains(&needle);
            let in_exception = record
                .exception
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(&needle));
            if !in_message && !in_exception {
                return false;
            }
        }
        if let Some(user_id) = &self.user_id {
            if record.user_id.as_deref() != Some(user_id.as_str()) {
                return false;
            }
        }
        if let Some(path) = &self.request_path {
            let needle = path.to_lowercase();
            if !record
                .request_path
                .as_deref()
                .is_some_and(|p| p.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        if let Some(method) = &self.http_method {
            if !record
                .http_method
                .as_deref()
                .is_some_and(|m| m.eq_ignore_ascii_case(method))
            {
                return false;
            }
        }
        if self.constrains_duration() {
            let Some(duration) = record.duration_ms else {
                return false;
            };
            if self.min_duration.is_some_and(|min| duration < min) {
                return false;
            }
            if self.max_duration.is_some_and(|max| duration > max) {
                return false;
            }
        }
        if let Some(wanted) = self.has_exception {
            if record.has_exception() != wanted {
                return false;
            }
        }
        true
    }

    fn constrains_duration(&self) -> bool {
        self.requires_duration || self.min_duration.is_some() || self.max_duration.is_some()
    }
}

// =============================================================================
// SQL Rendering
// =============================================================================

/// How a source stores the severity level
#[derive(Debug, Clone, Copy)]
pub enum LevelColumn {
    /// Level name, e.g. `'Error'`
    Name(&'static str),
    /// Level ordinal, e.g. `4`
    Ordinal(&'static str),
}

impl LevelColumn {
    /// The stored level as an ordinal, decoded exactly as
    /// [`LogLevel::from_name`] / [`LogLevel::from_ordinal`] decode it on
    /// read: names and aliases case-insensitively, numeric text as an
    /// ordinal, anything unrecognised as Information.
    pub fn ordinal_sql(&self) -> String {
        let fallback = LogLevel::Information.ordinal();
        match self {
            LevelColumn::Ordinal(col) => format!(
                "(CASE WHEN {col} BETWEEN {min} AND {max} THEN {col} ELSE {fallback} END)",
                min = LogLevel::Verbose.ordinal(),
                max = LogLevel::Fatal.ordinal(),
            ),
            LevelColumn::Name(col) => {
                let trimmed = format!("btrim({col}, E' \\t\\n\\r')");
                let mut sql = format!(
                    "(CASE WHEN {trimmed} ~ '^[+-]?[0-9]+$' THEN \
                     (CASE WHEN {trimmed}::numeric BETWEEN {min} AND {max} THEN {trimmed}::integer ELSE {fallback} END) \
                     ELSE (CASE lower({trimmed})",
                    min = LogLevel::Verbose.ordinal(),
                    max = LogLevel::Fatal.ordinal(),
                );
                for (spelling, level) in LogLevel::spellings() {
                    sql.push_str(&format!(" WHEN '{}' THEN {}", spelling.to_ascii_lowercase(), level.ordinal()));
                }
                sql.push_str(&format!(" ELSE {fallback} END) END)"));
                sql
            }
        }
    }
}

/// SQL expressions a source uses for each filterable field
#[derive(Debug, Clone, Copy)]
pub struct Columns {
    pub table: &'static str,
    pub level: LevelColumn,
    pub timestamp: &'static str,
    pub message: &'static str,
    pub exception: &'static str,
    pub user_id: &'static str,
    pub request_path: &'static str,
    pub http_method: &'static str,
    pub duration_ms: &'static str,
    pub order_by: &'static str,
}

/// Appends ` AND <predicate>` for every predicate set on `query`.
///
/// The builder must already end in a `WHERE` clause (`WHERE TRUE` works).
pub fn push_predicates(builder: &mut QueryBuilder<'_, Postgres>, query: &LogQuery, cols: &Columns) {
    if let Some(from) = query.from {
        builder.push(format!(" AND {} >= ", cols.timestamp));
        builder.push_bind(from);
    }
    if let Some(to) = query.to {
        builder.push(format!(" AND {} <= ", cols.timestamp));
        builder.push_bind(to);
    }
    if let Some(levels) = query.effective_levels() {
        if levels.is_empty() {
            builder.push(" AND FALSE");
        } else {
            let ordinals: Vec<i32> = levels.iter().map(|l| i32::from(l.ordinal())).collect();
            builder.push(format!(" AND {} = ANY(", cols.level.ordinal_sql()));
            builder.push_bind(ordinals);
            builder.push(")");
        }
    }
    if let Some(text) = &query.search_text {
        let pattern = like_pattern(text);
        builder.push(format!(" AND ({} ILIKE ", cols.message));
        builder.push_bind(pattern.clone());
        builder.push(format!(" OR {} ILIKE ", cols.exception));
        builder.push_bind(pattern);
        builder.push(")");
    }
    if let Some(user_id) = &query.user_id {
        builder.push(format!(" AND {} = ", cols.user_id));
        builder.push_bind(user_id.clone());
    }
    if let Some(path) = &query.request_path {
        builder.push(format!(" AND {} ILIKE ", cols.request_path));
        builder.push_bind(like_pattern(path));
    }
    if let Some(method) = &query.http_method {
        builder.push(format!(" AND UPPER({}) = ", cols.http_method));
        builder.push_bind(method.to_uppercase());
    }
    if query.constrains_duration() {
        builder.push(format!(" AND {} IS NOT NULL", cols.duration_ms));
    }
    if let Some(min) = query.min_duration {
        builder.push(format!(" AND {} >= ", cols.duration_ms));
        builder.push_bind(clamp_i64(min));
    }
    if let Some(max) = query.max_duration {
        builder.push(format!(" AND {} <= ", cols.duration_ms));
        builder.push_bind(clamp_i64(max));
    }
    match query.has_exception {
        Some(true) => {
            builder.push(format!(
                " AND ({0} IS NOT NULL AND btrim({0}) <> '')",
                cols.exception
            ));
        }
        Some(false) => {
            builder.push(format!(
                " AND ({0} IS NULL OR btrim({0}) = '')",
                cols.exception
            ));
        }
        None => {}
    }
}

/// Appends the newest-first ordering and the offset/limit window
pub fn push_window(builder: &mut QueryBuilder<'_, Postgres>, query: &LogQuery, cols: &Columns) {
    builder.push(format!(" ORDER BY {}", cols.order_by));
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(clamp_i64(limit));
    }
    if query.offset > 0 {
        builder.push(" OFFSET ");
        builder.push_bind(clamp_i64(query.offset));
    }
}

fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const TEST_COLUMNS: Columns = Columns {
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

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn request(level: LogLevel, path: &str, duration: Option<u64>) -> LogRecord {
        let mut record = LogRecord::new(1, level, at(12), "Order placed");
        record.request_path = Some(path.to_string());
        record.http_method = Some("POST".to_string());
        record.user_id = Some("alice".to_string());
        record.duration_ms = duration;
        record
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(LogQuery::new().matches(&request(LogLevel::Verbose, "/", None)));
    }

    #[test]
    fn test_time_bounds_are_inclusive() {
        let record = request(LogLevel::Information, "/", None);
        assert!(LogQuery::new().between(Some(at(12)), Some(at(12))).matches(&record));
        assert!(!LogQuery::new().between(Some(at(13)), None).matches(&record));
        assert!(!LogQuery::new().between(None, Some(at(11))).matches(&record));
    }

    #[test]
    fn test_level_filters_combine() {
        let query = LogQuery {
            levels: Some([LogLevel::Warning, LogLevel::Fatal].into_iter().collect()),
            ..Default::default()
        }
        .min_level(LogLevel::Error);

        assert_eq!(query.effective_levels(), Some([LogLevel::Fatal].into_iter().collect()));
        assert!(query.matches(&request(LogLevel::Fatal, "/", None)));
        assert!(!query.matches(&request(LogLevel::Warning, "/", None)));
        assert!(!query.matches(&request(LogLevel::Error, "/", None)));
    }

    #[test]
    fn test_text_filters() {
        let mut record = request(LogLevel::Error, "/api/Orders/42", Some(10));
        record.exception = Some("System.TimeoutException: db".to_string());

        let by_text = |text: &str| LogQuery {
            search_text: Some(text.to_string()),
            ..Default::default()
        };
        assert!(by_text("ORDER").matches(&record));
        assert!(by_text("timeout").matches(&record));
        assert!(!by_text("payment").matches(&record));

        let by_path = LogQuery {
            request_path: Some("orders".to_string()),
            http_method: Some("post".to_string()),
            user_id: Some("alice".to_string()),
            ..Default::default()
        };
        assert!(by_path.matches(&record));

        let wrong_user = LogQuery {
            user_id: Some("Alice".to_string()),
            ..Default::default()
        };
        assert!(!wrong_user.matches(&record));
    }

    #[test]
    fn test_duration_bounds_exclude_missing_duration() {
        let query = LogQuery {
            min_duration: Some(100),
            max_duration: Some(500),
            ..Default::default()
        };
        assert!(query.matches(&request(LogLevel::Information, "/", Some(100))));
        assert!(query.matches(&request(LogLevel::Information, "/", Some(500))));
        assert!(!query.matches(&request(LogLevel::Information, "/", Some(501))));
        assert!(!query.matches(&request(LogLevel::Information, "/", None)));
    }

    #[test]
    fn test_exception_presence() {
        let mut with = request(LogLevel::Error, "/", None);
        with.exception = Some("Boom".to_string());
        let without = request(LogLevel::Error, "/", None);

        let wants = |flag| LogQuery {
            has_exception: Some(flag),
            ..Default::default()
        };
        assert!(wants(true).matches(&with));
        assert!(!wants(true).matches(&without));
        assert!(wants(false).matches(&without));
    }

    #[test]
    fn test_sql_rendering() {
        let query = LogQuery {
            levels: Some([LogLevel::Error].into_iter().collect()),
            search_text: Some("50%_off".to_string()),
            min_duration: Some(10),
            has_exception: Some(true),
            ..Default::default()
        }
        .between(Some(at(1)), Some(at(2)))
        .limit(20)
        .offset(40);

        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM app_logs WHERE TRUE");
        push_predicates(&mut builder, &query, &TEST_COLUMNS);
        push_window(&mut builder, &query, &TEST_COLUMNS);

        let level = TEST_COLUMNS.level.ordinal_sql();
        assert_eq!(
            builder.sql(),
            format!(
                "SELECT id FROM app_logs WHERE TRUE \
             AND timestamp >= $1 AND timestamp <= $2 \
             AND {level} = ANY($3) \
             AND (message ILIKE $4 OR exception ILIKE $5) \
             AND duration_ms IS NOT NULL AND duration_ms >= $6 \
             AND (exception IS NOT NULL AND btrim(exception) <> '') \
             ORDER BY timestamp DESC, id DESC LIMIT $7 OFFSET $8"
            )
        );
    }

    #[test]
    fn test_level_sql_follows_the_level_table() {
        assert_eq!(
            LevelColumn::Ordinal("level").ordinal_sql(),
            "(CASE WHEN level BETWEEN 0 AND 5 THEN level ELSE 2 END)"
        );

        let sql = LevelColumn::Name("level").ordinal_sql();
        assert!(sql.starts_with(r"(CASE WHEN btrim(level, E' \t\n\r') ~ '^[+-]?[0-9]+$' THEN"));
        for (spelling, level) in LogLevel::spellings() {
            let arm = format!("WHEN '{}' THEN {}", spelling.to_ascii_lowercase(), level.ordinal());
            assert!(sql.contains(&arm), "missing {arm}");
        }
        assert!(sql.contains("WHEN 'warn' THEN 3"));
        assert!(sql.ends_with("ELSE 2 END) END)"));
    }

    #[test]
    fn test_unsatisfiable_levels_render_false() {
        let query = LogQuery {
            levels: Some([LogLevel::Debug].into_iter().collect()),
            ..Default::default()
        }
        .min_level(LogLevel::Error);

        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 WHERE TRUE");
        push_predicates(&mut builder, &query, &TEST_COLUMNS);
        assert_eq!(builder.sql(), "SELECT 1 WHERE TRUE AND FALSE");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
