//! In-memory record store
//!
//! Holds records in an append-only vector. Used by tests and by callers
//! that embed the engines without a database.

use async_trait::async_trait;
use loglens_core::domain::log::{LogLevel, LogRecord};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::query::LogQuery;
use super::{RecordStore, StoreError, zeroed_level_counts};

/// Append-only in-memory implementation of [`RecordStore`]
///
/// Clones share the same underlying records.
#[derive(Clone, Default)]
pub struct MemoryLogStore {
    records: Arc<RwLock<Vec<LogRecord>>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = LogRecord>) -> Self {
        let store = Self::new();
        store.extend(records);
        store
    }

    pub fn push(&self, record: LogRecord) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.push(record);
    }

    pub fn extend(&self, new_records: impl IntoIterator<Item = LogRecord>) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.extend(new_records);
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Matching records, newest first, taken under one read lock
    fn matching(&self, query: &LogQuery) -> Vec<LogRecord> {
        let mut matched: Vec<LogRecord> = {
            let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
            records.iter().filter(|r| query.matches(r)).cloned().collect()
        };
        newest_first(&mut matched);
        matched
    }
}

#[async_trait]
impl RecordStore for MemoryLogStore {
    async fn fetch(&self, query: &LogQuery) -> Result<Vec<LogRecord>, StoreError> {
        Ok(window(self.matching(query), query))
    }

    async fn count(&self, query: &LogQuery) -> Result<u64, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.iter().filter(|r| query.matches(r)).count() as u64)
    }

    async fn level_counts(&self, query: &LogQuery) -> Result<BTreeMap<LogLevel, u64>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut counts = zeroed_level_counts();
        for record in records.iter().filter(|r| query.matches(r)) {
            *counts.entry(record.level).or_default() += 1;
        }
        Ok(counts)
    }

    async fn fetch_page(&self, query: &LogQuery) -> Result<(Vec<LogRecord>, u64), StoreError> {
        let matched = self.matching(query);
        let total = matched.len() as u64;
        Ok((window(matched, query), total))
    }

    async fn fetch_with_level_counts(
        &self,
        query: &LogQuery,
    ) -> Result<(Vec<LogRecord>, BTreeMap<LogLevel, u64>), StoreError> {
        let mut counts = zeroed_level_counts();
        let mut matched = Vec::new();
        {
            let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
            for record in records.iter().filter(|r| query.matches(r)) {
                *counts.entry(record.level).or_default() += 1;
                matched.push(record.clone());
            }
        }
        newest_first(&mut matched);
        Ok((window(matched, query), counts))
    }
}

fn newest_first(records: &mut [LogRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
}

fn window(records: Vec<LogRecord>, query: &LogQuery) -> Vec<LogRecord> {
    let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
    let limit = query
        .limit
        .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
        .unwrap_or(usize::MAX);
    records.into_iter().skip(offset).take(limit).collect()
}
