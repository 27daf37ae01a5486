//! Search DTOs
//!
//! A [`SearchRequest`] never fails validation: [`SearchRequest::normalize`]
//! corrects out-of-range values before the request is executed.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::log::LogLevel;
use crate::domain::time::naive_opt;
use crate::dto::log::LogRecordView;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Filter criteria as received on the wire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    #[serde(with = "naive_opt")]
    pub from_date: Option<NaiveDateTime>,
    #[serde(with = "naive_opt")]
    pub to_date: Option<NaiveDateTime>,
    pub log_levels: Vec<String>,
    pub search_text: Option<String>,
    pub user_id: Option<String>,
    pub request_path: Option<String>,
    pub http_method: Option<String>,
    pub min_duration: Option<i64>,
    pub max_duration: Option<i64>,
    pub has_exception: Option<bool>,
    pub page: i64,
    pub page_size: i64,
}

/// A search request after normalization; every field is in range
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSearch {
    pub from_date: Option<NaiveDateTime>,
    pub to_date: Option<NaiveDateTime>,
    /// `None` when no supplied level name resolved to a known level
    pub levels: Option<BTreeSet<LogLevel>>,
    pub search_text: Option<String>,
    pub user_id: Option<String>,
    pub request_path: Option<String>,
    pub http_method: Option<String>,
    pub min_duration: Option<u64>,
    pub max_duration: Option<u64>,
    pub has_exception: Option<bool>,
    pub page: u32,
    pub page_size: u32,
}

impl NormalizedSearch {
    /// Number of records preceding the requested page
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }
}

impl SearchRequest {
    pub fn normalize(&self) -> NormalizedSearch {
        let page = if self.page <= 0 {
            1
        } else {
            self.page.min(u32::MAX as i64) as u32
        };

        let page_size = match self.page_size {
            s if s <= 0 => DEFAULT_PAGE_SIZE,
            s if s > MAX_PAGE_SIZE as i64 => MAX_PAGE_SIZE,
            s => s as u32,
        };

        let mut min_duration = self.min_duration.map(|d| d.max(0) as u64);
        let mut max_duration = self.max_duration.filter(|d| *d >= 0).map(|d| d as u64);
        if let (Some(min), Some(max)) = (min_duration, max_duration) {
            if min > max {
                min_duration = Some(max);
                max_duration = Some(min);
            }
        }

        let levels: BTreeSet<LogLevel> = self
            .log_levels
            .iter()
            .filter_map(|name| LogLevel::from_name(name))
            .collect();

        NormalizedSearch {
            from_date: self.from_date,
            to_date: self.to_date,
            levels: (!levels.is_empty()).then_some(levels),
            search_text: non_blank(&self.search_text),
            user_id: non_blank(&self.user_id),
            request_path: non_blank(&self.request_path),
            http_method: non_blank(&self.http_method),
            min_duration,
            max_duration,
            has_exception: self.has_exception,
            page,
            page_size,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// One page of matching records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub items: Vec<LogRecordView>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

/// `ceil(total_count / page_size)`, zero when nothing matched
pub fn total_pages(total_count: u64, page_size: u32) -> u64 {
    if total_count == 0 || page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size as u64)
}
