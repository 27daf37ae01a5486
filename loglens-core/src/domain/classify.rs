//! Classification of durations, status codes and levels into display tiers
//!
//! Every function here is total: absent inputs map to an `Unknown` tier
//! instead of failing.

use serde::{Deserialize, Serialize};

use crate::domain::log::LogLevel;

/// Requests slower than this (exclusive) count as slow requests
pub const SLOW_REQUEST_THRESHOLD_MS: u64 = 5_000;

/// Performance tier derived from a request duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PerformanceTier {
    Excellent,
    Good,
    Fair,
    Slow,
    Critical,
    Unknown,
}

impl PerformanceTier {
    pub fn from_duration(duration_ms: Option<u64>) -> Self {
        match duration_ms {
            None => PerformanceTier::Unknown,
            Some(0..=100) => PerformanceTier::Excellent,
            Some(101..=500) => PerformanceTier::Good,
            Some(501..=1_000) => PerformanceTier::Fair,
            Some(1_001..=5_000) => PerformanceTier::Slow,
            Some(_) => PerformanceTier::Critical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent",
            PerformanceTier::Good => "Good",
            PerformanceTier::Fair => "Fair",
            PerformanceTier::Slow => "Slow",
            PerformanceTier::Critical => "Critical",
            PerformanceTier::Unknown => "Unknown",
        }
    }
}

/// Warning tier for slow operations; distinct from [`PerformanceTier`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SlowTier {
    Normal,
    Warning,
    Slow,
    Critical,
}

impl SlowTier {
    pub fn from_duration(duration_ms: u64) -> Self {
        match duration_ms {
            d if d >= 10_000 => SlowTier::Critical,
            d if d >= 5_000 => SlowTier::Slow,
            d if d >= 1_000 => SlowTier::Warning,
            _ => SlowTier::Normal,
        }
    }
}

/// HTTP response status category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCategory {
    Success,
    Redirect,
    ClientError,
    ServerError,
    Unknown,
}

impl StatusCategory {
    pub fn from_status(status: Option<i32>) -> Self {
        match status {
            Some(200..=299) => StatusCategory::Success,
            Some(300..=399) => StatusCategory::Redirect,
            Some(400..=499) => StatusCategory::ClientError,
            Some(s) if s >= 500 => StatusCategory::ServerError,
            _ => StatusCategory::Unknown,
        }
    }
}

pub fn is_error(level: LogLevel) -> bool {
    matches!(level, LogLevel::Error | LogLevel::Fatal)
}

pub fn is_warning(level: LogLevel) -> bool {
    level == LogLevel::Warning
}

pub fn is_slow_request(duration_ms: Option<u64>) -> bool {
    duration_ms.is_some_and(|d| d > SLOW_REQUEST_THRESHOLD_MS)
}

/// Leading type name of an exception text, e.g.
/// `"System.TimeoutException: took too long"` -> `"System.TimeoutException"`.
pub fn exception_type(exception: &str) -> String {
    let first_line = exception.lines().next().unwrap_or_default();
    let name = first_line.split(':').next().unwrap_or_default().trim();

    if name.is_empty() {
        "Unknown".to_string()
    } else {
        name.to_string()
    }
}
