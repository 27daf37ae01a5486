//! Service Module
//!
//! Search and aggregation engines. Services read through a
//! [`crate::repository::RecordStore`] and hold no state between requests.

pub mod aggregate;
pub mod dashboard;
pub mod search;

// Re-export for convenience
pub use dashboard as dashboard_service;
pub use search as search_service;
