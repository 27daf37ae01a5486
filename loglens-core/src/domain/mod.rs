//! Core domain types
//!
//! This module contains the log record model shared by every store adapter
//! and engine, the pure classification rules applied on top of it, and the
//! naive timestamp conventions all comparisons follow.

pub mod classify;
pub mod log;
pub mod time;
