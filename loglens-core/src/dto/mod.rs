//! Data Transfer Objects
//!
//! Wire-facing request and response shapes. Field names are camelCase on
//! the wire; timestamps travel as naive ISO 8601 strings.

pub mod dashboard;
pub mod log;
pub mod search;
