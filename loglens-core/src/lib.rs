//! Loglens Core
//!
//! Core types and abstractions for the Loglens analytics engine.
//!
//! This crate contains:
//! - Domain types: log records, severity levels, classification tiers
//! - DTOs: request and response shapes for search and dashboards
//!
//! Note: Storage access and aggregation live in loglens-server.

pub mod domain;
pub mod dto;
