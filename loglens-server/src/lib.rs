//! LogLens server
//!
//! Record store adapters, the search and aggregation services, and the
//! HTTP boundary that exposes them.

pub mod api;
pub mod config;
pub mod db;
pub mod repository;
pub mod service;
