//! Cost scanner daemon
//!
//! Runs scans on a fixed interval and serves health, metrics and the
//! latest report over HTTP.

pub mod api;
pub mod config;
pub mod scheduler;
