//! Playlog: Gameplay Analytics Queries
//!
//! Read-side query service over logged gameplay *contexts* (bounded activity
//! spans) and *events* (point-in-time occurrences). Supports filtered, sorted
//! and paged listing, derived context durations, group-scoped visibility, and
//! sum/avg/count aggregations addressed by opaque query ids.

pub mod access;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod query;
pub mod record;
pub mod service;
pub mod store;
pub mod types;
