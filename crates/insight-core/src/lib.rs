//! Core domain layer for Campaign Insight.
//!
//! Holds the campaign data model, the shared error type, the statistical
//! kernel behind the comparison tables, display formatting helpers and the
//! CLI settings layer.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod stats;
