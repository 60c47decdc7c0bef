//! Data layer for Campaign Insight.
//!
//! Responsible for reading the campaign CSV, aggregating per-segment
//! metrics, running the pairwise significance tests, profiling the
//! demographic and value-tier cuts and running the top-level analysis
//! pipeline.

pub mod aggregator;
pub mod analysis;
pub mod overview;
pub mod profiling;
pub mod reader;
pub mod significance;

pub use insight_core as core;
