//! Data layer for the influencer engagement report.
//!
//! Reads the users and posts CSV sources, aggregates per-influencer
//! statistics and runs the top-level report pipeline.

pub mod aggregator;
pub mod analysis;
pub mod reader;

pub use report_core as core;
