//! Core types and computations for the influencer engagement report.
//!
//! Holds the record model, relevance and engagement rules, report window
//! handling, formatting helpers and CLI settings shared by the other crates.

pub mod engagement;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
