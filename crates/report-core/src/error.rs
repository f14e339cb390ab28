use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the report pipeline.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A field or tag encoding did not match the expected shape.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A single source row failed to load.
    #[error("Invalid row at line {line} in {source_name}: {source}")]
    InvalidRow {
        source_name: String,
        line: u64,
        #[source]
        source: Box<ReportError>,
    },

    /// The CSV reader itself failed (bad quoting, ragged rows, I/O).
    #[error("Failed to parse CSV {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A report artefact could not be written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two user rows share the same id and duplicates are rejected.
    #[error("Duplicate user id: {0}")]
    DuplicateKey(i64),

    /// Posts reference a user id missing from the users source.
    #[error("Posts reference unknown user id: {0}")]
    UnknownUser(i64),

    /// Engagement needs a positive follower count.
    #[error("User {user_id} has zero followers; engagement is undefined")]
    DivisionByZero { user_id: i64 },

    /// No influencer had any post inside the report window.
    #[error("No influencer statistics to aggregate")]
    EmptyInput,

    /// The report window ends before it starts.
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: String, end: String },

    /// A timestamp string did not match any recognised format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// A JSON document could not be produced.
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the report crates.
pub type Result<T> = std::result::Result<T, ReportError>;
