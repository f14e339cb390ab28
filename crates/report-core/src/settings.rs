use chrono::NaiveDateTime;
use clap::Parser;
use std::path::PathBuf;

use crate::error::Result;
use crate::time_utils::{parse_timestamp, ReportWindow};

// ── DuplicateUserPolicy ────────────────────────────────────────────────────────

/// What the users loader does when an id appears twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateUserPolicy {
    /// The later row replaces the earlier one.
    #[default]
    LastWins,
    /// A repeated id aborts the load.
    Reject,
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Influencer engagement report for a date window
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bubble-report",
    about = "Influencer engagement report for a date window",
    version
)]
pub struct Settings {
    /// Inclusive start of the report window (ISO 8601)
    #[arg(short = 's', long, default_value = "2021-01-01T00:00:00", value_parser = parse_cli_timestamp)]
    pub start_date: NaiveDateTime,

    /// Inclusive end of the report window (ISO 8601)
    #[arg(short = 'e', long, default_value = "2021-01-31T23:59:59", value_parser = parse_cli_timestamp)]
    pub end_date: NaiveDateTime,

    /// Users CSV (id, ig_username, ig_num_followers)
    #[arg(short = 'u', long, default_value = "users.csv")]
    pub user_csv: PathBuf,

    /// Posts CSV (person_id, taken_at, caption_text, caption_tags, like_count, comment_count)
    #[arg(short = 'p', long, default_value = "user_posts.csv")]
    pub user_posts_csv: PathBuf,

    /// Also write the computed report as JSON to this path
    #[arg(long)]
    pub json_out: Option<PathBuf>,

    /// Fail instead of keeping the last row when a user id repeats
    #[arg(long)]
    pub reject_duplicate_users: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Validated report window built from the two date flags.
    pub fn window(&self) -> Result<ReportWindow> {
        ReportWindow::new(self.start_date, self.end_date)
    }

    pub fn duplicate_policy(&self) -> DuplicateUserPolicy {
        if self.reject_duplicate_users {
            DuplicateUserPolicy::Reject
        } else {
            DuplicateUserPolicy::LastWins
        }
    }

    /// Log level after applying `--debug`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }
}

fn parse_cli_timestamp(s: &str) -> std::result::Result<NaiveDateTime, String> {
    parse_timestamp(s).map_err(|e| e.to_string())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
