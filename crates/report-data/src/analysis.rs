//! End-to-end report pipeline.
//!
//! Loads both sources, summarises each influencer, aggregates the results,
//! and returns a [`ReportBundle`] ready for the report sink.

use std::path::Path;

use chrono::Utc;
use report_core::engagement::summarize_user;
use report_core::error::{ReportError, Result};
use report_core::models::{PostsByUser, Statistics, UserStatistics, UsersById};
use report_core::settings::DuplicateUserPolicy;
use report_core::time_utils::ReportWindow;
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregator::StatisticsAggregator;
use crate::reader::{load_posts, load_users};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportMetadata {
    /// RFC 3339 timestamp when this report was generated.
    pub generated_at: String,
    /// Number of distinct users loaded.
    pub users_loaded: usize,
    /// Number of posts inside the report window.
    pub posts_in_window: usize,
    /// Wall-clock seconds spent reading both sources.
    pub load_time_seconds: f64,
}

/// Everything the report sink needs, fully computed.
#[derive(Debug, Clone, Serialize)]
pub struct ReportBundle {
    pub statistics: Statistics,
    /// One entry per influencer with in-window posts, in the order each
    /// influencer first appears in the posts source.
    pub user_statistics: Vec<UserStatistics>,
    /// Influencers left out because they have zero followers.
    pub skipped_users: Vec<i64>,
    pub metadata: ReportMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Summarise already-loaded data.
///
/// Posts whose author is not in `users` fail with
/// [`ReportError::UnknownUser`]. An author with zero followers is skipped
/// and logged rather than aborting the run.
pub fn build_report(
    users: &UsersById,
    posts_by_user: &PostsByUser,
    window: &ReportWindow,
) -> Result<ReportBundle> {
    let mut user_statistics = Vec::with_capacity(posts_by_user.len());
    let mut skipped_users = Vec::new();

    for (user_id, posts) in posts_by_user.iter() {
        let user = users
            .get(&user_id)
            .ok_or(ReportError::UnknownUser(user_id))?;

        match summarize_user(user, posts) {
            Ok(stats) => user_statistics.push(stats),
            Err(ReportError::DivisionByZero { user_id }) => {
                warn!(
                    "Skipping user {} ({}): zero followers, {} post(s) ignored",
                    user_id,
                    user.ig_username,
                    posts.len()
                );
                skipped_users.push(user_id);
            }
            Err(e) => return Err(e),
        }
    }

    let statistics = StatisticsAggregator::summarize_all(&user_statistics, window)?;

    let metadata = ReportMetadata {
        generated_at: Utc::now().to_rfc3339(),
        users_loaded: users.len(),
        posts_in_window: posts_by_user.num_posts(),
        load_time_seconds: 0.0,
    };

    Ok(ReportBundle {
        statistics,
        user_statistics,
        skipped_users,
        metadata,
    })
}

/// Run the full pipeline against the two CSV files.
pub fn analyze_report(
    users_path: &Path,
    posts_path: &Path,
    window: &ReportWindow,
    policy: DuplicateUserPolicy,
) -> Result<ReportBundle> {
    // ── Step 1: Load ──────────────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let users = load_users(users_path, policy)?;
    let posts_by_user = load_posts(posts_path, window)?;
    let load_time = load_start.elapsed().as_secs_f64();

    info!(
        "Loaded {} users and posts from {} authors in {:.3}s",
        users.len(),
        posts_by_user.len(),
        load_time
    );

    // ── Step 2: Summarise ─────────────────────────────────────────────────────
    let mut bundle = build_report(&users, &posts_by_user, window)?;
    bundle.metadata.load_time_seconds = load_time;

    Ok(bundle)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
