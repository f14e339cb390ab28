//! Cross-influencer aggregation into the report-wide [`Statistics`].

use report_core::engagement::mean;
use report_core::error::{ReportError, Result};
use report_core::formatting::format_report_date;
use report_core::models::{Statistics, UserStatistics};
use report_core::time_utils::ReportWindow;

// ── CounterTotals ─────────────────────────────────────────────────────────────

/// Counter sums accumulated across influencers.
#[derive(Debug, Clone, Default)]
pub struct CounterTotals {
    pub num_active_influencers: u64,
    pub num_posts: u64,
    pub num_post_mentions: u64,
    pub num_bubbleroom_hashtags: u64,
    pub num_bubbleroomstyle_hashtags: u64,
    pub num_photo_tags: u64,
    pub num_likes: u64,
    pub num_comments: u64,
    pub actual_reach: u64,
}

impl CounterTotals {
    /// Add one influencer's counters to the running totals.
    pub fn add_user(&mut self, stats: &UserStatistics) {
        if stats.score > 0 {
            self.num_active_influencers += 1;
        }
        self.num_posts += stats.num_posts;
        self.num_post_mentions += stats.num_post_mentions;
        self.num_bubbleroom_hashtags += stats.num_bubbleroom_hashtags;
        self.num_bubbleroomstyle_hashtags += stats.num_bubbleroomstyle_hashtags;
        self.num_photo_tags += stats.num_photo_tags;
        self.num_likes = self.num_likes.saturating_add(stats.num_likes);
        self.num_comments = self.num_comments.saturating_add(stats.num_comments);
        self.actual_reach = self
            .actual_reach
            .saturating_add(stats.num_comments.saturating_add(stats.num_likes));
    }
}

// ── StatisticsAggregator ──────────────────────────────────────────────────────

/// Stateless helper that folds per-influencer statistics into one summary.
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    /// Build the report-wide [`Statistics`] for `window`.
    ///
    /// `overall_engagement` is the unweighted mean of every influencer's
    /// `specific_engagement`, including influencers with no relevant posts.
    /// Fails with [`ReportError::EmptyInput`] when `user_stats` is empty.
    pub fn summarize_all(user_stats: &[UserStatistics], window: &ReportWindow) -> Result<Statistics> {
        let specific: Vec<f64> = user_stats.iter().map(|s| s.specific_engagement).collect();
        let overall_engagement = mean(&specific).ok_or(ReportError::EmptyInput)?;
        let totals = Self::calculate_totals(user_stats);

        Ok(Statistics {
            start_date: format_report_date(window.start()),
            end_date: format_report_date(window.end()),
            num_influencers: user_stats.len() as u64,
            num_active_influencers: totals.num_active_influencers,
            num_posts: totals.num_posts,
            num_post_mentions: totals.num_post_mentions,
            num_bubbleroom_hashtags: totals.num_bubbleroom_hashtags,
            num_bubbleroomstyle_hashtags: totals.num_bubbleroomstyle_hashtags,
            num_photo_tags: totals.num_photo_tags,
            actual_reach: totals.actual_reach,
            overall_engagement,
            num_likes: totals.num_likes,
            num_comments: totals.num_comments,
        })
    }

    /// Sum every influencer's counters.
    pub fn calculate_totals(user_stats: &[UserStatistics]) -> CounterTotals {
        let mut totals = CounterTotals::default();
        for stats in user_stats {
            totals.add_user(stats);
        }
        totals
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
