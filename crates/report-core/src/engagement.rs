//! Relevance rules and per-influencer engagement metrics.

use crate::error::{ReportError, Result};
use crate::models::{Post, User, UserStatistics};

/// Caption substring that counts as a brand mention.
pub const BRAND_MENTION: &str = "@bubbleroom";
/// Tag that counts as the brand hashtag.
pub const BRAND_HASHTAG: &str = "bubbleroom";
/// Tag that counts as the brand style hashtag.
pub const BRAND_STYLE_HASHTAG: &str = "bubbleroomstyle";

// ── Post relevance ────────────────────────────────────────────────────────────

impl Post {
    /// Caption mentions the brand account (case-sensitive substring).
    pub fn has_mention(&self) -> bool {
        self.caption_text.contains(BRAND_MENTION)
    }

    pub fn has_bubbleroom_hashtag(&self) -> bool {
        self.has_tag(BRAND_HASHTAG)
    }

    pub fn has_bubbleroomstyle_hashtag(&self) -> bool {
        self.has_tag(BRAND_STYLE_HASHTAG)
    }

    /// Whole-tag, case-sensitive match.
    fn has_tag(&self, tag: &str) -> bool {
        self.caption_tags.iter().any(|t| t == tag)
    }
}

/// A post is relevant when it mentions the brand or carries either brand tag.
pub fn is_relevant(post: &Post) -> bool {
    post.has_mention() || post.has_bubbleroom_hashtag() || post.has_bubbleroomstyle_hashtag()
}

/// Likes plus comments as a percentage of the author's followers.
///
/// Fails with [`ReportError::DivisionByZero`] when the user has no followers.
pub fn engagement(post: &Post, user: &User) -> Result<f64> {
    if user.ig_num_followers == 0 {
        return Err(ReportError::DivisionByZero { user_id: user.id });
    }
    let interactions = post.like_count as f64 + post.comment_count as f64;
    Ok(interactions / user.ig_num_followers as f64 * 100.0)
}

// ── Per-user summary ──────────────────────────────────────────────────────────

/// Running totals while walking one user's posts.
#[derive(Debug, Default)]
struct UserAccumulator {
    general: Vec<f64>,
    specific: Vec<f64>,
    num_comments: u64,
    num_likes: u64,
    num_posts: u64,
    num_post_mentions: u64,
    num_bubbleroom_hashtags: u64,
    num_bubbleroomstyle_hashtags: u64,
    num_photo_tags: u64,
}

impl UserAccumulator {
    fn add_post(&mut self, post: &Post, post_engagement: f64) {
        self.general.push(post_engagement);
        if !is_relevant(post) {
            return;
        }

        self.specific.push(post_engagement);
        self.num_comments = self.num_comments.saturating_add(post.comment_count);
        self.num_likes = self.num_likes.saturating_add(post.like_count);
        self.num_posts += 1;
        if post.has_mention() {
            self.num_post_mentions += 1;
        }
        if post.has_bubbleroom_hashtag() {
            self.num_bubbleroom_hashtags += 1;
        }
        if post.has_bubbleroomstyle_hashtag() {
            self.num_bubbleroomstyle_hashtags += 1;
        }
        // num_photo_tags stays at zero until a photo-tag source exists.
    }

    fn score(&self) -> u64 {
        self.num_posts
            + self.num_post_mentions
            + self.num_bubbleroom_hashtags
            + self.num_bubbleroomstyle_hashtags
            + self.num_photo_tags
    }

    fn finish(self, user: &User) -> UserStatistics {
        let score = self.score();
        UserStatistics {
            user: user.clone(),
            general_engagement: mean_or_zero(&self.general),
            specific_engagement: mean_or_zero(&self.specific),
            num_comments: self.num_comments,
            num_likes: self.num_likes,
            num_posts: self.num_posts,
            num_post_mentions: self.num_post_mentions,
            num_bubbleroom_hashtags: self.num_bubbleroom_hashtags,
            num_bubbleroomstyle_hashtags: self.num_bubbleroomstyle_hashtags,
            num_photo_tags: self.num_photo_tags,
            score,
        }
    }
}

/// Fold one influencer's in-window posts into a [`UserStatistics`].
///
/// Every post feeds `general_engagement`; only relevant posts feed
/// `specific_engagement` and the counters. Means over empty samples are `0.0`.
pub fn summarize_user(user: &User, posts: &[Post]) -> Result<UserStatistics> {
    let mut acc = UserAccumulator::default();
    for post in posts {
        acc.add_post(post, engagement(post, user)?);
    }
    Ok(acc.finish(user))
}

/// Arithmetic mean, or `None` for an empty sample.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn mean_or_zero(values: &[f64]) -> f64 {
    mean(values).unwrap_or(0.0)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
