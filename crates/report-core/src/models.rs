use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{ReportError, Result};
use crate::time_utils::parse_timestamp;

/// Columns a users source must provide.
pub const USER_COLUMNS: &[&str] = &["id", "ig_username", "ig_num_followers"];

/// Columns a posts source must provide.
pub const POST_COLUMNS: &[&str] = &[
    "person_id",
    "taken_at",
    "caption_text",
    "caption_tags",
    "like_count",
    "comment_count",
];

/// Users keyed by their id.
pub type UsersById = HashMap<i64, User>;

/// In-window posts grouped by author id.
///
/// Groups iterate in the order each author first appears in the source, and
/// posts keep their source order inside each group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostsByUser {
    groups: Vec<(i64, Vec<Post>)>,
    slots: HashMap<i64, usize>,
}

impl PostsByUser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `post` to its author's group, opening the group on first sight.
    pub fn push(&mut self, post: Post) {
        let next = self.groups.len();
        let slot = *self.slots.entry(post.person_id).or_insert(next);
        if slot == next {
            self.groups.push((post.person_id, Vec::new()));
        }
        self.groups[slot].1.push(post);
    }

    pub fn get(&self, user_id: i64) -> Option<&[Post]> {
        self.slots
            .get(&user_id)
            .map(|&slot| self.groups[slot].1.as_slice())
    }

    /// Number of authors.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total posts across every group.
    pub fn num_posts(&self) -> usize {
        self.groups.iter().map(|(_, posts)| posts.len()).sum()
    }

    /// Author ids in first-appearance order.
    pub fn user_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.groups.iter().map(|(id, _)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &[Post])> {
        self.groups.iter().map(|(id, posts)| (*id, posts.as_slice()))
    }
}

impl FromIterator<Post> for PostsByUser {
    fn from_iter<I: IntoIterator<Item = Post>>(iter: I) -> Self {
        let mut grouped = Self::new();
        for post in iter {
            grouped.push(post);
        }
        grouped
    }
}

// ── Raw rows ──────────────────────────────────────────────────────────────────

/// A users row exactly as read from the source, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub ig_username: Option<String>,
    #[serde(default)]
    pub ig_num_followers: Option<String>,
}

/// A posts row exactly as read from the source, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostRecord {
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    pub taken_at: Option<String>,
    #[serde(default)]
    pub caption_text: Option<String>,
    #[serde(default)]
    pub caption_tags: Option<String>,
    #[serde(default)]
    pub like_count: Option<String>,
    #[serde(default)]
    pub comment_count: Option<String>,
}

// ── Validated records ─────────────────────────────────────────────────────────

/// A single influencer profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    /// Display name only; never used in computation.
    pub ig_username: String,
    pub ig_num_followers: u64,
}

impl TryFrom<UserRecord> for User {
    type Error = ReportError;

    fn try_from(record: UserRecord) -> Result<Self> {
        Ok(Self {
            id: parse_number("id", record.id.as_deref())?,
            ig_username: record.ig_username.unwrap_or_default(),
            ig_num_followers: parse_number("ig_num_followers", record.ig_num_followers.as_deref())?,
        })
    }
}

/// A single social-media post authored by a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub person_id: i64,
    pub taken_at: NaiveDateTime,
    pub caption_text: String,
    pub caption_tags: Vec<String>,
    pub like_count: u64,
    pub comment_count: u64,
}

impl TryFrom<PostRecord> for Post {
    type Error = ReportError;

    fn try_from(record: PostRecord) -> Result<Self> {
        let taken_at = required("taken_at", record.taken_at.as_deref())?;
        let caption_tags = required("caption_tags", record.caption_tags.as_deref())?;

        Ok(Self {
            person_id: parse_number("person_id", record.person_id.as_deref())?,
            taken_at: parse_timestamp(taken_at)
                .map_err(|e| ReportError::Validation(format!("field `taken_at`: {}", e)))?,
            caption_text: record.caption_text.unwrap_or_default(),
            caption_tags: decode_caption_tags(caption_tags)?,
            like_count: parse_number("like_count", record.like_count.as_deref())?,
            comment_count: parse_number("comment_count", record.comment_count.as_deref())?,
        })
    }
}

// ── Tag decoding ──────────────────────────────────────────────────────────────

/// Decode the `{"a","b"}` tag encoding into an ordered list of tags.
///
/// `[]` and `NULL` both mean "no tags". Anything else has its two-character
/// wrapper stripped from each end and is split on `","`.
pub fn decode_caption_tags(raw: &str) -> Result<Vec<String>> {
    if raw == "[]" || raw == "NULL" {
        return Ok(Vec::new());
    }

    if raw.len() < 4 {
        return Err(ReportError::Validation(format!(
            "tag list {:?} is too short to decode",
            raw
        )));
    }

    let inner = raw.get(2..raw.len() - 2).ok_or_else(|| {
        ReportError::Validation(format!("tag list {:?} has a malformed wrapper", raw))
    })?;

    Ok(inner
        .split("\",\"")
        .map(|tag| tag.trim().to_string())
        .collect())
}

// ── Derived statistics ────────────────────────────────────────────────────────

/// Engagement figures and brand-relevance counters for one influencer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStatistics {
    pub user: User,
    /// Mean engagement over every in-window post.
    pub general_engagement: f64,
    /// Mean engagement over relevant posts only.
    pub specific_engagement: f64,
    pub num_comments: u64,
    pub num_likes: u64,
    pub num_posts: u64,
    pub num_post_mentions: u64,
    pub num_bubbleroom_hashtags: u64,
    pub num_bubbleroomstyle_hashtags: u64,
    /// Always zero: photo tags have no data source yet.
    pub num_photo_tags: u64,
    pub score: u64,
}

/// Report-wide summary across all influencers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub start_date: String,
    pub end_date: String,
    pub num_influencers: u64,
    pub num_active_influencers: u64,
    pub num_posts: u64,
    pub num_post_mentions: u64,
    pub num_bubbleroom_hashtags: u64,
    pub num_bubbleroomstyle_hashtags: u64,
    pub num_photo_tags: u64,
    pub actual_reach: u64,
    pub overall_engagement: f64,
    pub num_likes: u64,
    pub num_comments: u64,
}

// ── Field helpers ─────────────────────────────────────────────────────────────

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ReportError::Validation(format!(
            "missing required field `{}`",
            field
        ))),
    }
}

fn parse_number<T: FromStr>(field: &str, value: Option<&str>) -> Result<T> {
    let raw = required(field, value)?;
    raw.parse::<T>().map_err(|_| {
        ReportError::Validation(format!(
            "field `{}` expects an integer, got {:?}",
            field, raw
        ))
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
