//! Report sink: plain-text summary on stdout and an optional JSON dump.

use std::fmt::Write as _;
use std::path::Path;

use report_core::error::{ReportError, Result};
use report_core::formatting::{format_count, format_engagement};
use report_data::analysis::ReportBundle;

const HEADERS: [&str; 8] = [
    "Influencer",
    "Posts",
    "Mentions",
    "#bubbleroom",
    "#bubbleroomstyle",
    "Likes",
    "Comments",
    "Engagement",
];

/// Render the aggregate figures followed by one row per influencer.
pub fn render_summary(bundle: &ReportBundle) -> String {
    let stats = &bundle.statistics;
    let mut out = String::new();

    let _ = writeln!(out, "Influencer report {} - {}", stats.start_date, stats.end_date);
    let _ = writeln!(out);

    let summary = [
        ("Influencers", format_count(stats.num_influencers)),
        ("Influencers with activity", format_count(stats.num_active_influencers)),
        ("Posts", format_count(stats.num_posts)),
        ("Post mentions", format_count(stats.num_post_mentions)),
        ("#bubbleroom", format_count(stats.num_bubbleroom_hashtags)),
        ("#bubbleroomstyle", format_count(stats.num_bubbleroomstyle_hashtags)),
        ("Photo tags", format_count(stats.num_photo_tags)),
        ("Likes", format_count(stats.num_likes)),
        ("Comments", format_count(stats.num_comments)),
        ("Actual reach", format_count(stats.actual_reach)),
        ("Overall engagement", format_engagement(stats.overall_engagement)),
    ];
    let label_width = summary.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (label, value) in &summary {
        let _ = writeln!(out, "  {:<width$}  {}", label, value, width = label_width);
    }

    if !bundle.skipped_users.is_empty() {
        let ids: Vec<String> = bundle.skipped_users.iter().map(i64::to_string).collect();
        let _ = writeln!(out, "  Skipped (zero followers): {}", ids.join(", "));
    }
    let _ = writeln!(out);

    let rows: Vec<[String; 8]> = bundle
        .user_statistics
        .iter()
        .map(|u| {
            [
                u.user.ig_username.clone(),
                format_count(u.num_posts),
                format_count(u.num_post_mentions),
                format_count(u.num_bubbleroom_hashtags),
                format_count(u.num_bubbleroomstyle_hashtags),
                format_count(u.num_likes),
                format_count(u.num_comments),
                format_engagement(u.specific_engagement),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    push_row(&mut out, &HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
    for row in &rows {
        push_row(&mut out, row, &widths);
    }

    out
}

/// Write the full bundle as pretty-printed JSON, creating parent directories.
pub fn write_json(bundle: &ReportBundle, path: &Path) -> Result<()> {
    let write_error = |source: std::io::Error| ReportError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    let json = serde_json::to_string_pretty(bundle)?;
    std::fs::write(path, json).map_err(write_error)?;
    Ok(())
}

/// First column left-aligned, numbers right-aligned.
fn push_row(out: &mut String, cells: &[String; 8], widths: &[usize; 8]) {
    let mut parts = Vec::with_capacity(cells.len());
    for (i, (cell, width)) in cells.iter().zip(widths.iter()).enumerate() {
        if i == 0 {
            parts.push(format!("{:<width$}", cell, width = *width));
        } else {
            parts.push(format!("{:>width$}", cell, width = *width));
        }
    }
    let _ = writeln!(out, "{}", parts.join("  ").trim_end());
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::models::{Statistics, User, UserStatistics};
    use report_data::analysis::ReportMetadata;
    use tempfile::TempDir;

    fn bundle() -> ReportBundle {
        ReportBundle {
            statistics: Statistics {
                start_date: "01 January 2021".to_string(),
                end_date: "31 January 2021".to_string(),
                num_influencers: 1,
                num_active_influencers: 1,
                num_posts: 1,
                num_post_mentions: 1,
                num_bubbleroom_hashtags: 0,
                num_bubbleroomstyle_hashtags: 0,
                num_photo_tags: 0,
                actual_reach: 1500,
                overall_engagement: 15.0,
                num_likes: 1000,
                num_comments: 500,
            },
            user_statistics: vec![UserStatistics {
                user: User {
                    id: 1,
                    ig_username: "anna".to_string(),
                    ig_num_followers: 10_000,
                },
                general_engagement: 15.0,
                specific_engagement: 15.0,
                num_comments: 500,
                num_likes: 1000,
                num_posts: 1,
                num_post_mentions: 1,
                num_bubbleroom_hashtags: 0,
                num_bubbleroomstyle_hashtags: 0,
                num_photo_tags: 0,
                score: 2,
            }],
            skipped_users: vec![4],
            metadata: ReportMetadata::default(),
        }
    }

    #[test]
    fn test_render_summary_contents() {
        let text = render_summary(&bundle());
        assert!(text.starts_with("Influencer report 01 January 2021 - 31 January 2021"));
        assert!(text.contains("Actual reach"));
        assert!(text.contains("1,500"));
        assert!(text.contains("15.00%"));
        assert!(text.contains("anna"));
        assert!(text.contains("Skipped (zero followers): 4"));
    }

    #[test]
    fn test_render_summary_columns_aligned() {
        let text = render_summary(&bundle());
        let header = text.lines().find(|l| l.starts_with("Influencer  ")).unwrap();
        let row = text.lines().find(|l| l.starts_with("anna")).unwrap();
        assert_eq!(header.len(), row.len());
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("report.json");

        write_json(&bundle(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["statistics"]["actual_reach"], 1500);
        assert_eq!(value["user_statistics"][0]["user"]["ig_username"], "anna");
        assert_eq!(value["skipped_users"][0], 4);
    }

    #[test]
    fn test_write_json_reports_path_on_failure() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();
        let path = blocker.join("report.json");

        let err = write_json(&bundle(), &path).unwrap_err();
        match err {
            ReportError::FileWrite { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
