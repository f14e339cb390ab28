//! CSV loading for the users and posts sources.
//!
//! Rows are read with the `csv` crate into raw string records, then validated
//! into [`User`] / [`Post`] values. Any bad row aborts the whole load.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use report_core::error::{ReportError, Result};
use report_core::models::{
    Post, PostRecord, PostsByUser, User, UserRecord, UsersById, POST_COLUMNS, USER_COLUMNS,
};
use report_core::settings::DuplicateUserPolicy;
use report_core::time_utils::ReportWindow;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Load every user from the CSV file at `path`, keyed by id.
pub fn load_users(path: &Path, policy: DuplicateUserPolicy) -> Result<UsersById> {
    let file = open_source(path)?;
    read_users(file, &path.display().to_string(), policy)
}

/// Load the posts from the CSV file at `path` that fall inside `window`,
/// grouped by author.
pub fn load_posts(path: &Path, window: &ReportWindow) -> Result<PostsByUser> {
    let file = open_source(path)?;
    read_posts(file, &path.display().to_string(), window)
}

/// Read users from any CSV source. `source_name` is only used in errors
/// and log lines.
pub fn read_users<R: Read>(
    source: R,
    source_name: &str,
    policy: DuplicateUserPolicy,
) -> Result<UsersById> {
    let mut users = UsersById::new();
    let mut rows = 0u64;

    for_each_row::<_, UserRecord, User, _>(source, source_name, USER_COLUMNS, |line, user| {
        rows += 1;
        if users.contains_key(&user.id) {
            match policy {
                DuplicateUserPolicy::Reject => {
                    return Err(ReportError::InvalidRow {
                        source_name: source_name.to_string(),
                        line,
                        source: Box::new(ReportError::DuplicateKey(user.id)),
                    });
                }
                DuplicateUserPolicy::LastWins => {
                    warn!(
                        "{}: user id {} repeated at line {}; keeping the later row",
                        source_name, user.id, line
                    );
                }
            }
        }
        users.insert(user.id, user);
        Ok(())
    })?;

    debug!("{}: {} rows, {} unique users", source_name, rows, users.len());
    Ok(users)
}

/// Read posts from any CSV source, keeping only those inside `window`.
///
/// Authors are grouped in the order they first appear among the kept rows.
/// Rows outside the window are still validated.
pub fn read_posts<R: Read>(
    source: R,
    source_name: &str,
    window: &ReportWindow,
) -> Result<PostsByUser> {
    let mut posts = PostsByUser::new();
    let mut rows = 0u64;
    let mut kept = 0u64;

    for_each_row::<_, PostRecord, Post, _>(source, source_name, POST_COLUMNS, |_, post| {
        rows += 1;
        if window.contains(post.taken_at) {
            kept += 1;
            posts.push(post);
        }
        Ok(())
    })?;

    debug!(
        "{}: {} rows, {} in window, {} filtered, {} authors",
        source_name,
        rows,
        kept,
        rows - kept,
        posts.len()
    );
    Ok(posts)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| ReportError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Drive a CSV source row by row: check the header carries `columns`,
/// deserialize each row into `Raw`, validate it into `Item`, and hand it to
/// `on_row` with its 1-based line number.
fn for_each_row<R, Raw, Item, F>(
    source: R,
    source_name: &str,
    columns: &[&str],
    mut on_row: F,
) -> Result<()>
where
    R: Read,
    Raw: DeserializeOwned,
    Item: TryFrom<Raw, Error = ReportError>,
    F: FnMut(u64, Item) -> Result<()>,
{
    let csv_error = |source: csv::Error| ReportError::Csv {
        source_name: source_name.to_string(),
        source,
    };
    let row_error = |line: u64, source: ReportError| ReportError::InvalidRow {
        source_name: source_name.to_string(),
        line,
        source: Box::new(source),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(source);

    let headers = reader.headers().map_err(csv_error)?.clone();
    for column in columns {
        if !headers.iter().any(|h| h == *column) {
            return Err(row_error(
                1,
                ReportError::Validation(format!("missing column `{}`", column)),
            ));
        }
    }

    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record).map_err(csv_error)? {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let raw: Raw = record
            .deserialize(Some(&headers))
            .map_err(|e| row_error(line, ReportError::Validation(e.to_string())))?;
        let item = Item::try_from(raw).map_err(|e| row_error(line, e))?;
        on_row(line, item)?;
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    const POSTS_HEADER: &str =
        "person_id,taken_at,caption_text,caption_tags,like_count,comment_count";

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn january() -> ReportWindow {
        ReportWindow::new(ts("2021-01-01 00:00:00"), ts("2021-01-31 23:59:59")).unwrap()
    }

    // ── load_users ────────────────────────────────────────────────────────────

    #[test]
    fn test_load_users_basic() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "users.csv",
            &["id,ig_username,ig_num_followers", "1,anna,100", "2,ben,2500"],
        );

        let users = load_users(&path, DuplicateUserPolicy::LastWins).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[&1].ig_username, "anna");
        assert_eq!(users[&2].ig_num_followers, 2500);
    }

    #[test]
    fn test_load_users_column_order_irrelevant() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "users.csv",
            &["ig_num_followers,id,ig_username", "100,1,anna"],
        );

        let users = load_users(&path, DuplicateUserPolicy::LastWins).unwrap();
        assert_eq!(users[&1].ig_num_followers, 100);
    }

    #[test]
    fn test_load_users_duplicate_last_wins() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "users.csv",
            &["id,ig_username,ig_num_followers", "1,old,10", "1,new,20"],
        );

        let users = load_users(&path, DuplicateUserPolicy::LastWins).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[&1].ig_username, "new");
        assert_eq!(users[&1].ig_num_followers, 20);
    }

    #[test]
    fn test_load_users_duplicate_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "users.csv",
            &["id,ig_username,ig_num_followers", "1,old,10", "1,new,20"],
        );

        let err = load_users(&path, DuplicateUserPolicy::Reject).unwrap_err();
        match err {
            ReportError::InvalidRow { line, source, .. } => {
                assert_eq!(line, 3);
                assert!(matches!(*source, ReportError::DuplicateKey(1)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_users_bad_row_reports_line() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "users.csv",
            &["id,ig_username,ig_num_followers", "1,anna,100", "2,ben,many"],
        );

        let err = load_users(&path, DuplicateUserPolicy::LastWins).unwrap_err();
        match err {
            ReportError::InvalidRow { line, source, .. } => {
                assert_eq!(line, 3);
                assert!(matches!(*source, ReportError::Validation(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_users_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "users.csv", &["id,ig_username", "1,anna"]);

        let err = load_users(&path, DuplicateUserPolicy::LastWins).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_load_users_missing_file() {
        let err = load_users(
            Path::new("/tmp/does-not-exist-report-test/users.csv"),
            DuplicateUserPolicy::LastWins,
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::FileRead { .. }));
    }

    #[test]
    fn test_read_users_from_memory() {
        let data = "id,ig_username,ig_num_followers\n5,eve,42\n";
        let users = read_users(data.as_bytes(), "inline", DuplicateUserPolicy::Reject).unwrap();
        assert_eq!(users[&5].ig_num_followers, 42);
    }

    // ── load_posts ────────────────────────────────────────────────────────────

    #[test]
    fn test_load_posts_groups_by_user_in_source_order() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "posts.csv",
            &[
                POSTS_HEADER,
                r#"2,2021-01-05 10:00:00,first,"{""bubbleroom""}",1,0"#,
                "1,2021-01-06 10:00:00,hello,[],2,0",
                "2,2021-01-04 10:00:00,second,NULL,3,0",
            ],
        );

        let posts = load_posts(&path, &january()).unwrap();
        assert_eq!(posts.len(), 2);
        let ids: Vec<i64> = posts.user_ids().collect();
        assert_eq!(ids, vec![2, 1]);

        let user_two = posts.get(2).unwrap();
        let captions: Vec<&str> = user_two.iter().map(|p| p.caption_text.as_str()).collect();
        assert_eq!(captions, vec!["first", "second"]);
        assert_eq!(user_two[0].caption_tags, vec!["bubbleroom"]);
        assert!(user_two[1].caption_tags.is_empty());
    }

    #[test]
    fn test_load_posts_order_ignores_out_of_window_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "posts.csv",
            &[
                POSTS_HEADER,
                "3,2020-12-01 10:00:00,too early,[],1,0",
                "9,2021-01-05 10:00:00,a,[],1,0",
                "1,2021-01-06 10:00:00,b,[],1,0",
                "3,2021-01-07 10:00:00,c,[],1,0",
            ],
        );

        let posts = load_posts(&path, &january()).unwrap();
        assert_eq!(posts.user_ids().collect::<Vec<_>>(), vec![9, 1, 3]);
        assert_eq!(posts.num_posts(), 3);
    }

    #[test]
    fn test_load_posts_window_inclusive_bounds() {
        let window = january();
        let start = window.start();
        let end = window.end();
        let fmt = |t: NaiveDateTime| t.format("%Y-%m-%d %H:%M:%S%.6f").to_string();

        let rows = [
            format!("1,{},at start,[],1,0", fmt(start)),
            format!("1,{},at end,[],1,0", fmt(end)),
            format!("1,{},before,[],1,0", fmt(start - Duration::microseconds(1))),
            format!("1,{},after,[],1,0", fmt(end + Duration::microseconds(1))),
        ];
        let mut lines = vec![POSTS_HEADER];
        lines.extend(rows.iter().map(String::as_str));

        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "posts.csv", &lines);

        let posts = load_posts(&path, &window).unwrap();
        let captions: Vec<&str> = posts.get(1).unwrap().iter().map(|p| p.caption_text.as_str()).collect();
        assert_eq!(captions, vec!["at start", "at end"]);
    }

    #[test]
    fn test_load_posts_nothing_in_window() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "posts.csv",
            &[POSTS_HEADER, "1,2020-12-31 23:59:59,late,[],1,0"],
        );

        let posts = load_posts(&path, &january()).unwrap();
        assert!(posts.is_empty());
    }

    #[test]
    fn test_load_posts_invalid_row_outside_window_still_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "posts.csv",
            &[POSTS_HEADER, "1,2019-06-01 00:00:00,old,[],x,0"],
        );

        let err = load_posts(&path, &january()).unwrap_err();
        assert!(matches!(err, ReportError::InvalidRow { line: 2, .. }));
    }

    #[test]
    fn test_load_posts_bad_tag_encoding() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "posts.csv",
            &[POSTS_HEADER, "1,2021-01-02 00:00:00,x,{},1,0"],
        );

        let err = load_posts(&path, &january()).unwrap_err();
        match err {
            ReportError::InvalidRow { source, .. } => {
                assert!(matches!(*source, ReportError::Validation(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_posts_iso_timestamps() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "posts.csv",
            &[POSTS_HEADER, "1,2021-01-02T08:30:00,x,[],1,0"],
        );

        let posts = load_posts(&path, &january()).unwrap();
        assert_eq!(
            posts.get(1).unwrap()[0].taken_at,
            NaiveDate::from_ymd_opt(2021, 1, 2)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_load_posts_ragged_row_is_csv_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "posts.csv",
            &[POSTS_HEADER, "1,2021-01-02 00:00:00,x"],
        );

        let err = load_posts(&path, &january()).unwrap_err();
        assert!(matches!(err, ReportError::Csv { .. }));
    }
}
