use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{ReportError, Result};

/// Naive layouts accepted for post timestamps and CLI dates.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// ── Timestamp parsing ─────────────────────────────────────────────────────────

/// Parse an ISO 8601 timestamp into a naive date-time.
///
/// Accepts `T` or space separated forms with optional fractional seconds,
/// a bare `YYYY-MM-DD` date (midnight), and RFC 3339 strings carrying an
/// offset, which are normalised to UTC before the offset is dropped.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ReportError::TimestampParse(s.to_string()));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight);
        }
    }

    let normalised = match trimmed.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => trimmed.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised.replacen(' ', "T", 1)) {
        return Ok(dt.naive_utc());
    }

    Err(ReportError::TimestampParse(s.to_string()))
}

// ── ReportWindow ──────────────────────────────────────────────────────────────

/// Inclusive `[start, end]` time range a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl ReportWindow {
    /// Build a window, rejecting one whose end precedes its start.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if end < start {
            return Err(ReportError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
