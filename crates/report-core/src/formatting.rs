use chrono::NaiveDateTime;

/// Render a report boundary as day, full month name and year.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use report_core::formatting::format_report_date;
///
/// let ts = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// assert_eq!(format_report_date(ts), "01 January 2021");
/// ```
pub fn format_report_date(ts: NaiveDateTime) -> String {
    ts.format("%d %B %Y").to_string()
}

/// Format an integer counter with thousands separators.
///
/// # Examples
///
/// ```
/// use report_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_digits(&value.to_string())
}

/// Format an engagement percentage with two decimals and a `%` suffix.
///
/// ```
/// use report_core::formatting::format_engagement;
///
/// assert_eq!(format_engagement(15.0), "15.00%");
/// assert_eq!(format_engagement(1234.5), "1,234.50%");
/// ```
pub fn format_engagement(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    match fixed.split_once('.') {
        Some((whole, frac)) => format!("{}.{}%", group_digits(whole), frac),
        None => format!("{}%", fixed),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Comma every three digits, counted from the right.
fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
