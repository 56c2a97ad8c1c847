//! Permissive, per-cell date parsing.
//!
//! Real exports mix ISO dates, US-style slashes, month names and full
//! timestamps in one column. Each cell is tried against a fixed, ordered list
//! of layouts; the first match wins. Timestamps are truncated to their date.
//!
//! chrono's `%Y` also accepts one or two digits, so every four-digit-year
//! layout rejects years outside 1000..=9999. Two-digit years (`1/5/21`) have
//! their own layouts, tried afterwards.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Date-only layouts with a four-digit year, tried in order.
///
/// Month-first comes before day-first for ambiguous numeric dates.
const DATE_FORMATS: [&str; 15] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Two-digit-year layouts (`%y`: 70..=99 -> 19xx, 00..=69 -> 20xx). The year
/// always comes last; month-first before day-first as above.
const SHORT_YEAR_FORMATS: [&str; 7] = [
    "%m/%d/%y",
    "%d/%m/%y",
    "%m-%d-%y",
    "%d-%m-%y",
    "%d.%m.%y",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
];

/// Parse one date cell, or `None` if no supported layout matches.
pub fn parse_mixed_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(d) = parse_compact(s) {
        return Some(d);
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            if four_digit_year(d) {
                return Some(d);
            }
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            if four_digit_year(dt.date()) {
                return Some(dt.date());
            }
        }
    }
    for fmt in SHORT_YEAR_FORMATS {
        if let Some(d) = parse_short_year(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }

    None
}

fn four_digit_year(d: NaiveDate) -> bool {
    (1000..=9999).contains(&d.year())
}

/// `%y` layouts; the trailing year group must be exactly two digits.
fn parse_short_year(s: &str, fmt: &str) -> Option<NaiveDate> {
    let date_part = s.split(' ').next()?;
    let year_digits = date_part.rsplit(['/', '-', '.']).next()?;
    if year_digits.len() != 2 {
        return None;
    }
    if fmt.contains("%H") {
        NaiveDateTime::parse_from_str(s, fmt).ok().map(|dt| dt.date())
    } else {
        NaiveDate::parse_from_str(s, fmt).ok()
    }
}

/// `YYYYMMDD` with no separators.
fn parse_compact(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = s[0..4].parse().ok()?;
    let month = s[4..6].parse().ok()?;
    let day = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).filter(|d| four_digit_year(*d))
}
