//! Date resolution for extracted expenses
//!
//! The model is asked to return `YYYY-MM-DD`, but in practice it echoes
//! whatever the speaker said ("yesterday", "1st July", "last friday").
//! [`resolve_date`] turns any of those into a concrete date and never fails:
//! when nothing can be made of the input it falls back to today.
//!
//! Resolution order (first match wins):
//! 1. contains "yesterday" (any case) -> today - 1
//! 2. contains "today" -> today
//! 3. contains "tomorrow" -> today + 1
//! 4. natural-language parse ([`parse_natural_date`])
//! 5. strict `YYYY-MM-DD`
//! 6. today

use std::sync::OnceLock;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::Regex;

/// Canonical date format for stored and returned expenses
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Numeric formats tried in order (day-first for the ambiguous slash/dash forms)
///
/// `%Y` also accepts one or two digits, so a short year can match a four-digit
/// pattern; [`plausible`] rejects those and the `%y` forms pick them up.
const NUMERIC_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%y", "%d/%m/%y",
    "%d.%m.%y",
];

/// Month-name formats; chrono accepts short or long names, any case
const MONTH_NAME_FORMATS: &[&str] = &["%d %B %Y", "%B %d %Y", "%d %B %y", "%B %d %y"];

/// Resolved dates must have a four-digit year
fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (1000..=9999).contains(&date.year()).then_some(date)
}

fn parse_with(s: &str, formats: &[&str]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok().and_then(plausible))
}

fn ordinal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,2})(st|nd|rd|th)\b").expect("valid regex"))
}

fn offset_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:(in)\s+)?(\d+|a|an|one)\s+(day|days|week|weeks)(?:\s+(ago))?$")
            .expect("valid regex")
    })
}

/// Resolve a raw extracted date into a concrete calendar date
pub fn resolve_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return today;
    };
    let lower = raw.to_lowercase();

    if lower.contains("yesterday") {
        return today - Duration::days(1);
    }
    if lower.contains("today") {
        return today;
    }
    if lower.contains("tomorrow") {
        return today + Duration::days(1);
    }

    if let Some(date) = parse_natural_date(raw, today) {
        return date;
    }

    parse_with(raw, &[DATE_FORMAT]).unwrap_or(today)
}

/// Resolve a raw extracted date and format it as `YYYY-MM-DD`
pub fn resolve_date_string(raw: Option<&str>, today: NaiveDate) -> String {
    resolve_date(raw, today).format(DATE_FORMAT).to_string()
}

/// Best-effort parse of a free-form date phrase
///
/// Handles numeric dates, month names (with or without a year, with ordinal
/// suffixes), "N days/weeks ago", "in N days", and weekday names. Year-less
/// dates take `today`'s year; weekday names resolve to the most recent
/// matching day on or before `today` ("last <weekday>" is strictly before).
pub fn parse_natural_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let trimmed = raw.trim().trim_end_matches('.');

    if let Some(date) = parse_with(trimmed, NUMERIC_FORMATS) {
        return Some(date);
    }

    let cleaned = clean_phrase(trimmed);
    if cleaned.is_empty() {
        return None;
    }

    if let Some(date) = parse_offset(&cleaned, today) {
        return Some(date);
    }
    if let Some(date) = parse_weekday_phrase(&cleaned, today) {
        return Some(date);
    }

    if let Some(date) = parse_with(&cleaned, MONTH_NAME_FORMATS) {
        return Some(date);
    }

    // Year-less month name ("1 july", "jul 1")
    let with_year = format!("{} {}", cleaned, today.year());
    parse_with(&with_year, MONTH_NAME_FORMATS)
}

/// Lowercase, drop commas/ordinals/filler words, collapse whitespace
fn clean_phrase(s: &str) -> String {
    let lower = s.to_lowercase().replace(',', " ");
    let no_ordinals = ordinal_re().replace_all(&lower, "$1");
    no_ordinals
        .split_whitespace()
        .filter(|w| !matches!(*w, "on" | "the" | "of"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_offset(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = offset_re().captures(s)?;
    let future = caps.get(1).is_some();
    let past = caps.get(4).is_some();
    // Exactly one direction: "3 days" alone is not a date
    if future == past {
        return None;
    }

    let count: i64 = match &caps[2] {
        "a" | "an" | "one" => 1,
        n => n.parse().ok()?,
    };
    let days = if caps[3].starts_with("week") {
        count.checked_mul(7)?
    } else {
        count
    };
    let delta = Duration::try_days(days)?;

    let date = if future {
        today.checked_add_signed(delta)
    } else {
        today.checked_sub_signed(delta)
    };
    date.and_then(plausible)
}

fn parse_weekday_phrase(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let mut words = s.split_whitespace();
    let (strictly_before, name) = match (words.next()?, words.next(), words.next()) {
        ("last", Some(day), None) => (true, day),
        ("this", Some(day), None) => (false, day),
        (day, None, None) => (false, day),
        _ => return None,
    };
    let weekday = parse_weekday(name)?;

    let mut days_back = (today.weekday().num_days_from_monday() + 7
        - weekday.num_days_from_monday())
        % 7;
    if strictly_before && days_back == 0 {
        days_back = 7;
    }
    today.checked_sub_signed(Duration::days(i64::from(days_back)))
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}
