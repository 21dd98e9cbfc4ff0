use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

fn ordinal_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d)(st|nd|rd|th)\b").expect("static regex"))
}

fn relative_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s*(second|sec|minute|min|hour|day|week|month|year)s?\s+ago")
            .expect("static regex")
    })
}

/// Parses a publish date into epoch milliseconds, `0` when unparseable
///
/// Tries, in order: the source's chrono `format` as a date, the same format
/// as a date-time, RFC 3339, and relative labels such as "3 days ago".
pub fn parse_date(raw: &str, format: &str) -> i64 {
    parse_date_at(raw, format, Utc::now())
}

/// Like `parse_date`, with relative labels measured from `now`
pub fn parse_date_at(raw: &str, format: &str, now: DateTime<Utc>) -> i64 {
    let cleaned = ordinal_suffix_regex().replace_all(raw.trim(), "$1");
    let cleaned = cleaned.as_ref();

    if cleaned.is_empty() {
        return 0;
    }

    if let Ok(date) = NaiveDate::parse_from_str(cleaned, format) {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Utc.from_utc_datetime(&midnight).timestamp_millis();
        }
    }

    if let Ok(datetime) = NaiveDateTime::parse_from_str(cleaned, format) {
        return Utc.from_utc_datetime(&datetime).timestamp_millis();
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(cleaned) {
        return datetime.timestamp_millis();
    }

    if let Some(millis) = parse_relative(cleaned, now) {
        return millis;
    }

    tracing::debug!("Unparseable date '{}' (format '{}')", raw, format);
    0
}

fn parse_relative(text: &str, now: DateTime<Utc>) -> Option<i64> {
    let caps = relative_regex().captures(text)?;
    let amount: i64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str().to_lowercase();

    let offset = match unit.as_str() {
        "second" | "sec" => Duration::try_seconds(amount),
        "minute" | "min" => Duration::try_minutes(amount),
        "hour" => Duration::try_hours(amount),
        "day" => Duration::try_days(amount),
        "week" => Duration::try_weeks(amount),
        "month" => amount.checked_mul(30).and_then(Duration::try_days),
        "year" => amount.checked_mul(365).and_then(Duration::try_days),
        _ => None,
    }?;

    now.checked_sub_signed(offset).map(|date| date.timestamp_millis())
}
