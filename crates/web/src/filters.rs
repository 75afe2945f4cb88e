//! Custom Askama template filters.
//!
//! Formatting that feeds these filters directly from wire values; dates go
//! through [`format_date`] in route view models instead, where the chrono
//! value is still typed.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{DateTime, Utc};

/// Truncate a backend time string (`HH:MM:SS` or `HH:MM`) to `HH:MM`.
///
/// Usage in templates: `{{ trip.time|format_time }}`
#[askama::filter_fn]
pub fn format_time(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(short_time(&value.to_string()))
}

/// Group an integer amount with thin spaces: `12500` becomes `12 500`.
///
/// Usage in templates: `{{ trip.price|format_price }} ₽`
#[askama::filter_fn]
pub fn format_price(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(group_digits(&value.to_string()))
}

/// Render a numeric rating as a row of filled stars (rounded, 0-5).
///
/// Usage in templates: `{{ trip.driver_rating|stars }}`
#[askama::filter_fn]
pub fn stars(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(star_row(value.to_string().parse::<f64>().unwrap_or(0.0)))
}

/// `HH:MM` prefix of a time string.
#[must_use]
pub fn short_time(time: &str) -> String {
    time.chars().take(5).collect()
}

/// Digits grouped in threes from the right, separated by narrow no-break
/// spaces. Falls back to the input for anything that isn't a plain integer.
#[must_use]
pub fn group_digits(amount: &str) -> String {
    if amount.is_empty() || !amount.chars().all(|c| c.is_ascii_digit()) {
        return amount.to_string();
    }

    let digits: Vec<char> = amount.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        let remaining = digits.len() - i;
        if i > 0 && remaining % 3 == 0 {
            grouped.push('\u{202f}');
        }
        grouped.push(*c);
    }
    grouped
}

/// A row of filled stars for a rating, rounded to the nearest whole star
/// and clamped to 0..=5. Zero ratings (nobody has reviewed yet) render
/// empty so templates can fall back to a "no ratings" label.
#[must_use]
pub fn star_row(rating: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = rating.round().clamp(0.0, 5.0) as usize;
    "★".repeat(rounded)
}

/// Long-form date for trip cards, e.g. `15 September 2026`.
#[must_use]
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%-d %B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_short_time_strips_seconds() {
        assert_eq!(short_time("10:30:00"), "10:30");
        assert_eq!(short_time("10:30"), "10:30");
        assert_eq!(short_time(""), "");
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits("0"), "0");
        assert_eq!(group_digits("950"), "950");
        assert_eq!(group_digits("1500"), "1\u{202f}500");
        assert_eq!(group_digits("2500000"), "2\u{202f}500\u{202f}000");
    }

    #[test]
    fn test_group_digits_passes_through_non_numbers() {
        assert_eq!(group_digits("free"), "free");
        assert_eq!(group_digits(""), "");
    }

    #[test]
    fn test_star_row_rounds_and_clamps() {
        assert_eq!(star_row(4.6), "★★★★★");
        assert_eq!(star_row(4.4), "★★★★");
        assert_eq!(star_row(0.0), "");
        assert_eq!(star_row(9.0), "★★★★★");
        assert_eq!(star_row(-1.0), "");
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2026, 9, 5, 0, 0, 0).single().expect("valid");
        assert_eq!(format_date(&date), "5 September 2026");
    }
}
