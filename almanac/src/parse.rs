//! Argument parsers for dates, months and colors.
//!
//! Each returns `Result<_, String>` so it can be used directly as a clap
//! `value_parser`.

use almanac_core::Color;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// `YYYY-MM-DDTHH:MM`, `YYYY-MM-DD HH:MM`, or a bare `YYYY-MM-DD` (midnight).
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| {
            format!(
                "invalid date-time '{}': expected YYYY-MM-DDTHH:MM or YYYY-MM-DD",
                value
            )
        })
}

/// A month number (1-12), an English month name, or a prefix of at least
/// three letters (`mar`, `Sept`).
pub fn parse_month(value: &str) -> Result<u32, String> {
    let value = value.trim().to_ascii_lowercase();

    if let Ok(number) = value.parse::<u32>() {
        return if (1..=12).contains(&number) {
            Ok(number)
        } else {
            Err(format!("month must be between 1 and 12, got {}", number))
        };
    }

    if value.len() >= 3 {
        if let Some(index) = MONTH_NAMES.iter().position(|name| name.starts_with(&value)) {
            return Ok(index as u32 + 1);
        }
    }
    Err(format!("unknown month '{}'", value))
}

/// A palette color name. Unlike stored colors, user input is not lossy.
pub fn parse_color(value: &str) -> Result<Color, String> {
    value.parse::<Color>().map_err(|e| {
        let names: Vec<_> = Color::ALL.iter().map(Color::as_str).collect();
        format!("{} (expected one of: {})", e, names.join(", "))
    })
}

/// First day of the requested month, defaulting to the month of `today`.
pub fn reference_date(
    month: Option<u32>,
    year: Option<i32>,
    today: NaiveDate,
) -> Result<NaiveDate, String> {
    use chrono::Datelike;

    let month = month.unwrap_or_else(|| today.month());
    let year = year.unwrap_or_else(|| today.year());
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| format!("invalid month {} of year {}", month, year))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2025-03-14T09:30").unwrap(), expected);
        assert_eq!(parse_datetime("2025-03-14 09:30").unwrap(), expected);
        assert_eq!(parse_datetime(" 2025-03-14T09:30:00 ").unwrap(), expected);

        let midnight = parse_datetime("2025-03-14").unwrap();
        assert_eq!(midnight.time(), NaiveTime::MIN);

        assert!(parse_datetime("14.03.2025").is_err());
        assert!(parse_datetime("2025-02-30").is_err());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("3").unwrap(), 3);
        assert_eq!(parse_month("March").unwrap(), 3);
        assert_eq!(parse_month("sept").unwrap(), 9);
        assert_eq!(parse_month("DEC").unwrap(), 12);

        assert!(parse_month("13").is_err());
        assert!(parse_month("0").is_err());
        // Too short to be unambiguous
        assert!(parse_month("ju").is_err());
        assert!(parse_month("smarch").is_err());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("Purple").unwrap(), Color::Purple);
        let err = parse_color("magenta").unwrap_err();
        assert!(err.contains("red, green"));
    }

    #[test]
    fn test_reference_date_defaults() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 18).unwrap();
        assert_eq!(
            reference_date(None, None, today).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
        assert_eq!(
            reference_date(Some(2), None, today).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
        );
        assert_eq!(
            reference_date(Some(12), Some(2024), today).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
        );
    }
}
