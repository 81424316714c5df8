//! Calendar block composition for one or several months.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

use super::grid::{first_of_month, MonthGrid, WEEKDAY_HEADER};
use super::overlay::overlay_appointments;
use super::palette::{paint, Style};
use super::width::{center, pad_right, visible_width};
use crate::error::{Error, Result};
use crate::types::Appointment;

/// Day-of-week header for the stacked view, indented past the month labels.
pub const MULTI_MONTH_WEEKDAY_HEADER: &str = "    MO TU WE TH FR SA SU ";

/// Indent for grid lines after the first one of each stacked month.
const LABEL_INDENT: &str = "    ";

/// English ordinal suffix for a day of the month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// `"MARCH 2025"` centered over the weekday header, in bold.
pub fn single_month_header(date: NaiveDate) -> String {
    let title = format!(
        "{} {}",
        date.format("%B").to_string().to_uppercase(),
        date.year()
    );
    paint(Style::Bold, &center(&title, WEEKDAY_HEADER.len()))
}

/// `"Friday, March 14th 2025"` for the stacked view header (unstyled).
pub fn today_header(today: NaiveDate) -> String {
    format!(
        "{}, {} {}{} {}",
        today.format("%A"),
        today.format("%B"),
        today.day(),
        ordinal_suffix(today.day()),
        today.year()
    )
}

/// Build the month containing `date` with appointments and `today` applied.
pub fn overlaid_month(date: NaiveDate, appointments: &[Appointment], today: NaiveDate) -> MonthGrid {
    let mut grid = MonthGrid::build(date);
    overlay_appointments(&mut grid, appointments, today);
    grid
}

/// Compose the calendar block.
///
/// With `month_count == 1` the block is a centered month header, the weekday
/// row, and the grid. With more months, a shared header for `now` is followed
/// by the reference month and the next `month_count - 1` months, each labeled
/// with its abbreviation. Every line of the returned block has the same
/// visible width.
pub fn compose_calendar(
    reference: NaiveDate,
    appointments: &[Appointment],
    month_count: u32,
    now: NaiveDateTime,
) -> Result<Vec<String>> {
    let today = now.date();

    match month_count {
        0 => Err(Error::Render("month count must be at least 1".to_string())),
        1 => {
            let mut lines = vec![
                single_month_header(reference),
                WEEKDAY_HEADER.to_string(),
            ];
            lines.extend(overlaid_month(reference, appointments, today).render_lines());
            Ok(lines)
        }
        _ => {
            let header = today_header(today);
            let width = visible_width(&header).max(MULTI_MONTH_WEEKDAY_HEADER.len());
            let styled_header = paint(Style::Bold, &paint(Style::Underline, &header));

            let mut lines = vec![
                pad_right(&styled_header, width),
                pad_right(MULTI_MONTH_WEEKDAY_HEADER, width),
            ];

            let first = first_of_month(reference);
            for i in 0..month_count {
                let month = first.checked_add_months(Months::new(i)).ok_or_else(|| {
                    Error::Render(format!("cannot advance {} by {} months", first, i))
                })?;
                let grid = overlaid_month(month, appointments, today);
                let label = format!(
                    "{} ",
                    grid.first_day().format("%b").to_string().to_uppercase()
                );
                for (j, row) in grid.render_lines().into_iter().enumerate() {
                    let prefix = if j == 0 { label.as_str() } else { LABEL_INDENT };
                    lines.push(pad_right(&format!("{}{}", prefix, row), width));
                }
            }

            tracing::debug!(months = month_count, lines = lines.len(), "Composed calendar");
            Ok(lines)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::palette::Color;
    use crate::types::Tag;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn test_ordinal_suffix() {
        let cases = [
            (1, "st"),
            (2, "nd"),
            (3, "rd"),
            (4, "th"),
            (11, "th"),
            (12, "th"),
            (13, "th"),
            (21, "st"),
            (22, "nd"),
            (23, "rd"),
            (30, "th"),
            (31, "st"),
        ];
        for (day, suffix) in cases {
            assert_eq!(ordinal_suffix(day), suffix, "day {day}");
        }
    }

    #[test]
    fn test_today_header() {
        assert_eq!(today_header(date(2025, 3, 14)), "Friday, March 14th 2025");
        assert_eq!(today_header(date(2025, 1, 1)), "Wednesday, January 1st 2025");
    }

    #[test]
    fn test_single_month_layout() {
        let lines = compose_calendar(date(2025, 3, 10), &[], 1, at(2025, 5, 1, 9)).unwrap();

        assert_eq!(lines[0], "\x1b[1m     MARCH 2025      \x1b[0m");
        assert_eq!(lines[1], WEEKDAY_HEADER);
        assert_eq!(lines[2], "                1  2 ");
        assert_eq!(lines[7], "31                   ");
        assert_eq!(lines.len(), 8);
        for line in &lines {
            assert_eq!(visible_width(line), WEEKDAY_HEADER.len());
        }
    }

    #[test]
    fn test_zero_months_is_an_error() {
        let result = compose_calendar(date(2025, 3, 10), &[], 0, at(2025, 3, 10, 9));
        assert!(matches!(result, Err(Error::Render(_))));
    }

    #[test]
    fn test_multi_month_layout() {
        let appts = vec![Appointment::new(
            at(2025, 2, 3, 9),
            at(2025, 2, 3, 10),
            "Review",
            "",
            vec![Tag::new("work", Color::Green)],
        )];
        let lines = compose_calendar(date(2025, 1, 20), &appts, 3, at(2025, 1, 15, 10)).unwrap();

        let header = "Wednesday, January 15th 2025";
        assert!(lines[0].contains(header));
        assert!(lines[0].contains("\x1b[4m"));
        assert!(lines[1].starts_with(MULTI_MONTH_WEEKDAY_HEADER));

        // January: 5 rows, February: 5 rows, March: 6 rows
        assert_eq!(lines.len(), 2 + 5 + 5 + 6);
        assert!(lines[2].starts_with("JAN "));
        assert!(lines[3].starts_with("    "));
        assert!(lines[7].starts_with("FEB "));
        assert!(lines[12].starts_with("MAR "));
        assert!(lines[8].contains(&paint(Color::Green, "3")));

        for line in &lines {
            assert_eq!(visible_width(line), header.len(), "{line:?}");
        }
    }

    #[test]
    fn test_multi_month_crosses_year_boundary() {
        let lines = compose_calendar(date(2024, 12, 31), &[], 2, at(2024, 12, 2, 8)).unwrap();
        let labels: Vec<_> = lines
            .iter()
            .filter(|l| !l.starts_with(' ') && !l.starts_with('\x1b'))
            .map(|l| &l[..3])
            .collect();
        assert_eq!(labels, vec!["DEC", "JAN"]);
    }
}
