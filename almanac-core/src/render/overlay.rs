//! Appointment and "today" highlighting on a [`MonthGrid`].

use chrono::NaiveDate;

use super::grid::MonthGrid;
use super::palette::{Color, Style};
use crate::types::Appointment;

/// Style for a single day, or `None` when the day stays plain.
///
/// The first appointment in list order whose date span covers `day` decides
/// the color. On `today` the color becomes its background variant; a today
/// with no appointment gets the neutral background.
pub fn day_style(day: NaiveDate, appointments: &[Appointment], today: NaiveDate) -> Option<Style> {
    let color = appointments
        .iter()
        .find(|appt| appt.covers(day))
        .map(Appointment::display_color);

    match (color, day == today) {
        (Some(color), true) => Some(Style::Fg(color).to_background()),
        (Some(color), false) => Some(Style::Fg(color)),
        (None, true) => Some(Style::Bg(Color::default())),
        (None, false) => None,
    }
}

/// Restyle the cells of `grid` for appointment days and `today`.
pub fn overlay_appointments(grid: &mut MonthGrid, appointments: &[Appointment], today: NaiveDate) {
    for day in 1..=grid.days() {
        let Some(date) = grid.date_of(day) else {
            continue;
        };
        let style = day_style(date, appointments, today);
        if let Some(cell) = grid.cell_mut(day) {
            cell.style = style;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::palette::paint;
    use crate::render::width::visible_width;
    use crate::types::Tag;
    use chrono::NaiveDateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn tagged(start: &str, end: &str, color: Color) -> Appointment {
        Appointment::new(dt(start), dt(end), "Trip", "", vec![Tag::new("t", color)])
    }

    #[test]
    fn test_span_is_highlighted_by_first_tag_color() {
        let appts = vec![tagged("2025-01-01 09:00", "2025-01-03 17:00", Color::Blue)];
        let mut grid = MonthGrid::build(date(2025, 1, 1));
        overlay_appointments(&mut grid, &appts, date(2025, 2, 1));

        let text = grid.render_lines().join("\n");
        for day in ["1", "2", "3"] {
            assert!(text.contains(&paint(Color::Blue, day)), "day {day}");
        }
        assert!(!text.contains(&paint(Color::Blue, "4")));
        assert!(text.contains(" 4 "));
    }

    #[test]
    fn test_day_one_does_not_touch_day_eleven() {
        let appts = vec![tagged("2025-01-01 09:00", "2025-01-01 10:00", Color::Red)];
        let mut grid = MonthGrid::build(date(2025, 1, 1));
        overlay_appointments(&mut grid, &appts, date(2025, 2, 1));

        let text = grid.render_lines().join("\n");
        assert!(text.contains(&paint(Color::Red, "1")));
        assert!(!text.contains(&paint(Color::Red, "11")));
        assert!(text.contains("11 "));
        assert_eq!(text.matches("\x1b[31m").count(), 1);
    }

    #[test]
    fn test_first_matching_appointment_wins() {
        let appts = vec![
            tagged("2025-01-05 09:00", "2025-01-05 10:00", Color::Green),
            tagged("2025-01-04 09:00", "2025-01-06 10:00", Color::Purple),
        ];
        assert_eq!(
            day_style(date(2025, 1, 5), &appts, date(2025, 2, 1)),
            Some(Style::Fg(Color::Green))
        );
        assert_eq!(
            day_style(date(2025, 1, 4), &appts, date(2025, 2, 1)),
            Some(Style::Fg(Color::Purple))
        );
    }

    #[test]
    fn test_untagged_appointment_uses_default_color() {
        let appts = vec![Appointment::new(
            dt("2025-01-08 09:00"),
            dt("2025-01-08 10:00"),
            "Dentist",
            "",
            vec![],
        )];
        assert_eq!(
            day_style(date(2025, 1, 8), &appts, date(2025, 2, 1)),
            Some(Style::Fg(Color::White))
        );
    }

    #[test]
    fn test_today_background_beats_foreground() {
        let appts = vec![tagged("2025-01-10 09:00", "2025-01-10 10:00", Color::Cyan)];
        let today = date(2025, 1, 10);
        assert_eq!(day_style(today, &appts, today), Some(Style::Bg(Color::Cyan)));

        let mut grid = MonthGrid::build(today);
        overlay_appointments(&mut grid, &appts, today);
        let text = grid.render_lines().join("\n");
        assert!(text.contains(&paint(Style::Bg(Color::Cyan), "10")));
        assert!(!text.contains(&paint(Color::Cyan, "10")));
    }

    #[test]
    fn test_plain_today_gets_neutral_background() {
        let today = date(2025, 1, 15);
        assert_eq!(day_style(today, &[], today), Some(Style::Bg(Color::White)));
        assert_eq!(day_style(date(2025, 1, 16), &[], today), None);
    }

    #[test]
    fn test_overlay_preserves_row_width() {
        let appts = vec![tagged("2025-01-01 09:00", "2025-01-31 10:00", Color::Yellow)];
        let mut grid = MonthGrid::build(date(2025, 1, 1));
        overlay_appointments(&mut grid, &appts, date(2025, 1, 20));
        for line in grid.render_lines() {
            assert_eq!(visible_width(&line), 21);
        }
    }
}
