//! Upcoming-appointment panel shown beside the calendar.

use chrono::NaiveDateTime;

use super::palette::{paint, Color, Style};
use super::wrap::wrap_words;
use super::RenderPolicy;
use crate::types::Appointment;

/// Indent for wrapped description lines.
const DESCRIPTION_INDENT: &str = "   ";

/// How many entries the panel may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelLimit {
    /// At most this many entries
    Entries(usize),
    /// As many entries as fit in this many lines (always at least one)
    Lines(usize),
}

/// Appointments that are still relevant at `now`, earliest start first.
///
/// Future appointments and running ones (`start <= now < end`) are kept;
/// anything that already ended is dropped. Ties keep list order.
pub fn select_upcoming(appointments: &[Appointment], now: NaiveDateTime) -> Vec<&Appointment> {
    let mut upcoming: Vec<&Appointment> = appointments
        .iter()
        .filter(|appt| appt.is_upcoming(now))
        .collect();
    upcoming.sort_by_key(|appt| appt.start);
    upcoming
}

/// `(14.03.2025 | 09:00 - 10:30)` or `(14.03.2025, 22:00 - 15.03.2025, 02:00)`,
/// with a yellow ` (Running)` suffix while `now` is inside the appointment.
pub fn format_date_line(appt: &Appointment, now: NaiveDateTime, policy: &RenderPolicy) -> String {
    let date_fmt = policy.date_format.as_str();
    let time_fmt = policy.time_format.as_str();

    let mut line = if appt.is_single_day() {
        format!(
            "({} | {} - {})",
            appt.start.format(date_fmt),
            appt.start.format(time_fmt),
            appt.end.format(time_fmt)
        )
    } else {
        format!(
            "({}, {} - {}, {})",
            appt.start.format(date_fmt),
            appt.start.format(time_fmt),
            appt.end.format(date_fmt),
            appt.end.format(time_fmt)
        )
    };

    if appt.is_running(now) {
        line.push_str(&paint(Color::Yellow, " (Running)"));
    }
    line
}

/// Lines for one panel entry: date, title, description, tags.
pub fn format_appointment(appt: &Appointment, now: NaiveDateTime, policy: &RenderPolicy) -> Vec<String> {
    let mut lines = vec![
        format_date_line(appt, now, policy),
        format!("-> {}", paint(appt.display_color(), &appt.title)),
    ];

    lines.extend(
        wrap_words(
            &appt.description,
            policy.description_width,
            Some(policy.description_cap()),
        )
        .into_iter()
        .map(|line| format!("{}{}", DESCRIPTION_INDENT, line)),
    );

    if !appt.tags.is_empty() {
        let names: Vec<String> = appt
            .tags
            .iter()
            .map(|tag| paint(tag.color, &tag.name))
            .collect();
        lines.push(format!("Tags: {}", names.join(", ")));
    }

    lines
}

/// Build the panel for already-selected `upcoming` appointments.
///
/// Returns no lines when there is nothing upcoming.
pub fn build_panel(
    upcoming: &[&Appointment],
    now: NaiveDateTime,
    policy: &RenderPolicy,
    limit: PanelLimit,
) -> Vec<String> {
    // Header and the blank line after it
    const HEADER_LINES: usize = 2;

    let mut entries: Vec<Vec<String>> = Vec::new();
    let mut used = HEADER_LINES;

    for appt in upcoming {
        let entry = format_appointment(appt, now, policy);
        let needed = entry.len() + usize::from(!entries.is_empty());

        let fits = match limit {
            PanelLimit::Entries(max) => entries.len() < max,
            PanelLimit::Lines(max) => entries.is_empty() || used + needed <= max,
        };
        if !fits {
            break;
        }

        used += needed;
        entries.push(entry);
    }

    if entries.is_empty() {
        return Vec::new();
    }

    let title = if entries.len() > 1 {
        "Upcoming Appointments:"
    } else {
        "Upcoming Appointment:"
    };

    let mut lines = vec![paint(Style::Bold, title), String::new()];
    for (i, entry) in entries.into_iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.extend(entry);
    }
    lines
}
