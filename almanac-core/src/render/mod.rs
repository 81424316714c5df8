//! Calendar rendering.
//!
//! Everything here is a pure function of its inputs: the reference date,
//! the appointments in scope, the month count and an explicit "now". The
//! result is a text block with ANSI SGR sequences, ready to be written to a
//! terminal by the caller.
//!
//! ```text
//! grid -> overlay -> compose ----\
//!                                 merge -> text
//! appointments -> panel ---------/
//! ```

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::Result;
use crate::types::Appointment;

pub mod compose;
pub mod grid;
pub mod merge;
pub mod overlay;
pub mod palette;
pub mod panel;
pub mod width;
pub mod wrap;

pub use compose::compose_calendar;
pub use grid::MonthGrid;
pub use merge::merge_blocks;
pub use palette::{paint, Color, Style};
pub use panel::{build_panel, select_upcoming, PanelLimit};
pub use width::{strip_ansi, visible_width};

/// Formatting choices that are not fixed by the layout itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPolicy {
    /// chrono format for dates in the panel's date line
    pub date_format: String,
    /// chrono format for times in the panel's date line
    pub time_format: String,
    /// Per-line budget for wrapped descriptions
    pub description_width: usize,
    /// Subtracted from twice the line budget to get the description cap
    pub description_margin: usize,
    /// Spaces between the calendar and the panel
    pub panel_gap: usize,
    /// Panel entries shown next to a single month
    pub single_month_entries: usize,
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self {
            date_format: "%d.%m.%Y".to_string(),
            time_format: "%H:%M".to_string(),
            description_width: 30,
            description_margin: 3,
            panel_gap: 10,
            single_month_entries: 2,
        }
    }
}

impl RenderPolicy {
    /// Hard cap on the emitted description length.
    pub fn description_cap(&self) -> usize {
        (2 * self.description_width).saturating_sub(self.description_margin)
    }
}

/// One render call's inputs.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Any date inside the first month to show
    pub reference: NaiveDate,
    pub appointments: &'a [Appointment],
    /// 1 for the single-month view, more for the stacked view
    pub month_count: u32,
    pub now: NaiveDateTime,
}

/// Render the calendar and the upcoming panel side by side.
pub fn render(request: &RenderRequest<'_>, policy: &RenderPolicy) -> Result<String> {
    let calendar = compose_calendar(
        request.reference,
        request.appointments,
        request.month_count,
        request.now,
    )?;

    let limit = if request.month_count == 1 {
        PanelLimit::Entries(policy.single_month_entries)
    } else {
        PanelLimit::Lines(calendar.len())
    };
    let upcoming = select_upcoming(request.appointments, request.now);
    let panel = build_panel(&upcoming, request.now, policy, limit);

    tracing::debug!(
        calendar_lines = calendar.len(),
        panel_lines = panel.len(),
        upcoming = upcoming.len(),
        "Rendering calendar"
    );

    Ok(merge_blocks(&calendar, &panel, policy.panel_gap).join("\n"))
}
