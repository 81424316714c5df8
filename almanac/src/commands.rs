//! Subcommand handlers.
//!
//! Each handler reads from the store, calls into `almanac_core`, and prints
//! to stdout. The clock is never read here; `now` comes from `main`.

use std::collections::HashSet;

use almanac_core::render::panel::{build_panel, select_upcoming, PanelLimit};
use almanac_core::render::{self, paint};
use almanac_core::{
    appointments_to_json, Appointment, AppointmentFilter, Color, Config, Database, Error,
    RenderRequest, Tag,
};
use anyhow::{bail, Context, Result};
use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};

use crate::parse;

/// Upcoming appointments fetched beyond the displayed months for the panel
const PANEL_LOOKAHEAD: usize = 50;

/// Display format for `list`
const LIST_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// ============================================
// Calendar
// ============================================

pub fn show(
    db: &Database,
    config: &Config,
    now: NaiveDateTime,
    month: Option<u32>,
    year: Option<i32>,
    months: Option<u32>,
) -> Result<()> {
    let month_count = months.unwrap_or(config.display.months);
    let reference = parse::reference_date(month, year, now.date()).map_err(anyhow::Error::msg)?;
    let (from, to) = displayed_span(reference, month_count)?;

    let appointments = appointments_for_view(db, from, to, now)?;
    tracing::info!(
        %reference,
        month_count,
        appointments = appointments.len(),
        "Showing calendar"
    );

    let request = RenderRequest {
        reference,
        appointments: &appointments,
        month_count,
        now,
    };
    let text = render::render(&request, &config.display.render_policy())
        .context("failed to render calendar")?;
    println!("{}", text);
    Ok(())
}

/// First and last instant of the `month_count` months starting at `reference`.
fn displayed_span(reference: NaiveDate, month_count: u32) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let last_day = reference
        .checked_add_months(Months::new(month_count))
        .and_then(|next| next.pred_opt())
        .context("date range out of bounds")?;
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).context("invalid time")?;
    Ok((
        reference.and_time(NaiveTime::MIN),
        last_day.and_time(end_of_day),
    ))
}

/// Appointments overlapping the displayed months, followed by upcoming ones
/// that fall outside them.
///
/// Range results come first so that list order (which decides the color of
/// a day) follows start time within the grid.
fn appointments_for_view(
    db: &Database,
    from: NaiveDateTime,
    to: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<Vec<Appointment>> {
    let mut appointments = db
        .appointments_in_range(from, to)
        .context("failed to load appointments")?;
    let mut seen: HashSet<i64> = appointments.iter().map(|a| a.id).collect();

    for appointment in db
        .upcoming_appointments(now, PANEL_LOOKAHEAD, None)
        .context("failed to load upcoming appointments")?
    {
        if seen.insert(appointment.id) {
            appointments.push(appointment);
        }
    }
    Ok(appointments)
}

pub fn upcoming(
    db: &Database,
    config: &Config,
    now: NaiveDateTime,
    limit: usize,
    tag: Option<&str>,
) -> Result<()> {
    let appointments = db.upcoming_appointments(now, limit, tag)?;
    let selected = select_upcoming(&appointments, now);
    let panel = build_panel(
        &selected,
        now,
        &config.display.render_policy(),
        PanelLimit::Entries(limit),
    );

    if panel.is_empty() {
        println!("No upcoming appointments.");
        return Ok(());
    }
    for line in panel {
        println!("{}", line);
    }
    Ok(())
}

// ============================================
// Appointments
// ============================================

fn tags_by_name(names: &[String]) -> Vec<Tag> {
    // The store resolves names to stored tags; the color here is ignored
    names
        .iter()
        .map(|name| Tag::new(name.as_str(), Color::default()))
        .collect()
}

pub fn add(
    db: &Database,
    title: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    description: String,
    tags: &[String],
) -> Result<()> {
    let appointment = Appointment::new(start, end, title, description, tags_by_name(tags));
    let id = db.insert_appointment(&appointment)?;
    tracing::info!(id, "Added appointment");
    println!("Added appointment {}", id);
    Ok(())
}

/// Fields to change on an existing appointment; `None` keeps the old value.
pub struct AppointmentChanges {
    pub title: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl AppointmentChanges {
    fn apply(self, appointment: &mut Appointment) {
        if let Some(title) = self.title {
            appointment.title = title;
        }
        if let Some(start) = self.start {
            appointment.start = start;
        }
        if let Some(end) = self.end {
            appointment.end = end;
        }
        if let Some(description) = self.description {
            appointment.description = description;
        }
        if let Some(tags) = self.tags {
            appointment.tags = tags_by_name(&tags);
        }
    }
}

pub fn edit(db: &Database, id: i64, changes: AppointmentChanges) -> Result<()> {
    let mut appointment = db
        .get_appointment(id)?
        .ok_or(Error::AppointmentNotFound(id))?;
    changes.apply(&mut appointment);
    db.update_appointment(&appointment)?;
    tracing::info!(id, "Updated appointment");
    println!("Updated appointment {}", id);
    Ok(())
}

pub fn remove(db: &Database, id: i64) -> Result<()> {
    db.remove_appointment(id)?;
    tracing::info!(id, "Removed appointment");
    println!("Removed appointment {}", id);
    Ok(())
}

pub fn list(db: &Database, filter: AppointmentFilter, json: bool) -> Result<()> {
    if let Some(tag) = &filter.tag {
        if db.get_tag_by_name(tag)?.is_none() {
            return Err(Error::TagNotFound(tag.clone()).into());
        }
    }
    let appointments = db.list_appointments(&filter)?;

    if json {
        println!("{}", appointments_to_json(&appointments)?);
        return Ok(());
    }

    if appointments.is_empty() {
        println!("No appointments found.");
        return Ok(());
    }
    for appointment in &appointments {
        println!("{}", list_row(appointment));
    }
    Ok(())
}

fn list_row(appointment: &Appointment) -> String {
    let mut row = format!(
        "{:>4}  {} - {}  {}",
        appointment.id,
        appointment.start.format(LIST_DATETIME_FORMAT),
        appointment.end.format(LIST_DATETIME_FORMAT),
        paint(appointment.display_color(), &appointment.title)
    );
    if !appointment.tags.is_empty() {
        let names: Vec<_> = appointment.tags.iter().map(|t| t.name.as_str()).collect();
        row.push_str(&format!("  [{}]", names.join(", ")));
    }
    row
}

// ============================================
// Tags
// ============================================

pub fn tag_add(db: &Database, name: &str, color: Color, overwrite: bool) -> Result<()> {
    let tag = Tag::new(name, color);
    if overwrite {
        db.upsert_tag(&tag)?;
    } else {
        match db.insert_tag(&tag) {
            Ok(_) => {}
            Err(Error::DuplicateTag(_)) => {
                bail!(
                    "tag '{}' already exists; pass --overwrite to replace its color",
                    name
                )
            }
            Err(e) => return Err(e.into()),
        }
    }
    println!("Saved tag {}", paint(color, name));
    Ok(())
}

pub fn tag_edit(
    db: &Database,
    name: &str,
    rename: Option<String>,
    color: Option<Color>,
) -> Result<()> {
    let existing = db
        .get_tag_by_name(name)?
        .ok_or_else(|| Error::TagNotFound(name.to_string()))?;
    let updated = Tag {
        id: existing.id,
        name: rename.unwrap_or_else(|| existing.name.clone()),
        color: color.unwrap_or(existing.color),
    };
    db.update_tag(name, &updated)?;
    println!("Updated tag {}", paint(updated.color, &updated.name));
    Ok(())
}

pub fn tag_list(db: &Database) -> Result<()> {
    let tags = db.list_tags()?;
    if tags.is_empty() {
        println!("No tags defined.");
        return Ok(());
    }
    for tag in tags {
        println!("{}  ({})", paint(tag.color, &tag.name), tag.color);
    }
    Ok(())
}

pub fn tag_remove(db: &Database, name: &str) -> Result<()> {
    db.remove_tag(name)?;
    println!("Removed tag {}", name);
    Ok(())
}
