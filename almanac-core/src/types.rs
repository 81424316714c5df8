//! Core domain types for almanac
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Appointment** | A titled span of time between a start and an end date-time |
//! | **Tag** | A named color label; an appointment carries an ordered list of them |
//! | **Running** | An appointment whose span contains "now" (`start <= now < end`) |
//! | **Upcoming** | An appointment that has not ended yet (future or running) |
//!
//! All date-times are naive local date-times. Nothing here reads the clock;
//! callers pass "now" explicitly.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
pub use crate::render::palette::Color;

// ============================================
// Tag
// ============================================

/// A named color label attached to appointments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Store-assigned identifier (0 before insertion)
    pub id: i64,
    /// Unique, case-sensitive name
    pub name: String,
    /// Display color
    pub color: Color,
}

impl Tag {
    /// Create a tag that has not been stored yet.
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            id: 0,
            name: name.into(),
            color,
        }
    }
}

// ============================================
// Appointment
// ============================================

/// A calendar appointment.
///
/// Tags keep insertion order; the first tag decides the display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Store-assigned identifier (0 before insertion)
    pub id: i64,
    /// Start of the appointment
    pub start: NaiveDateTime,
    /// End of the appointment (never before `start`)
    pub end: NaiveDateTime,
    /// Non-empty title
    pub title: String,
    /// Free text, possibly empty
    pub description: String,
    /// Associated tags in insertion order
    pub tags: Vec<Tag>,
}

impl Appointment {
    /// Create an appointment that has not been stored yet.
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        title: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<Tag>,
    ) -> Self {
        Self {
            id: 0,
            start,
            end,
            title: title.into(),
            description: description.into(),
            tags,
        }
    }

    /// Check the invariants the store relies on.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidAppointment(
                "title must not be empty".to_string(),
            ));
        }
        if self.start > self.end {
            return Err(Error::InvalidAppointment(format!(
                "appointment can not end ({}) before it starts ({})",
                self.end, self.start
            )));
        }
        Ok(())
    }

    /// Display color: the first tag's color, or the neutral default.
    pub fn display_color(&self) -> Color {
        self.tags.first().map(|t| t.color).unwrap_or_default()
    }

    /// Whether the appointment's calendar-date span includes `day`.
    ///
    /// Time of day is ignored: an appointment from 23:00 to 01:00 the next
    /// morning covers both dates.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start.date() <= day && day <= self.end.date()
    }

    /// Whether the appointment starts and ends on the same calendar date.
    pub fn is_single_day(&self) -> bool {
        self.start.date() == self.end.date()
    }

    /// Whether `now` falls inside the appointment (`start <= now < end`).
    pub fn is_running(&self, now: NaiveDateTime) -> bool {
        self.start <= now && now < self.end
    }

    /// Whether the appointment is still relevant at `now` (future or running).
    pub fn is_upcoming(&self, now: NaiveDateTime) -> bool {
        self.start > now || self.is_running(now)
    }
}

// ============================================
// Export
// ============================================

/// Pretty-printed JSON array of appointments, tags included.
pub fn appointments_to_json(appointments: &[Appointment]) -> Result<String> {
    Ok(serde_json::to_string_pretty(appointments)?)
}
