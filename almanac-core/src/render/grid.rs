//! Month grid construction.
//!
//! A [`MonthGrid`] is a rows x 7 matrix of [`DayCell`]s, Monday in column 0.
//! Cells are addressed by position so the overlay can restyle a day without
//! ever searching rendered text.

use chrono::{Datelike, NaiveDate};

use super::palette::{paint, Style};

/// Day-of-week header, one 3-cell column per weekday.
pub const WEEKDAY_HEADER: &str = "MO TU WE TH FR SA SU ";

/// Visible width of a single day cell.
pub const CELL_WIDTH: usize = 3;

/// Visible width of a full grid row.
pub const ROW_WIDTH: usize = CELL_WIDTH * 7;

/// One cell of the grid: a day number (or blank) plus an optional style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayCell {
    pub day: Option<u32>,
    pub style: Option<Style>,
}

impl DayCell {
    /// Render as exactly [`CELL_WIDTH`] visible characters.
    ///
    /// Padding stays outside the escape sequence, so a background style only
    /// highlights the digits.
    pub fn render(&self) -> String {
        match (self.day, self.style) {
            (None, _) => " ".repeat(CELL_WIDTH),
            (Some(day), None) => format!("{:>2} ", day),
            (Some(day), Some(style)) => {
                let digits = day.to_string();
                let lead = " ".repeat(2usize.saturating_sub(digits.len()));
                format!("{}{} ", lead, paint(style, &digits))
            }
        }
    }
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Number of days in the month containing `date`, leap-year aware.
pub fn days_in_month(date: NaiveDate) -> u32 {
    match date.month() {
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(date.year(), 2, 29).is_some() => 29,
        2 => 28,
        _ => 31,
    }
}

/// Leading blank cells before day 1 (Monday = 0 ... Sunday = 6).
pub fn day_offset(date: NaiveDate) -> u32 {
    first_of_month(date).weekday().number_from_monday() - 1
}

/// The day-of-week aligned grid for one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    first: NaiveDate,
    offset: u32,
    days: u32,
    rows: Vec<[DayCell; 7]>,
}

impl MonthGrid {
    /// Build the unstyled grid for the month containing `date`.
    pub fn build(date: NaiveDate) -> Self {
        let first = first_of_month(date);
        let offset = day_offset(first);
        let days = days_in_month(first);
        let row_count = ((offset + days + 6) / 7) as usize;

        let mut rows = vec![[DayCell::default(); 7]; row_count];
        for day in 1..=days {
            let index = (offset + day - 1) as usize;
            rows[index / 7][index % 7].day = Some(day);
        }

        Self {
            first,
            offset,
            days,
            rows,
        }
    }

    /// First day of the month this grid shows.
    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// Leading blank cells in the first row.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Number of days in the month.
    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn rows(&self) -> &[[DayCell; 7]] {
        &self.rows
    }

    /// Date of `day` in this month, if it exists.
    pub fn date_of(&self, day: u32) -> Option<NaiveDate> {
        self.first.with_day(day)
    }

    /// `(row, column)` of `day`, if it exists in this month.
    pub fn position_of(&self, day: u32) -> Option<(usize, usize)> {
        if day == 0 || day > self.days {
            return None;
        }
        let index = (self.offset + day - 1) as usize;
        Some((index / 7, index % 7))
    }

    /// Mutable access to the cell holding `day`.
    pub fn cell_mut(&mut self, day: u32) -> Option<&mut DayCell> {
        let (row, col) = self.position_of(day)?;
        Some(&mut self.rows[row][col])
    }

    /// One string per week, each [`ROW_WIDTH`] cells wide.
    pub fn render_lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.iter().map(DayCell::render).collect())
            .collect()
    }
}
