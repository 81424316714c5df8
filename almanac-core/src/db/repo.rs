//! Database repository layer
//!
//! Provides query and write operations for appointments and tags.
//! Date-times are stored as ISO-8601 text (`YYYY-MM-DDTHH:MM:SS`), which keeps
//! lexicographic and chronological order identical for range queries.

use crate::error::{Error, Result};
use crate::types::*;
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Storage format for date-time columns
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn parse_datetime(column: usize, value: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

/// Filter options for listing appointments.
///
/// All set fields must match. `from`/`to` select appointments that overlap
/// the window, not only those that start inside it.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    /// Appointment ends at or after this instant
    pub from: Option<NaiveDateTime>,
    /// Appointment starts at or before this instant
    pub to: Option<NaiveDateTime>,
    /// Appointment ends strictly after this instant (not over yet)
    pub ending_after: Option<NaiveDateTime>,
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Name of a tag the appointment carries
    pub tag: Option<String>,
    /// Maximum number of results
    pub limit: Option<usize>,
}

/// Database handle with connection pooling (single connection for now)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        tracing::debug!(path = %path.display(), "Opened database");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock();
        super::schema::run_migrations(&conn)
    }

    /// A panic while holding the lock cannot leave SQLite mid-statement, so a
    /// poisoned mutex still guards a usable connection.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ============================================
    // Tag operations
    // ============================================

    /// Insert a new tag, returning its id
    ///
    /// Fails with [`Error::DuplicateTag`] when the name is taken.
    pub fn insert_tag(&self, tag: &Tag) -> Result<i64> {
        let conn = self.lock();
        if Self::find_tag(&conn, &tag.name)?.is_some() {
            return Err(Error::DuplicateTag(tag.name.clone()));
        }

        conn.execute(
            "INSERT INTO tags (name, color) VALUES (?1, ?2)",
            params![tag.name, tag.color.as_str()],
        )?;
        let id = conn.last_insert_rowid();

        tracing::debug!(id, name = %tag.name, color = %tag.color, "Inserted tag");
        Ok(id)
    }

    /// Insert a tag or overwrite the color of the existing tag with that name
    pub fn upsert_tag(&self, tag: &Tag) -> Result<i64> {
        let conn = self.lock();
        conn.execute(
            r#"
            INSERT INTO tags (name, color) VALUES (?1, ?2)
            ON CONFLICT(name) DO UPDATE SET color = excluded.color
            "#,
            params![tag.name, tag.color.as_str()],
        )?;

        let id = conn.query_row("SELECT id FROM tags WHERE name = ?", [&tag.name], |r| {
            r.get(0)
        })?;
        Ok(id)
    }

    /// Replace the tag called `name` with `tag` (rename and/or recolor)
    pub fn update_tag(&self, name: &str, tag: &Tag) -> Result<()> {
        let conn = self.lock();
        if tag.name != name && Self::find_tag(&conn, &tag.name)?.is_some() {
            return Err(Error::DuplicateTag(tag.name.clone()));
        }

        let changed = conn.execute(
            "UPDATE tags SET name = ?1, color = ?2 WHERE name = ?3",
            params![tag.name, tag.color.as_str(), name],
        )?;
        if changed == 0 {
            return Err(Error::TagNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Get a tag by its exact (case-sensitive) name
    pub fn get_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let conn = self.lock();
        Self::find_tag(&conn, name).map_err(Error::from)
    }

    /// All tags, ordered by name
    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, name, color FROM tags ORDER BY name")?;
        let tags = stmt
            .query_map([], Self::row_to_tag)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Delete a tag; appointments carrying it lose the tag
    pub fn remove_tag(&self, name: &str) -> Result<()> {
        let conn = self.lock();
        let changed = conn.execute("DELETE FROM tags WHERE name = ?", [name])?;
        if changed == 0 {
            return Err(Error::TagNotFound(name.to_string()));
        }
        tracing::debug!(name, "Removed tag");
        Ok(())
    }

    fn find_tag(conn: &Connection, name: &str) -> rusqlite::Result<Option<Tag>> {
        conn.query_row(
            "SELECT id, name, color FROM tags WHERE name = ?",
            [name],
            Self::row_to_tag,
        )
        .optional()
    }

    fn row_to_tag(row: &Row) -> rusqlite::Result<Tag> {
        let color: String = row.get("color")?;
        Ok(Tag {
            id: row.get("id")?,
            name: row.get("name")?,
            color: Color::from_name_lossy(&color),
        })
    }

    // ============================================
    // Appointment operations
    // ============================================

    /// Insert a new appointment, returning its id
    ///
    /// Tags are resolved by name and must already exist.
    pub fn insert_appointment(&self, appointment: &Appointment) -> Result<i64> {
        appointment.validate()?;

        let mut conn = self.lock();
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO appointments (start_at, end_at, title, description)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                format_datetime(&appointment.start),
                format_datetime(&appointment.end),
                appointment.title,
                appointment.description,
            ],
        )?;
        let id = tx.last_insert_rowid();
        Self::write_tags(&tx, id, &appointment.tags)?;
        tx.commit()?;

        tracing::debug!(id, title = %appointment.title, "Inserted appointment");
        Ok(id)
    }

    /// Overwrite the stored appointment with the same id
    pub fn update_appointment(&self, appointment: &Appointment) -> Result<()> {
        appointment.validate()?;

        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let changed = tx.execute(
            r#"
            UPDATE appointments
            SET start_at = ?1, end_at = ?2, title = ?3, description = ?4
            WHERE id = ?5
            "#,
            params![
                format_datetime(&appointment.start),
                format_datetime(&appointment.end),
                appointment.title,
                appointment.description,
                appointment.id,
            ],
        )?;
        if changed == 0 {
            return Err(Error::AppointmentNotFound(appointment.id));
        }

        tx.execute(
            "DELETE FROM appointment_tags WHERE appointment_id = ?",
            [appointment.id],
        )?;
        Self::write_tags(&tx, appointment.id, &appointment.tags)?;
        tx.commit()?;

        tracing::debug!(id = appointment.id, "Updated appointment");
        Ok(())
    }

    /// Delete an appointment by id
    pub fn remove_appointment(&self, id: i64) -> Result<()> {
        let conn = self.lock();
        let changed = conn.execute("DELETE FROM appointments WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(Error::AppointmentNotFound(id));
        }
        tracing::debug!(id, "Removed appointment");
        Ok(())
    }

    /// Get an appointment (with its tags) by id
    pub fn get_appointment(&self, id: i64) -> Result<Option<Appointment>> {
        let conn = self.lock();
        let appointment = conn
            .query_row(
                "SELECT * FROM appointments WHERE id = ?",
                [id],
                Self::row_to_appointment,
            )
            .optional()?;

        match appointment {
            Some(mut appointment) => {
                appointment.tags = Self::read_tags(&conn, appointment.id)?;
                Ok(Some(appointment))
            }
            None => Ok(None),
        }
    }

    /// List appointments with optional filtering, ordered by start
    pub fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>> {
        let conn = self.lock();

        let mut sql = String::from("SELECT * FROM appointments WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(from) = &filter.from {
            sql.push_str(" AND end_at >= ?");
            params.push(Box::new(format_datetime(from)));
        }

        if let Some(to) = &filter.to {
            sql.push_str(" AND start_at <= ?");
            params.push(Box::new(format_datetime(to)));
        }

        if let Some(after) = &filter.ending_after {
            sql.push_str(" AND end_at > ?");
            params.push(Box::new(format_datetime(after)));
        }

        if let Some(title) = &filter.title {
            sql.push_str(" AND instr(lower(title), lower(?)) > 0");
            params.push(Box::new(title.clone()));
        }

        if let Some(tag) = &filter.tag {
            sql.push_str(
                r#" AND EXISTS (
                    SELECT 1 FROM appointment_tags at
                    JOIN tags t ON t.id = at.tag_id
                    WHERE at.appointment_id = appointments.id AND t.name = ?
                )"#,
            );
            params.push(Box::new(tag.clone()));
        }

        sql.push_str(" ORDER BY start_at, id");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let mut appointments = stmt
            .query_map(params_refs.as_slice(), Self::row_to_appointment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for appointment in &mut appointments {
            appointment.tags = Self::read_tags(&conn, appointment.id)?;
        }

        tracing::debug!(count = appointments.len(), ?filter, "Listed appointments");
        Ok(appointments)
    }

    /// Appointments overlapping `[from, to]`, by calendar span
    pub fn appointments_in_range(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Appointment>> {
        self.list_appointments(&AppointmentFilter {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        })
    }

    /// Appointments whose title contains `title` (case-insensitive)
    pub fn appointments_by_title(&self, title: &str) -> Result<Vec<Appointment>> {
        self.list_appointments(&AppointmentFilter {
            title: Some(title.to_string()),
            ..Default::default()
        })
    }

    /// Appointments carrying the tag called `name`
    pub fn appointments_by_tag(&self, name: &str) -> Result<Vec<Appointment>> {
        self.require_tag(name)?;
        self.list_appointments(&AppointmentFilter {
            tag: Some(name.to_string()),
            ..Default::default()
        })
    }

    /// The next `limit` appointments that have not ended at `now`
    ///
    /// Running appointments are included. With `tag`, only appointments
    /// carrying that tag are considered.
    pub fn upcoming_appointments(
        &self,
        now: NaiveDateTime,
        limit: usize,
        tag: Option<&str>,
    ) -> Result<Vec<Appointment>> {
        if let Some(name) = tag {
            self.require_tag(name)?;
        }
        self.list_appointments(&AppointmentFilter {
            ending_after: Some(now),
            tag: tag.map(str::to_string),
            limit: Some(limit),
            ..Default::default()
        })
    }

    fn require_tag(&self, name: &str) -> Result<Tag> {
        self.get_tag_by_name(name)?
            .ok_or_else(|| Error::TagNotFound(name.to_string()))
    }

    fn write_tags(conn: &Connection, appointment_id: i64, tags: &[Tag]) -> Result<()> {
        for (position, tag) in tags.iter().enumerate() {
            let stored =
                Self::find_tag(conn, &tag.name)?.ok_or_else(|| Error::TagNotFound(tag.name.clone()))?;
            conn.execute(
                r#"
                INSERT OR IGNORE INTO appointment_tags (appointment_id, tag_id, position)
                VALUES (?1, ?2, ?3)
                "#,
                params![appointment_id, stored.id, position as i64],
            )?;
        }
        Ok(())
    }

    fn read_tags(conn: &Connection, appointment_id: i64) -> rusqlite::Result<Vec<Tag>> {
        let mut stmt = conn.prepare_cached(
            r#"
            SELECT t.id, t.name, t.color
            FROM appointment_tags at
            JOIN tags t ON t.id = at.tag_id
            WHERE at.appointment_id = ?
            ORDER BY at.position
            "#,
        )?;
        let tags = stmt
            .query_map([appointment_id], Self::row_to_tag)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn row_to_appointment(row: &Row) -> rusqlite::Result<Appointment> {
        let start_str: String = row.get("start_at")?;
        let end_str: String = row.get("end_at")?;

        Ok(Appointment {
            id: row.get("id")?,
            start: parse_datetime(1, &start_str)?,
            end: parse_datetime(2, &end_str)?,
            title: row.get("title")?,
            description: row.get("description")?,
            tags: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn create_test_appointment(title: &str, start: &str, end: &str) -> Appointment {
        Appointment::new(dt(start), dt(end), title, "", vec![])
    }

    #[test]
    fn test_appointment_crud() {
        let db = test_db();
        db.insert_tag(&Tag::new("work", Color::Blue)).unwrap();
        db.insert_tag(&Tag::new("urgent", Color::Red)).unwrap();

        let mut appt = create_test_appointment("Standup", "2025-03-14 09:00", "2025-03-14 09:15");
        appt.description = "Daily sync".to_string();
        appt.tags = vec![Tag::new("work", Color::White), Tag::new("urgent", Color::White)];

        // Insert
        let id = db.insert_appointment(&appt).unwrap();

        // Read
        let stored = db.get_appointment(id).unwrap().unwrap();
        assert_eq!(stored.title, "Standup");
        assert_eq!(stored.start, appt.start);
        assert_eq!(stored.description, "Daily sync");
        let names: Vec<_> = stored.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["work", "urgent"]);
        // Colors come from the stored tags, not the caller's copies
        assert_eq!(stored.display_color(), Color::Blue);

        // Update: reorder tags and move
        let mut updated = stored.clone();
        updated.tags.reverse();
        updated.end = dt("2025-03-14 09:30");
        db.update_appointment(&updated).unwrap();

        let stored = db.get_appointment(id).unwrap().unwrap();
        assert_eq!(stored.end, dt("2025-03-14 09:30"));
        assert_eq!(stored.display_color(), Color::Red);

        // Delete
        db.remove_appointment(id).unwrap();
        assert!(db.get_appointment(id).unwrap().is_none());
        assert!(matches!(
            db.remove_appointment(id),
            Err(Error::AppointmentNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_appointment_is_rejected() {
        let db = test_db();
        let backwards = create_test_appointment("x", "2025-03-14 10:00", "2025-03-14 09:00");
        assert!(matches!(
            db.insert_appointment(&backwards),
            Err(Error::InvalidAppointment(_))
        ));

        let untitled = create_test_appointment("  ", "2025-03-14 09:00", "2025-03-14 10:00");
        assert!(matches!(
            db.insert_appointment(&untitled),
            Err(Error::InvalidAppointment(_))
        ));
    }

    #[test]
    fn test_unknown_tag_rolls_back_insert() {
        let db = test_db();
        let mut appt = create_test_appointment("x", "2025-03-14 09:00", "2025-03-14 10:00");
        appt.tags = vec![Tag::new("missing", Color::Red)];

        assert!(matches!(
            db.insert_appointment(&appt),
            Err(Error::TagNotFound(_))
        ));
        assert!(db
            .list_appointments(&AppointmentFilter::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_update_missing_appointment() {
        let db = test_db();
        let mut appt = create_test_appointment("x", "2025-03-14 09:00", "2025-03-14 10:00");
        appt.id = 42;
        assert!(matches!(
            db.update_appointment(&appt),
            Err(Error::AppointmentNotFound(42))
        ));
    }

    #[test]
    fn test_range_query_returns_overlapping() {
        let db = test_db();
        for (title, start, end) in [
            ("before", "2025-02-20 09:00", "2025-02-20 10:00"),
            ("spanning", "2025-02-27 09:00", "2025-03-02 10:00"),
            ("inside", "2025-03-10 09:00", "2025-03-10 10:00"),
            ("after", "2025-04-01 09:00", "2025-04-01 10:00"),
        ] {
            db.insert_appointment(&create_test_appointment(title, start, end))
                .unwrap();
        }

        let found = db
            .appointments_in_range(dt("2025-03-01 00:00"), dt("2025-03-31 23:59"))
            .unwrap();
        let titles: Vec<_> = found.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["spanning", "inside"]);
    }

    #[test]
    fn test_title_and_tag_queries() {
        let db = test_db();
        db.insert_tag(&Tag::new("health", Color::Green)).unwrap();

        let mut dentist = create_test_appointment("Dentist", "2025-03-10 09:00", "2025-03-10 10:00");
        dentist.tags = vec![Tag::new("health", Color::Green)];
        db.insert_appointment(&dentist).unwrap();
        db.insert_appointment(&create_test_appointment(
            "Team dinner",
            "2025-03-11 19:00",
            "2025-03-11 22:00",
        ))
        .unwrap();

        let by_title = db.appointments_by_title("DENT").unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Dentist");

        let by_tag = db.appointments_by_tag("health").unwrap();
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].tags[0].color, Color::Green);

        assert!(matches!(
            db.appointments_by_tag("Health"),
            Err(Error::TagNotFound(_))
        ));
    }

    #[test]
    fn test_upcoming_includes_running_and_respects_limit() {
        let db = test_db();
        for (title, start, end) in [
            ("ended", "2025-03-14 08:00", "2025-03-14 09:00"),
            ("running", "2025-03-14 09:30", "2025-03-14 11:00"),
            ("next", "2025-03-15 09:00", "2025-03-15 10:00"),
            ("later", "2025-03-16 09:00", "2025-03-16 10:00"),
        ] {
            db.insert_appointment(&create_test_appointment(title, start, end))
                .unwrap();
        }

        let upcoming = db
            .upcoming_appointments(dt("2025-03-14 10:00"), 2, None)
            .unwrap();
        let titles: Vec<_> = upcoming.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["running", "next"]);
    }

    #[test]
    fn test_tag_crud() {
        let db = test_db();
        let id = db.insert_tag(&Tag::new("work", Color::Blue)).unwrap();
        assert!(id > 0);

        assert!(matches!(
            db.insert_tag(&Tag::new("work", Color::Red)),
            Err(Error::DuplicateTag(_))
        ));

        // Upsert overwrites the color and keeps the id
        assert_eq!(db.upsert_tag(&Tag::new("work", Color::Red)).unwrap(), id);
        assert_eq!(
            db.get_tag_by_name("work").unwrap().unwrap().color,
            Color::Red
        );

        db.update_tag("work", &Tag::new("job", Color::Cyan)).unwrap();
        assert!(db.get_tag_by_name("work").unwrap().is_none());
        assert_eq!(db.get_tag_by_name("job").unwrap().unwrap().id, id);

        db.insert_tag(&Tag::new("home", Color::Green)).unwrap();
        assert!(matches!(
            db.update_tag("home", &Tag::new("job", Color::Green)),
            Err(Error::DuplicateTag(_))
        ));
        assert!(matches!(
            db.update_tag("nope", &Tag::new("nope", Color::Green)),
            Err(Error::TagNotFound(_))
        ));

        let names: Vec<_> = db.list_tags().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["home", "job"]);

        db.remove_tag("home").unwrap();
        assert!(matches!(db.remove_tag("home"), Err(Error::TagNotFound(_))));
    }

    #[test]
    fn test_removing_tag_detaches_it() {
        let db = test_db();
        db.insert_tag(&Tag::new("work", Color::Blue)).unwrap();
        let mut appt = create_test_appointment("x", "2025-03-14 09:00", "2025-03-14 10:00");
        appt.tags = vec![Tag::new("work", Color::Blue)];
        let id = db.insert_appointment(&appt).unwrap();

        db.remove_tag("work").unwrap();
        let stored = db.get_appointment(id).unwrap().unwrap();
        assert!(stored.tags.is_empty());
        assert_eq!(stored.display_color(), Color::White);
    }

    #[test]
    fn test_unknown_stored_color_falls_back() {
        let db = test_db();
        db.lock()
            .execute(
                "INSERT INTO tags (name, color) VALUES ('odd', 'magenta')",
                [],
            )
            .unwrap();
        let tag = db.get_tag_by_name("odd").unwrap().unwrap();
        assert_eq!(tag.color, Color::default());
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.db");

        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        assert!(path.exists());
    }
}
