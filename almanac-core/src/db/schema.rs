//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: Appointments and tags
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        name             TEXT NOT NULL UNIQUE,
        color            TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS appointments (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        start_at         DATETIME NOT NULL,
        end_at           DATETIME NOT NULL,
        title            TEXT NOT NULL,
        description      TEXT NOT NULL DEFAULT '',

        CHECK (start_at <= end_at)
    );

    -- Ordered tag list per appointment; position 0 decides the display color
    CREATE TABLE IF NOT EXISTS appointment_tags (
        appointment_id   INTEGER NOT NULL REFERENCES appointments(id) ON DELETE CASCADE,
        tag_id           INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        position         INTEGER NOT NULL,

        PRIMARY KEY (appointment_id, tag_id)
    );
    "#,
    // Version 2: Indexes for range and tag lookups
    r#"
    CREATE INDEX IF NOT EXISTS idx_appointments_start ON appointments(start_at);
    CREATE INDEX IF NOT EXISTS idx_appointments_end ON appointments(end_at);
    CREATE INDEX IF NOT EXISTS idx_appointment_tags_tag ON appointment_tags(tag_id);
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
