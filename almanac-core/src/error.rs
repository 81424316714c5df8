//! Error types for almanac-core

use thiserror::Error;

/// Main error type for the almanac-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Appointment failed validation before a write
    #[error("invalid appointment: {0}")]
    InvalidAppointment(String),

    /// Appointment not found
    #[error("appointment not found: {0}")]
    AppointmentNotFound(i64),

    /// Tag not found
    #[error("tag not found: {0}")]
    TagNotFound(String),

    /// A tag with this name already exists
    #[error("tag already exists: {0}")]
    DuplicateTag(String),

    /// Calendar arithmetic or render request fault
    #[error("render error: {0}")]
    Render(String),
}

/// Result type alias for almanac-core
pub type Result<T> = std::result::Result<T, Error>;
