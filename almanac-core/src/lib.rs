//! # almanac-core
//!
//! Core library for almanac - a text-console calendar.
//!
//! This library provides:
//! - Domain types for appointments and tags
//! - The calendar rendering engine (month grids, appointment overlay,
//!   upcoming-appointment panel)
//! - Database storage layer with SQLite
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Rendering is pure: [`render::render`] turns a [`RenderRequest`] (reference
//! date, appointments, month count, "now") into a text block with ANSI
//! escape sequences. The store and the clock live outside the renderer and
//! are supplied by the caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use almanac_core::{render, Config, Database, RenderRequest};
//!
//! let config = Config::load().expect("failed to load config");
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let now = chrono::Local::now().naive_local();
//! let appointments = db.upcoming_appointments(now, 10, None).expect("query failed");
//! let request = RenderRequest {
//!     reference: now.date(),
//!     appointments: &appointments,
//!     month_count: 1,
//!     now,
//! };
//! let text = render::render(&request, &config.display.render_policy()).expect("render failed");
//! println!("{}", text);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::{AppointmentFilter, Database};
pub use error::{Error, Result};
pub use render::{RenderPolicy, RenderRequest};
pub use types::*;

// Public modules
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod render;
pub mod types;
