//! Database layer for almanac
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository operations for appointments and tags

pub mod repo;
pub mod schema;

pub use repo::{AppointmentFilter, Database};
