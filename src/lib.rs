//! CRM task/calendar-event scheduling.
//!
//! Links tasks to calendar events, keeps each task's derived schedule status
//! in step with its live events, and resolves polymorphic assignments. The
//! [`service::ScheduleService`] is the entry point; it runs over any
//! [`store::Store`], with [`db::Database`] as the SQLite implementation.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod format;
pub mod logging;
pub mod recurrence;
pub mod schedule;
pub mod service;
pub mod store;
pub mod types;
pub mod validate;
