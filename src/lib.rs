//! Appointment calendar aggregation and dashboard state for a multi-role
//! (admin, doctor, facility) healthcare platform.

pub mod availability;
pub mod calendar;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod notifications;
pub mod provider;
pub mod render;
pub mod seed;
pub mod store;
pub mod tickets;

pub use calendar::{bucket_by_hour, list_by_week, week_window, HourSlots};
pub use error::{DashboardError, Result, ValidationError};
pub use models::{Appointment, AppointmentStatus, StatusFilter};
