//! Error types for the dashboard back end.
//!
//! Validation problems are raised at ingestion time and never from inside
//! the calendar aggregator, which only ever sees validated appointments.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },

    #[error("End time {end} must be after start time {start}")]
    InvertedTimeRange { start: String, end: String },

    #[error(
        "Invalid status: '{0}'. \
         Must be one of: all, pending confirmation, confirmed, completed, cancelled"
    )]
    UnknownStatus(String),

    #[error("Hour slots need at least two boundaries, got {0}")]
    TooFewSlots(usize),

    #[error("Hour slot boundaries must be strictly ascending ({previous} then {next})")]
    UnorderedSlots { previous: String, next: String },

    #[error("Invalid hour range {start}..{end}")]
    InvalidHourRange { start: u32, end: u32 },

    #[error("Duplicate appointment id: {0}")]
    DuplicateId(String),

    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid store key: '{0}'")]
    InvalidKey(String),

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("Edit of '{0}' was not applied")]
    EditNotApplied(String),
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
