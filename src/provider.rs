//! Sources of appointment data.
//!
//! The calendar never fetches anything itself; callers pull a validated
//! list from a provider and hand the slice to the aggregation functions.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{DashboardError, Result};
use crate::ingest::ingest_records;
use crate::models::{Appointment, AppointmentRecord};

/// Data-access boundary for appointments.
pub trait AppointmentProvider {
    /// Fetch all appointments visible to the caller.
    fn appointments(&self) -> Result<Vec<Appointment>>;
}

/// Fixed, already validated appointments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    appointments: Vec<Appointment>,
}

impl InMemoryProvider {
    pub fn new(appointments: Vec<Appointment>) -> Self {
        InMemoryProvider { appointments }
    }
}

impl AppointmentProvider for InMemoryProvider {
    fn appointments(&self) -> Result<Vec<Appointment>> {
        Ok(self.appointments.clone())
    }
}

/// Appointments read from a JSON array of records.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
    strict: bool,
}

impl JsonFileProvider {
    /// Lenient provider: invalid records are logged and skipped.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileProvider {
            path: path.into(),
            strict: false,
        }
    }

    /// Fail the whole load when any record is invalid.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AppointmentProvider for JsonFileProvider {
    fn appointments(&self) -> Result<Vec<Appointment>> {
        let contents = fs::read_to_string(&self.path)?;
        let records: Vec<AppointmentRecord> = serde_json::from_str(&contents)?;
        debug!("Read {} records from {}", records.len(), self.path.display());

        let mut report = ingest_records(records);
        if !report.is_clean() {
            if self.strict {
                let first = report.rejected.remove(0);
                return Err(DashboardError::Validation(first.error));
            }
            warn!(
                "Skipped {} invalid records in {}",
                report.rejected.len(),
                self.path.display()
            );
        }

        Ok(report.accepted)
    }
}

/// Write appointments as a JSON array of records.
pub fn write_records(path: &Path, appointments: &[Appointment]) -> Result<()> {
    let records: Vec<AppointmentRecord> =
        appointments.iter().map(AppointmentRecord::from).collect();
    fs::write(path, serde_json::to_vec_pretty(&records)?)?;
    Ok(())
}
