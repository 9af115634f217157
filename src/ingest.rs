//! Validation of raw appointment records before they reach the calendar.
//!
//! This module provides batch ingestion: each record is validated on its
//! own, failures are collected next to the accepted appointments, and one
//! bad row never sinks the rest of the batch.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::ValidationError;
use crate::models::{Appointment, AppointmentRecord};

/// A record that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestFailure {
    pub record_id: String,
    pub error: ValidationError,
}

/// Result of ingesting a batch of records.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub accepted: Vec<Appointment>,
    pub rejected: Vec<IngestFailure>,
    pub total_records: usize,
}

impl IngestReport {
    /// Calculate the acceptance rate as a percentage.
    pub fn acceptance_rate(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        (self.accepted.len() as f64 / self.total_records as f64) * 100.0
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Validate a batch of records in input order.
///
/// The first record with a given id wins; later records reusing it are
/// rejected as duplicates.
pub fn ingest_records<I>(records: I) -> IngestReport
where
    I: IntoIterator<Item = AppointmentRecord>,
{
    let mut report = IngestReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for record in records {
        report.total_records += 1;
        let record_id = record.id.clone();

        if seen.contains(&record_id) {
            warn!("Rejected appointment {}: duplicate id", record_id);
            report.rejected.push(IngestFailure {
                error: ValidationError::DuplicateId(record_id.clone()),
                record_id,
            });
            continue;
        }

        match Appointment::try_from(record) {
            Ok(appointment) => {
                seen.insert(record_id);
                report.accepted.push(appointment);
            }
            Err(error) => {
                warn!("Rejected appointment {}: {}", record_id, error);
                report.rejected.push(IngestFailure { record_id, error });
            }
        }
    }

    info!(
        "Ingested {} of {} appointment records ({:.1}%)",
        report.accepted.len(),
        report.total_records,
        report.acceptance_rate()
    );

    report
}
