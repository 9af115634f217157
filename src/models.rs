//! Data models for the dashboard.
//!
//! This module defines the core data structures used throughout the system:
//! - AppointmentStatus: the closed lifecycle vocabulary shown on every screen
//! - StatusFilter: "all" or a single status, as picked in the list view
//! - Patient: display-only patient details
//! - Appointment: a validated appointment ready for aggregation
//! - AppointmentRecord: the raw serde shape appointments arrive in

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lifecycle stage of an appointment.
///
/// Transitions are driven by whoever owns the appointment; nothing in this
/// crate enforces an order between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[serde(rename = "Pending Confirmation")]
    PendingConfirmation,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::PendingConfirmation,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    /// Convert a string to a status, ignoring case and separators.
    pub fn from_string(value: &str) -> Result<Self, ValidationError> {
        let normalized: String = value
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '_' || c == '-' { ' ' } else { c })
            .collect();

        match normalized.as_str() {
            "pending" | "pending confirmation" => Ok(AppointmentStatus::PendingConfirmation),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            _ => Err(ValidationError::UnknownStatus(value.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AppointmentStatus::PendingConfirmation => "Pending Confirmation",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

/// Status selection used by the list and grid views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(AppointmentStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: AppointmentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            AppointmentStatus::from_string(s).map(StatusFilter::Only)
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => write!(f, "{}", status),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Patient details shown on an appointment card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
}

impl Patient {
    /// Create a new patient with validation.
    pub fn new(name: String, age: u32, gender: Gender) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "Patient name",
            });
        }

        Ok(Patient { name, age, gender })
    }
}

/// A validated appointment.
///
/// `start_time < end_time` holds for every value built through
/// [`Appointment::new`] or converted from an [`AppointmentRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub patient: Patient,
    pub doctor_name: String,
    pub status: AppointmentStatus,
}

impl Appointment {
    /// Create a new appointment with validation.
    pub fn new(
        id: String,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        patient: Patient,
        doctor_name: String,
        status: AppointmentStatus,
    ) -> Result<Self, ValidationError> {
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "Appointment id",
            });
        }
        if doctor_name.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "Doctor name",
            });
        }
        if end_time <= start_time {
            return Err(ValidationError::InvertedTimeRange {
                start: start_time.format("%H:%M").to_string(),
                end: end_time.format("%H:%M").to_string(),
            });
        }

        Ok(Appointment {
            id,
            date,
            start_time,
            end_time,
            patient,
            doctor_name,
            status,
        })
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Check if this appointment overlaps with another on the same day.
    pub fn overlaps_with(&self, other: &Appointment) -> bool {
        self.date == other.date
            && self.start_time < other.end_time
            && self.end_time > other.start_time
    }
}

/// Raw appointment as exchanged in JSON files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    pub id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub patient_name: String,
    pub age: u32,
    pub gender: Gender,
    pub doctor_name: String,
    pub status: AppointmentStatus,
}

impl TryFrom<AppointmentRecord> for Appointment {
    type Error = ValidationError;

    fn try_from(record: AppointmentRecord) -> Result<Self, Self::Error> {
        let patient = Patient::new(record.patient_name, record.age, record.gender)?;
        Appointment::new(
            record.id,
            record.date,
            record.start_time,
            record.end_time,
            patient,
            record.doctor_name,
            record.status,
        )
    }
}

impl From<&Appointment> for AppointmentRecord {
    fn from(appointment: &Appointment) -> Self {
        AppointmentRecord {
            id: appointment.id.clone(),
            date: appointment.date,
            start_time: appointment.start_time,
            end_time: appointment.end_time,
            patient_name: appointment.patient.name.clone(),
            age: appointment.patient.age,
            gender: appointment.patient.gender,
            doctor_name: appointment.doctor_name.clone(),
            status: appointment.status,
        }
    }
}

/// Time-of-day as `HH:MM` (seconds accepted on input).
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveTime, String> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| format!("invalid time of day '{}', expected HH:MM", raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn patient() -> Patient {
        Patient::new("Ayesha Khan".to_string(), 34, Gender::Female).unwrap()
    }

    #[test]
    fn status_parses_loose_spellings() {
        assert_eq!(
            AppointmentStatus::from_string("pending_confirmation").unwrap(),
            AppointmentStatus::PendingConfirmation
        );
        assert_eq!(
            AppointmentStatus::from_string(" Confirmed ").unwrap(),
            AppointmentStatus::Confirmed
        );
        assert!(AppointmentStatus::from_string("rescheduled").is_err());
    }

    #[test]
    fn status_serializes_as_display_text() {
        let json = serde_json::to_string(&AppointmentStatus::PendingConfirmation).unwrap();
        assert_eq!(json, "\"Pending Confirmation\"");
    }

    #[test]
    fn filter_parses_all_and_single_status() {
        assert_eq!("ALL".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "cancelled".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(AppointmentStatus::Cancelled)
        );
    }

    #[test]
    fn rejects_inverted_time_range() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let result = Appointment::new(
            "1".to_string(),
            date,
            time(10, 0),
            time(10, 0),
            patient(),
            "Dr. Sara Malik".to_string(),
            AppointmentStatus::Confirmed,
        );
        assert!(matches!(result, Err(ValidationError::InvertedTimeRange { .. })));
    }

    #[test]
    fn record_parses_short_times() {
        let json = r#"{
            "id": "7",
            "date": "2026-01-22",
            "startTime": "09:00",
            "endTime": "09:30:00",
            "patientName": "Bilal Ahmed",
            "age": 41,
            "gender": "Male",
            "doctorName": "Dr. Sara Malik",
            "status": "Confirmed"
        }"#;
        let record: AppointmentRecord = serde_json::from_str(json).unwrap();
        let appointment = Appointment::try_from(record).unwrap();
        assert_eq!(appointment.start_time, time(9, 0));
        assert_eq!(appointment.duration_minutes(), 30);
    }

    #[test]
    fn overlap_requires_same_day() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let a = Appointment::new(
            "a".to_string(),
            day,
            time(9, 0),
            time(10, 0),
            patient(),
            "Dr. Sara Malik".to_string(),
            AppointmentStatus::Confirmed,
        )
        .unwrap();
        let mut b = a.clone();
        b.id = "b".to_string();
        b.start_time = time(9, 30);
        assert!(a.overlaps_with(&b));

        b.date = day.succ_opt().unwrap();
        assert!(!a.overlaps_with(&b));
    }
}
