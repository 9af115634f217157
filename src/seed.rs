//! Demo data used when no appointment file is given.

use chrono::{NaiveDate, NaiveTime};

use crate::ingest::ingest_records;
use crate::models::{Appointment, AppointmentRecord, AppointmentStatus, Gender};

type Row = (
    &'static str,
    (i32, u32, u32),
    (u32, u32),
    (u32, u32),
    &'static str,
    u32,
    Gender,
    &'static str,
    AppointmentStatus,
);

#[rustfmt::skip]
const ROWS: &[Row] = &[
    ("1", (2026, 1, 20), (9, 0), (9, 30), "Ayesha Khan", 34, Gender::Female, "Dr. Sara Malik", AppointmentStatus::Completed),
    ("2", (2026, 1, 20), (11, 15), (11, 45), "Bilal Ahmed", 41, Gender::Male, "Dr. Omar Farooq", AppointmentStatus::Completed),
    ("3", (2026, 1, 21), (9, 30), (10, 0), "Fatima Noor", 27, Gender::Female, "Dr. Sara Malik", AppointmentStatus::Confirmed),
    ("4", (2026, 1, 21), (10, 30), (11, 0), "Hamza Iqbal", 52, Gender::Male, "Dr. Omar Farooq", AppointmentStatus::Cancelled),
    ("5", (2026, 1, 21), (14, 0), (14, 45), "Zara Sheikh", 29, Gender::Female, "Dr. Sara Malik", AppointmentStatus::PendingConfirmation),
    ("6", (2026, 1, 22), (9, 0), (9, 30), "Usman Tariq", 60, Gender::Male, "Dr. Omar Farooq", AppointmentStatus::Confirmed),
    ("7", (2026, 1, 22), (9, 0), (9, 20), "Mariam Yousaf", 8, Gender::Female, "Dr. Hina Raza", AppointmentStatus::Confirmed),
    ("8", (2026, 1, 23), (16, 30), (17, 15), "Ali Hassan", 45, Gender::Male, "Dr. Hina Raza", AppointmentStatus::PendingConfirmation),
    ("9", (2026, 1, 23), (18, 30), (19, 0), "Sana Javed", 38, Gender::Female, "Dr. Sara Malik", AppointmentStatus::Confirmed),
    ("10", (2026, 1, 24), (10, 0), (10, 30), "Kamran Aslam", 66, Gender::Male, "Dr. Omar Farooq", AppointmentStatus::PendingConfirmation),
    ("11", (2026, 1, 26), (8, 30), (9, 0), "Noor Fatima", 31, Gender::Female, "Dr. Hina Raza", AppointmentStatus::Confirmed),
];

fn to_record(row: &Row) -> Option<AppointmentRecord> {
    let (id, (y, m, d), (sh, sm), (eh, em), patient, age, gender, doctor, status) = *row;
    Some(AppointmentRecord {
        id: id.to_string(),
        date: NaiveDate::from_ymd_opt(y, m, d)?,
        start_time: NaiveTime::from_hms_opt(sh, sm, 0)?,
        end_time: NaiveTime::from_hms_opt(eh, em, 0)?,
        patient_name: patient.to_string(),
        age,
        gender,
        doctor_name: doctor.to_string(),
        status,
    })
}

/// The demo week of 2026-01-19, plus one appointment in the following week.
pub fn demo_appointments() -> Vec<Appointment> {
    ingest_records(ROWS.iter().filter_map(to_record)).accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_demo_row_is_valid() {
        assert_eq!(demo_appointments().len(), ROWS.len());
    }
}
