//! Calendar aggregation for the appointment screens.
//!
//! Everything here is a read-only projection: the caller owns the
//! appointment slice, and the views hand back references into it. Nothing is
//! cached between calls.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use tracing::debug;

use crate::error::ValidationError;
use crate::models::{Appointment, AppointmentStatus, StatusFilter};

/// Number of days in a Monday-start week window.
pub const WEEK_DAYS: usize = 7;

/// Ordered boundaries of the hourly grid rows.
///
/// Row `i` covers the half-open range `[boundaries[i], boundaries[i + 1])`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourSlots {
    boundaries: Vec<NaiveTime>,
}

impl HourSlots {
    /// Build slots from explicit boundaries.
    pub fn new(boundaries: Vec<NaiveTime>) -> Result<Self, ValidationError> {
        if boundaries.len() < 2 {
            return Err(ValidationError::TooFewSlots(boundaries.len()));
        }
        for pair in boundaries.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ValidationError::UnorderedSlots {
                    previous: pair[0].format("%H:%M").to_string(),
                    next: pair[1].format("%H:%M").to_string(),
                });
            }
        }

        Ok(HourSlots { boundaries })
    }

    /// Whole-hour boundaries `start_hour:00 ..= end_hour:00`.
    ///
    /// `end_hour` may be 24, in which case the last row runs to midnight and
    /// is represented by 23:59:59.999.
    pub fn hourly(start_hour: u32, end_hour: u32) -> Result<Self, ValidationError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(ValidationError::InvalidHourRange {
                start: start_hour,
                end: end_hour,
            });
        }

        let boundaries = (start_hour..=end_hour)
            .map(|hour| {
                if hour == 24 {
                    NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
                } else {
                    NaiveTime::from_hms_opt(hour, 0, 0)
                }
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(ValidationError::InvalidHourRange {
                start: start_hour,
                end: end_hour,
            })?;

        HourSlots::new(boundaries)
    }

    pub fn boundaries(&self) -> &[NaiveTime] {
        &self.boundaries
    }

    /// First boundary of the grid.
    pub fn first(&self) -> NaiveTime {
        self.boundaries[0]
    }

    /// Last boundary of the grid (exclusive).
    pub fn last(&self) -> NaiveTime {
        self.boundaries[self.boundaries.len() - 1]
    }

    /// Number of grid rows; at least one by construction.
    pub fn row_count(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Check if a start time falls inside the grid range.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.first() <= time && time < self.last()
    }

    /// Index of the row containing `time`, if any.
    pub fn slot_index(&self, time: NaiveTime) -> Option<usize> {
        if !self.contains(time) {
            return None;
        }
        // Boundaries are strictly ascending, so the row is the last boundary <= time.
        let upper = self.boundaries.partition_point(|boundary| *boundary <= time);
        Some(upper - 1)
    }
}

/// One grid row and the appointments that start inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct HourBucket<'a> {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub appointments: Vec<&'a Appointment>,
}

/// A date and its appointments, as shown in the list view.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    pub appointments: Vec<&'a Appointment>,
}

/// One column of the week grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DayColumn<'a> {
    pub date: NaiveDate,
    pub buckets: Vec<HourBucket<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekGrid<'a> {
    pub columns: Vec<DayColumn<'a>>,
}

impl<'a> WeekGrid<'a> {
    /// Dates of the grid columns, Monday first.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.columns.iter().map(|column| column.date).collect()
    }

    /// Total number of appointments placed on the grid.
    pub fn placed_count(&self) -> usize {
        self.columns
            .iter()
            .flat_map(|column| column.buckets.iter())
            .map(|bucket| bucket.appointments.len())
            .sum()
    }
}

/// A single day's grid plus the appointments that fall outside its hours.
#[derive(Debug, Clone, PartialEq)]
pub struct DayView<'a> {
    pub date: NaiveDate,
    pub buckets: Vec<HourBucket<'a>>,
    pub outside_hours: Vec<&'a Appointment>,
}

/// Monday-start week containing `reference`.
///
/// Sunday counts as the seventh day of the week that began six days earlier.
pub fn week_window(reference: NaiveDate) -> [NaiveDate; WEEK_DAYS] {
    let back = reference.weekday().number_from_monday() as i64 - 1;
    let monday = reference - Duration::days(back);

    let mut dates = [monday; WEEK_DAYS];
    for (offset, date) in dates.iter_mut().enumerate() {
        *date = monday + Duration::days(offset as i64);
    }
    dates
}

/// Sort by start time, keeping input order for ties.
fn sort_by_start(appointments: &mut [&Appointment]) {
    appointments.sort_by_key(|appointment| appointment.start_time);
}

/// Bucket one date's appointments into the hourly grid rows.
///
/// A bucket is emitted for every row, empty or not. Appointments that start
/// outside `[slots.first(), slots.last())` are left out.
pub fn bucket_by_hour<'a>(
    appointments: &'a [Appointment],
    date: NaiveDate,
    slots: &HourSlots,
) -> Vec<HourBucket<'a>> {
    bucket_filtered(appointments, date, slots, StatusFilter::All)
}

fn bucket_filtered<'a>(
    appointments: &'a [Appointment],
    date: NaiveDate,
    slots: &HourSlots,
    filter: StatusFilter,
) -> Vec<HourBucket<'a>> {
    let mut buckets: Vec<HourBucket<'a>> = slots
        .boundaries()
        .windows(2)
        .map(|pair| HourBucket {
            start: pair[0],
            end: pair[1],
            appointments: Vec::new(),
        })
        .collect();

    let mut skipped = 0usize;
    for appointment in appointments
        .iter()
        .filter(|a| a.date == date && filter.matches(a.status))
    {
        match slots.slot_index(appointment.start_time) {
            Some(index) => buckets[index].appointments.push(appointment),
            None => skipped += 1,
        }
    }

    for bucket in &mut buckets {
        sort_by_start(&mut bucket.appointments);
    }

    debug!(
        "Bucketed {} on {} into {} rows ({} outside grid hours)",
        buckets.iter().map(|b| b.appointments.len()).sum::<usize>(),
        date,
        slots.row_count(),
        skipped
    );

    buckets
}

/// Group the appointments on `week_dates` by day for the list view.
///
/// Days without a matching appointment are dropped; groups come out in
/// ascending date order whatever order `week_dates` is given in.
pub fn list_by_week<'a>(
    appointments: &'a [Appointment],
    week_dates: &[NaiveDate],
    filter: StatusFilter,
) -> Vec<DayGroup<'a>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&'a Appointment>> = BTreeMap::new();

    for appointment in appointments
        .iter()
        .filter(|a| week_dates.contains(&a.date) && filter.matches(a.status))
    {
        groups.entry(appointment.date).or_default().push(appointment);
    }

    groups
        .into_iter()
        .map(|(date, mut appointments)| {
            sort_by_start(&mut appointments);
            DayGroup { date, appointments }
        })
        .collect()
}

/// Full week grid for the week containing `reference`.
pub fn week_grid<'a>(
    appointments: &'a [Appointment],
    reference: NaiveDate,
    slots: &HourSlots,
    filter: StatusFilter,
) -> WeekGrid<'a> {
    let columns = week_window(reference)
        .into_iter()
        .map(|date| DayColumn {
            date,
            buckets: bucket_filtered(appointments, date, slots, filter),
        })
        .collect();

    WeekGrid { columns }
}

/// Single day grid, with out-of-hours appointments listed separately.
pub fn day_view<'a>(
    appointments: &'a [Appointment],
    date: NaiveDate,
    slots: &HourSlots,
    filter: StatusFilter,
) -> DayView<'a> {
    let buckets = bucket_filtered(appointments, date, slots, filter);
    let mut outside_hours: Vec<&'a Appointment> = appointments
        .iter()
        .filter(|a| a.date == date && filter.matches(a.status))
        .filter(|a| !slots.contains(a.start_time))
        .collect();
    sort_by_start(&mut outside_hours);

    DayView {
        date,
        buckets,
        outside_hours,
    }
}

/// Per-status totals over the given dates, in status declaration order.
pub fn status_counts(
    appointments: &[Appointment],
    dates: &[NaiveDate],
) -> Vec<(AppointmentStatus, usize)> {
    AppointmentStatus::ALL
        .iter()
        .map(|status| {
            let count = appointments
                .iter()
                .filter(|a| a.status == *status && dates.contains(&a.date))
                .count();
            (*status, count)
        })
        .collect()
}
