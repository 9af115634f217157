use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};

use healthdesk::calendar::{bucket_by_hour, day_view, list_by_week, week_window, HourSlots};
use healthdesk::ingest::ingest_records;
use healthdesk::models::{
    Appointment, AppointmentRecord, AppointmentStatus, Gender, Patient, StatusFilter,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn appointment(
    id: &str,
    day: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    status: AppointmentStatus,
) -> Appointment {
    Appointment::new(
        id.to_string(),
        day,
        start,
        end,
        Patient::new(format!("Patient {}", id), 40, Gender::Female).unwrap(),
        "Dr. Hina Raza".to_string(),
        status,
    )
    .unwrap()
}

#[test]
fn week_window_holds_for_every_day_of_two_years() {
    let mut day = date(2025, 1, 1);
    while day <= date(2026, 12, 31) {
        let window = week_window(day);
        assert_eq!(window[0].weekday(), Weekday::Mon);
        for pair in window.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
        assert!(window.contains(&day));
        day = day.succ_opt().unwrap();
    }
}

#[test]
fn documented_week_examples() {
    let expected: Vec<NaiveDate> = (19..=25).map(|d| date(2026, 1, d)).collect();
    assert_eq!(week_window(date(2026, 1, 25)).to_vec(), expected);
    assert_eq!(week_window(date(2026, 1, 21)).to_vec(), expected);
}

#[test]
fn in_range_appointments_land_in_exactly_one_bucket() {
    let day = date(2026, 3, 2);
    let slots = HourSlots::hourly(8, 18).unwrap();
    let appointments: Vec<Appointment> = (0..40)
        .map(|i| {
            let start = time(6, 0) + Duration::minutes(i * 20);
            appointment(
                &i.to_string(),
                day,
                start,
                start + Duration::minutes(15),
                AppointmentStatus::Confirmed,
            )
        })
        .collect();

    let buckets = bucket_by_hour(&appointments, day, &slots);
    for appointment in &appointments {
        let hits = buckets
            .iter()
            .filter(|b| b.appointments.iter().any(|a| a.id == appointment.id))
            .count();
        let expected = usize::from(slots.contains(appointment.start_time));
        assert_eq!(hits, expected, "appointment {}", appointment.id);
    }
    for bucket in &buckets {
        for placed in &bucket.appointments {
            assert!(bucket.start <= placed.start_time && placed.start_time < bucket.end);
        }
    }
}

#[test]
fn out_of_range_appointments_stay_in_list_view() {
    let day = date(2026, 1, 20);
    let appointments = vec![
        appointment("early", day, time(7, 30), time(7, 45), AppointmentStatus::Confirmed),
        appointment("closing", day, time(18, 0), time(18, 30), AppointmentStatus::Confirmed),
    ];
    let slots = HourSlots::hourly(8, 18).unwrap();

    let placed: usize = bucket_by_hour(&appointments, day, &slots)
        .iter()
        .map(|b| b.appointments.len())
        .sum();
    assert_eq!(placed, 0);

    let groups = list_by_week(&appointments, &week_window(day), StatusFilter::All);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].appointments.len(), 2);

    let view = day_view(&appointments, day, &slots, StatusFilter::All);
    assert_eq!(view.outside_hours.len(), 2);
}

#[test]
fn equal_start_times_keep_input_order() {
    let day = date(2026, 1, 20);
    let appointments: Vec<Appointment> = ["c", "a", "b"]
        .iter()
        .map(|id| appointment(id, day, time(10, 0), time(10, 30), AppointmentStatus::Confirmed))
        .collect();

    let slots = HourSlots::hourly(8, 18).unwrap();
    let buckets = bucket_by_hour(&appointments, day, &slots);
    let ids: Vec<&str> = buckets[2].appointments.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);

    let groups = list_by_week(&appointments, &week_window(day), StatusFilter::All);
    let ids: Vec<&str> = groups[0].appointments.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[test]
fn status_filter_is_idempotent() {
    let week = week_window(date(2026, 1, 22));
    let appointments = healthdesk::seed::demo_appointments();

    let all = list_by_week(&appointments, &week, StatusFilter::All);
    let total: usize = all.iter().map(|g| g.appointments.len()).sum();
    let in_week = appointments.iter().filter(|a| week.contains(&a.date)).count();
    assert_eq!(total, in_week);

    let confirmed = StatusFilter::Only(AppointmentStatus::Confirmed);
    let once = list_by_week(&appointments, &week, confirmed);
    let once_owned: Vec<Appointment> = once
        .iter()
        .flat_map(|g| g.appointments.iter().map(|a| (*a).clone()))
        .collect();
    let twice = list_by_week(&once_owned, &week, confirmed);
    assert_eq!(once.len(), twice.len());
    for (a, b) in once.iter().zip(twice.iter()) {
        assert_eq!(a.date, b.date);
        assert_eq!(a.appointments, b.appointments);
    }
}

#[test]
fn list_never_returns_empty_groups() {
    let week = week_window(date(2026, 1, 22));
    let appointments = healthdesk::seed::demo_appointments();
    for status in AppointmentStatus::ALL {
        for group in list_by_week(&appointments, &week, StatusFilter::Only(status)) {
            assert!(!group.appointments.is_empty());
        }
    }
    assert!(list_by_week(&[], &week, StatusFilter::All).is_empty());
}

#[test]
fn end_to_end_scenario() {
    let appointments = vec![
        appointment("1", date(2026, 1, 20), time(9, 0), time(9, 30), AppointmentStatus::Completed),
        appointment(
            "4",
            date(2026, 1, 21),
            time(10, 30),
            time(11, 0),
            AppointmentStatus::Cancelled,
        ),
        appointment("6", date(2026, 1, 22), time(9, 0), time(9, 30), AppointmentStatus::Confirmed),
    ];

    let week = week_window(date(2026, 1, 22));
    assert_eq!(week[0], date(2026, 1, 19));
    assert_eq!(week[6], date(2026, 1, 25));

    let slots = HourSlots::new(vec![time(9, 0), time(10, 0)]).unwrap();
    let buckets = bucket_by_hour(&appointments, date(2026, 1, 22), &slots);
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].start, time(9, 0));
    assert_eq!(buckets[0].end, time(10, 0));
    assert_eq!(buckets[0].appointments.len(), 1);
    assert_eq!(buckets[0].appointments[0].id, "6");

    let groups = list_by_week(&appointments, &week, "all".parse().unwrap());
    let dates: Vec<NaiveDate> = groups.iter().map(|g| g.date).collect();
    assert_eq!(dates, vec![date(2026, 1, 20), date(2026, 1, 21), date(2026, 1, 22)]);
    assert!(groups.iter().all(|g| g.appointments.len() == 1));
}

#[test]
fn ingestion_guards_the_calendar() {
    let record = |id: &str, start: NaiveTime, end: NaiveTime| AppointmentRecord {
        id: id.to_string(),
        date: date(2026, 1, 20),
        start_time: start,
        end_time: end,
        patient_name: "Ali Hassan".to_string(),
        age: 45,
        gender: Gender::Male,
        doctor_name: "Dr. Hina Raza".to_string(),
        status: AppointmentStatus::PendingConfirmation,
    };

    let report = ingest_records(vec![
        record("1", time(9, 0), time(9, 30)),
        record("2", time(9, 30), time(9, 0)),
        record("1", time(11, 0), time(11, 30)),
    ]);
    assert_eq!(report.accepted.len(), 1);
    assert_eq!(report.rejected.len(), 2);
}
