//! Plain-text rendering of the calendar projections and dashboard lists.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::availability::Availability;
use crate::calendar::{DayGroup, DayView, HourBucket, WeekGrid};
use crate::models::{Appointment, AppointmentStatus};
use crate::notifications::Notification;
use crate::tickets::SupportTicket;

fn appointment_line(appointment: &Appointment) -> String {
    format!(
        "{} - {}  {} ({}, {}) with {} [{}]",
        appointment.start_time.format("%H:%M"),
        appointment.end_time.format("%H:%M"),
        appointment.patient.name,
        appointment.patient.age,
        appointment.patient.gender,
        appointment.doctor_name,
        appointment.status
    )
}

fn render_buckets(output: &mut String, buckets: &[HourBucket<'_>]) {
    for bucket in buckets {
        let _ = write!(output, "  {}", bucket.start.format("%H:%M"));
        if bucket.appointments.is_empty() {
            let _ = writeln!(output, "  -");
            continue;
        }
        let _ = writeln!(output);
        for appointment in &bucket.appointments {
            let _ = writeln!(output, "      {}", appointment_line(appointment));
        }
    }
}

pub fn week_grid(grid: &WeekGrid<'_>, counts: &[(AppointmentStatus, usize)]) -> String {
    let mut output = String::new();
    let dates = grid.dates();

    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        let _ = writeln!(output, "# Week of {} to {}", first, last);
    }
    let summary: Vec<String> = counts
        .iter()
        .map(|(status, count)| format!("{}: {}", status, count))
        .collect();
    let _ = writeln!(output, "{}", summary.join(" | "));

    for column in &grid.columns {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", column.date.format("%A, %Y-%m-%d"));
        render_buckets(&mut output, &column.buckets);
    }

    output
}

pub fn day_view(view: &DayView<'_>) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# {}", view.date.format("%A, %Y-%m-%d"));
    render_buckets(&mut output, &view.buckets);

    if !view.outside_hours.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Outside grid hours:");
        for appointment in &view.outside_hours {
            let _ = writeln!(output, "  {}", appointment_line(appointment));
        }
    }

    output
}

pub fn week_list(groups: &[DayGroup<'_>]) -> String {
    let mut output = String::new();

    if groups.is_empty() {
        let _ = writeln!(output, "No appointments for this week.");
        return output;
    }

    for group in groups {
        let _ = writeln!(output, "{}:", group.date.format("%A, %Y-%m-%d"));
        for appointment in &group.appointments {
            let _ = writeln!(output, "  {}", appointment_line(appointment));
            let _ = writeln!(output, "    ID: {}", appointment.id);
        }
    }

    output
}

pub fn tickets(tickets: &[SupportTicket]) -> String {
    let mut output = String::new();

    if tickets.is_empty() {
        let _ = writeln!(output, "No support tickets.");
        return output;
    }

    for ticket in tickets {
        let _ = writeln!(
            output,
            "[{:11}] {} ({:?}, {:?}) from {} on {}",
            ticket.status.name(),
            ticket.subject,
            ticket.priority,
            ticket.role,
            ticket.requester,
            ticket.created_at.format("%Y-%m-%d %H:%M")
        );
        let _ = writeln!(output, "    ID: {}", ticket.id);
        for reply in &ticket.replies {
            let _ = writeln!(output, "    > {}: {}", reply.author, reply.body);
        }
    }

    output
}

pub fn inbox(notifications: &[Notification], user: &str) -> String {
    let mut output = String::new();

    if notifications.is_empty() {
        let _ = writeln!(output, "No notifications.");
        return output;
    }

    for notification in notifications {
        let marker = if notification.is_read_by(user) { " " } else { "*" };
        let _ = writeln!(
            output,
            "{} {} - {} ({})",
            marker,
            notification.sent_at.format("%Y-%m-%d %H:%M"),
            notification.title,
            notification.body
        );
    }

    output
}

pub fn availability(doctor: &str, state: &Availability, now: DateTime<Utc>) -> String {
    match state.remaining(now) {
        Some(left) => format!(
            "{} is available for another {} min (until {})",
            doctor,
            left.num_minutes(),
            state_expiry(state)
        ),
        None => format!("{} is unavailable", doctor),
    }
}

fn state_expiry(state: &Availability) -> String {
    match state {
        Availability::Available { expires_at } => expires_at.format("%H:%M UTC").to_string(),
        Availability::Unavailable => String::from("-"),
    }
}
