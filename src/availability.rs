//! Doctor "available now" toggle.
//!
//! Going online opens a window that closes on its own; every change of
//! state goes through [`Availability::transition`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{DashboardError, Result, ValidationError};
use crate::store::{self, DocumentStore};

/// Default length of an availability window.
pub const DEFAULT_WINDOW_MINUTES: i64 = 60;

/// Longest window a doctor can open in one go.
pub const MAX_WINDOW_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Availability {
    #[default]
    Unavailable,
    Available { expires_at: DateTime<Utc> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityEvent {
    GoOnline { duration: Duration },
    GoOffline,
    Tick,
}

impl AvailabilityEvent {
    pub fn go_online_default() -> Self {
        AvailabilityEvent::GoOnline {
            duration: Duration::minutes(DEFAULT_WINDOW_MINUTES),
        }
    }

    /// Go online for `minutes`, rejecting windows longer than
    /// [`MAX_WINDOW_MINUTES`].
    pub fn go_online_minutes(minutes: i64) -> std::result::Result<Self, ValidationError> {
        let duration = Duration::try_minutes(minutes)
            .filter(|_| minutes <= MAX_WINDOW_MINUTES)
            .ok_or_else(|| window_error(format!("{} minutes", minutes)))?;
        Ok(AvailabilityEvent::GoOnline { duration })
    }
}

fn window_error(value: String) -> ValidationError {
    ValidationError::InvalidValue {
        field: "availability window",
        value,
    }
}

impl Availability {
    /// Apply `event` at time `now`.
    ///
    /// Going online while already online restarts the window. A non-positive
    /// duration leaves the doctor unavailable. Windows longer than
    /// [`MAX_WINDOW_MINUTES`], or ending past the representable range, are
    /// rejected and leave no state behind.
    pub fn transition(
        self,
        event: AvailabilityEvent,
        now: DateTime<Utc>,
    ) -> std::result::Result<Availability, ValidationError> {
        let next = match event {
            AvailabilityEvent::GoOnline { duration } if duration > Duration::zero() => {
                if duration > Duration::minutes(MAX_WINDOW_MINUTES) {
                    return Err(window_error(format!("{} minutes", duration.num_minutes())));
                }
                let expires_at = now
                    .checked_add_signed(duration)
                    .ok_or_else(|| window_error(format!("{} + {}", now, duration)))?;
                Availability::Available { expires_at }
            }
            AvailabilityEvent::GoOnline { .. } | AvailabilityEvent::GoOffline => {
                Availability::Unavailable
            }
            AvailabilityEvent::Tick => match self {
                Availability::Available { expires_at } if now >= expires_at => {
                    Availability::Unavailable
                }
                other => other,
            },
        };
        Ok(next)
    }

    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        matches!(self, Availability::Available { expires_at } if now < *expires_at)
    }

    /// Time left in the window, if one is open.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self {
            Availability::Available { expires_at } if now < *expires_at => Some(*expires_at - now),
            _ => None,
        }
    }
}

/// Store key for a doctor's availability.
///
/// Name-based UUID of the exact doctor name, so distinct names never share
/// a document and any name maps to a key of fixed length and safe alphabet.
pub fn store_key(doctor: &str) -> String {
    let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, doctor.as_bytes());
    format!("availability-{}", id.hyphenated())
}

/// Load a doctor's availability, applying any expiry due at `now`.
pub fn load(docs: &dyn DocumentStore, doctor: &str, now: DateTime<Utc>) -> Result<Availability> {
    let stored: Availability = store::load(docs, &store_key(doctor))?.unwrap_or_default();
    Ok(stored.transition(AvailabilityEvent::Tick, now)?)
}

/// Apply an event to a doctor's stored availability and persist the result.
pub fn apply(
    docs: &dyn DocumentStore,
    doctor: &str,
    event: AvailabilityEvent,
    now: DateTime<Utc>,
) -> Result<Availability> {
    let next = store::modify(docs, &store_key(doctor), |state: &mut Availability| {
        *state = state
            .transition(AvailabilityEvent::Tick, now)?
            .transition(event, now)?;
        Ok::<_, DashboardError>(*state)
    })?;
    info!("Availability for {} is now {:?}", doctor, next);
    Ok(next)
}
