//! Broadcast notifications and per-user read flags.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{DashboardError, Result, ValidationError};
use crate::store::{self, DocumentStore};
use crate::tickets::Role;

pub const NOTIFICATIONS_KEY: &str = "notifications";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Everyone,
    Doctors,
    Facilities,
}

impl Audience {
    /// Whether a user with `role` receives notifications for this audience.
    /// Admins see everything.
    pub fn includes(&self, role: Role) -> bool {
        match (self, role) {
            (_, Role::Admin) => true,
            (Audience::Everyone, _) => true,
            (Audience::Doctors, Role::Doctor) => true,
            (Audience::Facilities, Role::Facility) => true,
            _ => false,
        }
    }
}

impl FromStr for Audience {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "everyone" => Ok(Audience::Everyone),
            "doctors" | "doctor" => Ok(Audience::Doctors),
            "facilities" | "facility" => Ok(Audience::Facilities),
            _ => Err(ValidationError::InvalidValue {
                field: "audience",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub body: String,
    pub audience: Audience,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub read_by: BTreeSet<String>,
}

impl Notification {
    pub fn is_read_by(&self, user: &str) -> bool {
        self.read_by.contains(user)
    }
}

pub struct NotificationCenter<'a> {
    docs: &'a dyn DocumentStore,
}

impl<'a> NotificationCenter<'a> {
    pub fn new(docs: &'a dyn DocumentStore) -> Self {
        NotificationCenter { docs }
    }

    fn load_all(&self) -> Result<Vec<Notification>> {
        Ok(store::load(self.docs, NOTIFICATIONS_KEY)?.unwrap_or_default())
    }

    fn edit_all<R>(&self, edit: impl FnOnce(&mut Vec<Notification>) -> Result<R>) -> Result<R> {
        store::modify(self.docs, NOTIFICATIONS_KEY, edit)
    }

    pub fn broadcast(
        &self,
        title: &str,
        body: &str,
        audience: Audience,
        now: DateTime<Utc>,
    ) -> Result<Notification> {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "Title" }.into());
        }
        if body.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "Message" }.into());
        }

        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            body: body.to_string(),
            audience,
            sent_at: now,
            read_by: BTreeSet::new(),
        };

        self.edit_all(|all| {
            all.push(notification.clone());
            Ok(())
        })?;
        info!("Broadcast notification {} to {:?}", notification.id, audience);
        Ok(notification)
    }

    /// Notifications visible to `role`, newest first.
    pub fn inbox(&self, role: Role) -> Result<Vec<Notification>> {
        let mut visible: Vec<Notification> = self
            .load_all()?
            .into_iter()
            .filter(|n| n.audience.includes(role))
            .collect();
        visible.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(visible)
    }

    /// Mark a notification read. Marking twice is a no-op.
    pub fn mark_read(&self, id: &str, user: &str) -> Result<()> {
        self.edit_all(|all| {
            let notification = all
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or_else(|| DashboardError::NotFound {
                    kind: "Notification",
                    id: id.to_string(),
                })?;
            notification.read_by.insert(user.to_string());
            Ok(())
        })
    }

    pub fn unread_count(&self, role: Role, user: &str) -> Result<usize> {
        Ok(self
            .inbox(role)?
            .iter()
            .filter(|n| !n.is_read_by(user))
            .count())
    }
}
