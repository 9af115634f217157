//! Support tickets raised by admins, doctors and facilities.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{DashboardError, Result, ValidationError};
use crate::store::{self, DocumentStore};

pub const TICKETS_KEY: &str = "support_tickets";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Doctor,
    Facility,
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "facility" => Ok(Role::Facility),
            _ => Err(ValidationError::InvalidValue {
                field: "role",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
}

impl FromStr for TicketPriority {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(TicketPriority::Low),
            "medium" => Ok(TicketPriority::Medium),
            "high" => Ok(TicketPriority::High),
            _ => Err(ValidationError::InvalidValue {
                field: "priority",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn name(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TicketStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "open" => Ok(TicketStatus::Open),
            "in progress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            "closed" => Ok(TicketStatus::Closed),
            _ => Err(ValidationError::InvalidValue {
                field: "ticket status",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketReply {
    pub author: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: String,
    pub subject: String,
    pub description: String,
    pub requester: String,
    pub role: Role,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<TicketReply>,
}

/// Fields needed to open a ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub subject: String,
    pub description: String,
    pub requester: String,
    pub role: Role,
    pub priority: TicketPriority,
}

/// Ticket list persisted as one document.
pub struct TicketBoard<'a> {
    docs: &'a dyn DocumentStore,
}

impl<'a> TicketBoard<'a> {
    pub fn new(docs: &'a dyn DocumentStore) -> Self {
        TicketBoard { docs }
    }

    fn load_all(&self) -> Result<Vec<SupportTicket>> {
        Ok(store::load(self.docs, TICKETS_KEY)?.unwrap_or_default())
    }

    // Load, edit and save the ticket list without another writer slipping
    // in between.
    fn edit_all<R>(&self, edit: impl FnOnce(&mut Vec<SupportTicket>) -> Result<R>) -> Result<R> {
        store::modify(self.docs, TICKETS_KEY, edit)
    }

    /// Tickets newest first, optionally limited to one status.
    pub fn list(&self, status: Option<TicketStatus>) -> Result<Vec<SupportTicket>> {
        let mut tickets: Vec<SupportTicket> = self
            .load_all()?
            .into_iter()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    pub fn get(&self, id: &str) -> Result<SupportTicket> {
        self.load_all()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found(id))
    }

    /// Case-insensitive match on subject, description or requester.
    pub fn search(&self, text: &str) -> Result<Vec<SupportTicket>> {
        let needle = text.to_lowercase();
        Ok(self
            .list(None)?
            .into_iter()
            .filter(|t| {
                t.subject.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle)
                    || t.requester.to_lowercase().contains(&needle)
            })
            .collect())
    }

    pub fn open(&self, ticket: NewTicket, now: DateTime<Utc>) -> Result<SupportTicket> {
        if ticket.subject.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "Subject" }.into());
        }
        if ticket.requester.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "Requester" }.into());
        }

        let created = SupportTicket {
            id: Uuid::new_v4().to_string(),
            subject: ticket.subject,
            description: ticket.description,
            requester: ticket.requester,
            role: ticket.role,
            priority: ticket.priority,
            status: TicketStatus::Open,
            created_at: now,
            replies: Vec::new(),
        };

        self.edit_all(|tickets| {
            tickets.push(created.clone());
            Ok(())
        })?;
        info!("Opened ticket {} for {}", created.id, created.requester);
        Ok(created)
    }

    /// Add a reply. Closed tickets do not accept replies.
    pub fn reply(
        &self,
        id: &str,
        author: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<SupportTicket> {
        if body.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "Reply" }.into());
        }

        self.edit_all(|tickets| {
            let ticket = tickets
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| not_found(id))?;

            if ticket.status == TicketStatus::Closed {
                return Err(DashboardError::Conflict(format!("Ticket {} is closed", id)));
            }

            ticket.replies.push(TicketReply {
                author: author.to_string(),
                body: body.to_string(),
                sent_at: now,
            });
            Ok(ticket.clone())
        })
    }

    pub fn set_status(&self, id: &str, status: TicketStatus) -> Result<SupportTicket> {
        let (previous, updated) = self.edit_all(|tickets| {
            let ticket = tickets
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| not_found(id))?;

            let previous = ticket.status;
            ticket.status = status;
            Ok((previous, ticket.clone()))
        })?;
        info!("Ticket {} moved from {} to {}", id, previous, status);
        Ok(updated)
    }
}

fn not_found(id: &str) -> DashboardError {
    DashboardError::NotFound {
        kind: "Ticket",
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 22, 9, 0, 0).unwrap()
    }

    fn new_ticket(subject: &str) -> NewTicket {
        NewTicket {
            subject: subject.to_string(),
            description: "Invoice shows the wrong plan".to_string(),
            requester: "City Care Clinic".to_string(),
            role: Role::Facility,
            priority: TicketPriority::High,
        }
    }

    #[test]
    fn opened_tickets_list_newest_first() {
        let docs = MemoryStore::new();
        let board = TicketBoard::new(&docs);
        board.open(new_ticket("Billing"), now()).unwrap();
        board
            .open(new_ticket("Login"), now() + Duration::minutes(5))
            .unwrap();

        let tickets = board.list(None).unwrap();
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].subject, "Login");
        assert_eq!(tickets[0].status, TicketStatus::Open);
    }

    #[test]
    fn status_filter_and_search() {
        let docs = MemoryStore::new();
        let board = TicketBoard::new(&docs);
        let billing = board.open(new_ticket("Billing"), now()).unwrap();
        board.open(new_ticket("Login issue"), now()).unwrap();
        board.set_status(&billing.id, TicketStatus::Resolved).unwrap();

        assert_eq!(board.list(Some(TicketStatus::Resolved)).unwrap().len(), 1);
        assert_eq!(board.list(Some(TicketStatus::Open)).unwrap().len(), 1);
        assert_eq!(board.search("LOGIN").unwrap().len(), 1);
        assert_eq!(board.search("city care").unwrap().len(), 2);
    }

    #[test]
    fn closed_tickets_reject_replies() {
        let docs = MemoryStore::new();
        let board = TicketBoard::new(&docs);
        let ticket = board.open(new_ticket("Billing"), now()).unwrap();

        let replied = board.reply(&ticket.id, "admin", "Looking into it", now()).unwrap();
        assert_eq!(replied.replies.len(), 1);

        board.set_status(&ticket.id, TicketStatus::Closed).unwrap();
        let result = board.reply(&ticket.id, "admin", "One more thing", now());
        assert!(matches!(result, Err(DashboardError::Conflict(_))));
    }

    #[test]
    fn unknown_ticket_is_not_found() {
        let docs = MemoryStore::new();
        let board = TicketBoard::new(&docs);
        assert!(matches!(
            board.set_status("nope", TicketStatus::Closed),
            Err(DashboardError::NotFound { .. })
        ));
    }

    #[test]
    fn concurrent_opens_keep_every_ticket() {
        let docs = MemoryStore::new();
        std::thread::scope(|scope| {
            for worker in 0..8 {
                let docs = &docs;
                scope.spawn(move || {
                    let board = TicketBoard::new(docs);
                    for n in 0..50 {
                        let subject = format!("Worker {} ticket {}", worker, n);
                        board.open(new_ticket(&subject), now()).unwrap();
                    }
                });
            }
        });

        let tickets = TicketBoard::new(&docs).list(None).unwrap();
        assert_eq!(tickets.len(), 400);
    }

    #[test]
    fn concurrent_replies_all_land() {
        let docs = MemoryStore::new();
        let ticket = TicketBoard::new(&docs).open(new_ticket("Billing"), now()).unwrap();
        std::thread::scope(|scope| {
            for worker in 0..4 {
                let (docs, id) = (&docs, ticket.id.as_str());
                scope.spawn(move || {
                    let board = TicketBoard::new(docs);
                    for n in 0..25 {
                        let body = format!("Update {} from worker {}", n, worker);
                        board.reply(id, "admin", &body, now()).unwrap();
                    }
                });
            }
        });

        let stored = TicketBoard::new(&docs).get(&ticket.id).unwrap();
        assert_eq!(stored.replies.len(), 100);
    }

    #[test]
    fn rejected_reply_leaves_ticket_unchanged() {
        let docs = MemoryStore::new();
        let board = TicketBoard::new(&docs);
        let ticket = board.open(new_ticket("Billing"), now()).unwrap();
        board.set_status(&ticket.id, TicketStatus::Closed).unwrap();

        assert!(board.reply(&ticket.id, "admin", "Reopening", now()).is_err());
        assert!(board.get(&ticket.id).unwrap().replies.is_empty());
    }

    #[test]
    fn parses_status_spellings() {
        assert_eq!("in_progress".parse::<TicketStatus>().unwrap(), TicketStatus::InProgress);
        assert_eq!("In Progress".parse::<TicketStatus>().unwrap(), TicketStatus::InProgress);
        assert!("pending".parse::<TicketStatus>().is_err());
    }
}
