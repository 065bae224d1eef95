//! Ticket data model for tix

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ticket number, unique among the tickets of one desk
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(u32);

impl TicketId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for TicketId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::str::FromStr for TicketId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('#');
        trimmed
            .parse::<u32>()
            .map(TicketId)
            .map_err(|_| crate::Error::InvalidId(s.to_string()))
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of help-desk work
///
/// Fields are read through accessors; only the store mutates a ticket, so a
/// `&Ticket` handed out by a view cannot drift from the authoritative copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    id: TicketId,
    description: String,
    processed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Create an unprocessed ticket
    pub fn new(id: TicketId, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            description: description.into(),
            processed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> TicketId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_processed(&self) -> bool {
        self.processed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Mark as processed
    pub(crate) fn process(&mut self) {
        self.processed = true;
        self.updated_at = Utc::now();
    }

    /// Clear the processed flag (undo of a process)
    pub(crate) fn unprocess(&mut self) {
        self.processed = false;
        self.updated_at = Utc::now();
    }

    /// Replace the description, returning the previous one
    pub(crate) fn set_description(&mut self, description: String) -> String {
        self.updated_at = Utc::now();
        std::mem::replace(&mut self.description, description)
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ticket Number: {}, Description: {}, Processed: {}",
            self.id, self.description, self.processed
        )
    }
}
