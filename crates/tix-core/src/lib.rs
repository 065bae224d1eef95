//! tix-core: Core library for the tix ticket desk
//!
//! Keeps short-lived help-desk tickets in memory. A [`RecordStore`] owns the
//! tickets and their views, a [`CommandLog`] remembers what was done to them,
//! and a [`TicketDesk`] ties the two together so every mutation is logged.
//! Nothing is persisted.

pub mod command;
pub mod config;
pub mod desk;
pub mod error;
pub mod id;
pub mod store;
pub mod ticket;

pub use command::{Command, CommandKind, CommandLog, UndoPolicy, Undone};
pub use config::{Config, IdStrategy};
pub use desk::TicketDesk;
pub use error::Error;
pub use id::{IdGenerator, RandomIds, SequentialIds};
pub use store::RecordStore;
pub use ticket::{Ticket, TicketId};

/// Result type for tix operations
pub type Result<T> = std::result::Result<T, Error>;
