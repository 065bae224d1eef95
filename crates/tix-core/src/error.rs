//! Error types for tix

use crate::TicketId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Ticket not found: {0}")]
    NotFound(TicketId),

    #[error("No tickets to process")]
    QueueEmpty,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("No free ticket id in [{min}, {max})")]
    IdSpaceExhausted { min: u32, max: u32 },

    #[error("Invalid ticket id: {0}")]
    InvalidId(String),

    #[error("Invalid id strategy: {0}")]
    InvalidStrategy(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Ordinary outcomes the caller is expected to branch on, as opposed to
    /// configuration or IO failures.
    pub fn is_outcome(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::QueueEmpty | Error::NothingToUndo
        )
    }
}
