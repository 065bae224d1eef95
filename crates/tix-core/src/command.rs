//! Command log with single-step undo
//!
//! Every mutation of the [`RecordStore`] produces a [`Command`]. The log keeps
//! them on a stack; [`CommandLog::undo_last`] pops the newest one and applies
//! its inverse.
//!
//! Only processing has an inverse by default: the ticket's processed flag is
//! cleared, but the ticket is not put back on the work queue. Create and
//! Modify entries are popped without touching the ticket unless
//! [`UndoPolicy::restore_descriptions`] is set.

use crate::{Error, RecordStore, Result, TicketId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kind of a logged action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Create,
    Process,
    Modify,
    Delete,
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandKind::Create => write!(f, "create"),
            CommandKind::Process => write!(f, "process"),
            CommandKind::Modify => write!(f, "modify"),
            CommandKind::Delete => write!(f, "delete"),
        }
    }
}

/// One logged action, carrying whatever state its inverse needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    Create {
        id: TicketId,
    },
    Process {
        id: TicketId,
    },
    Modify {
        id: TicketId,
        previous: String,
        current: String,
    },
    /// No operation produces this yet
    Delete {
        id: TicketId,
    },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Create { .. } => CommandKind::Create,
            Command::Process { .. } => CommandKind::Process,
            Command::Modify { .. } => CommandKind::Modify,
            Command::Delete { .. } => CommandKind::Delete,
        }
    }

    pub fn ticket_id(&self) -> TicketId {
        match self {
            Command::Create { id }
            | Command::Process { id }
            | Command::Modify { id, .. }
            | Command::Delete { id } => *id,
        }
    }

    /// Whether undoing this command changes any ticket under `policy`
    pub fn is_reversible(&self, policy: UndoPolicy) -> bool {
        match self {
            Command::Process { .. } => true,
            Command::Modify { .. } => policy.restore_descriptions,
            Command::Create { .. } | Command::Delete { .. } => false,
        }
    }

    /// Apply the inverse of this command to `store`
    ///
    /// Returns `true` if a ticket was changed.
    fn revert(&self, store: &mut RecordStore, policy: UndoPolicy) -> Result<bool> {
        match self {
            Command::Process { id } => {
                store.mark_unprocessed(*id)?;
                Ok(true)
            }
            Command::Modify { id, previous, .. } if policy.restore_descriptions => {
                store.restore_description(*id, previous)?;
                Ok(true)
            }
            Command::Modify { .. } | Command::Create { .. } | Command::Delete { .. } => Ok(false),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Modify {
                id,
                previous,
                current,
            } => write!(f, "modify {id}: {previous:?} -> {current:?}"),
            other => write!(f, "{} {}", other.kind(), other.ticket_id()),
        }
    }
}

/// What undo is allowed to reverse beyond processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoPolicy {
    /// Restore the previous description when undoing a modification
    pub restore_descriptions: bool,
}

/// Result of a successful undo
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Undone {
    pub command: Command,
    /// `false` when the entry was popped without changing any ticket
    pub reverted: bool,
}

/// LIFO stack of past actions
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    entries: Vec<Command>,
    policy: UndoPolicy,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: UndoPolicy) -> Self {
        Self {
            entries: Vec::new(),
            policy,
        }
    }

    pub fn policy(&self) -> UndoPolicy {
        self.policy
    }

    /// Push a command on top of the stack
    pub fn record(&mut self, command: Command) {
        debug!(kind = %command.kind(), id = %command.ticket_id(), "recorded command");
        self.entries.push(command);
    }

    /// Apply the newest command's inverse to `store`, then pop it
    ///
    /// The entry stays on the stack if the inverse fails.
    pub fn undo_last(&mut self, store: &mut RecordStore) -> Result<Undone> {
        let top = self.entries.last().ok_or(Error::NothingToUndo)?;
        let reverted = top.revert(store, self.policy)?;
        let command = self.entries.pop().ok_or(Error::NothingToUndo)?;
        debug!(kind = %command.kind(), id = %command.ticket_id(), reverted, "undid command");
        Ok(Undone { command, reverted })
    }

    /// Newest command, if any
    pub fn peek(&self) -> Option<&Command> {
        self.entries.last()
    }

    /// Commands newest first
    pub fn entries(&self) -> impl Iterator<Item = &Command> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
