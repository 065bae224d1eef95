//! Ticket desk: the store and its command log behind one interface
//!
//! Every successful mutation is recorded; failed ones leave the log alone.

use crate::{
    CommandLog, Config, IdGenerator, RandomIds, RecordStore, Result, Ticket, TicketId,
    UndoPolicy, Undone,
};

pub struct TicketDesk {
    store: RecordStore,
    log: CommandLog,
    ids: Box<dyn IdGenerator>,
}

impl Default for TicketDesk {
    fn default() -> Self {
        Self::new(Box::new(RandomIds::default()))
    }
}

impl TicketDesk {
    /// Desk with the default store and undo policy
    pub fn new(ids: Box<dyn IdGenerator>) -> Self {
        Self::with_parts(RecordStore::new(), CommandLog::new(), ids)
    }

    pub fn with_parts(store: RecordStore, log: CommandLog, ids: Box<dyn IdGenerator>) -> Self {
        Self { store, log, ids }
    }

    /// Desk built from the `[ids]` and `[undo]` config sections
    pub fn from_config(config: &Config) -> Self {
        Self::with_parts(
            RecordStore::with_max_attempts(config.ids.max_attempts),
            CommandLog::with_policy(config.undo),
            config.ids.generator(),
        )
    }

    /// Create a ticket and queue it for processing
    pub fn create(&mut self, description: impl Into<String>) -> Result<TicketId> {
        let (id, command) = self.store.create(self.ids.as_mut(), description)?;
        self.log.record(command);
        Ok(id)
    }

    /// Process the oldest queued ticket
    pub fn process_next(&mut self) -> Result<TicketId> {
        let (id, command) = self.store.process_next()?;
        self.log.record(command);
        Ok(id)
    }

    /// Change a ticket's description
    pub fn modify_description(
        &mut self,
        id: TicketId,
        description: impl Into<String>,
    ) -> Result<()> {
        let command = self.store.modify_description(id, description)?;
        self.log.record(command);
        Ok(())
    }

    /// Reverse the most recent action
    pub fn undo_last(&mut self) -> Result<Undone> {
        self.log.undo_last(&mut self.store)
    }

    pub fn lookup(&self, id: TicketId) -> Result<&Ticket> {
        self.store.lookup(id)
    }

    /// All tickets in creation order
    pub fn list_all(&self) -> Vec<&Ticket> {
        self.store.list_all()
    }

    /// Tickets still waiting to be processed
    pub fn pending(&self) -> Vec<&Ticket> {
        self.store.pending()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    pub fn undo_policy(&self) -> UndoPolicy {
        self.log.policy()
    }
}
