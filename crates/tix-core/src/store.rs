//! In-memory ticket store
//!
//! One authoritative map owns every ticket. The creation-order list and the
//! unprocessed queue hold ids only, so a field change made through the map
//! is what every view sees.

use crate::{Command, Error, IdGenerator, Result, Ticket, TicketId};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

/// Default number of draws before giving up on finding a free id
pub const DEFAULT_MAX_ATTEMPTS: u32 = 64;

/// Ticket store with a creation-order view and a FIFO work queue
#[derive(Debug, Clone)]
pub struct RecordStore {
    tickets: HashMap<TicketId, Ticket>,
    /// Every id ever created, in creation order. Never shrinks.
    order: Vec<TicketId>,
    /// Ids not yet dequeued for processing. Undo does not push back here.
    queue: VecDeque<TicketId>,
    max_attempts: u32,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self::with_max_attempts(DEFAULT_MAX_ATTEMPTS)
    }

    /// Create a store that asks the id generator at most `max_attempts` times
    /// per ticket
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            tickets: HashMap::new(),
            order: Vec::new(),
            queue: VecDeque::new(),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Create a ticket with a fresh id and put it at the back of the queue
    ///
    /// Candidates already in use are rejected and redrawn. Nothing is
    /// mutated when no free id turns up.
    #[must_use = "the returned command must be recorded in the command log"]
    pub fn create(
        &mut self,
        ids: &mut dyn IdGenerator,
        description: impl Into<String>,
    ) -> Result<(TicketId, Command)> {
        let id = self.allocate_id(ids)?;
        let ticket = Ticket::new(id, description);
        debug!(%id, description = ticket.description(), "created ticket");

        self.tickets.insert(id, ticket);
        self.order.push(id);
        self.queue.push_back(id);
        Ok((id, Command::Create { id }))
    }

    fn allocate_id(&self, ids: &mut dyn IdGenerator) -> Result<TicketId> {
        let (min, max) = ids.range();

        let capacity = usize::try_from(max.saturating_sub(min)).unwrap_or(usize::MAX);
        if self.tickets.len() >= capacity {
            warn!(min, max, "ticket id range is full");
            return Err(Error::IdSpaceExhausted { min, max });
        }

        for attempt in 1..=self.max_attempts {
            let candidate = ids.next_candidate();
            if !self.tickets.contains_key(&candidate) {
                return Ok(candidate);
            }
            warn!(%candidate, attempt, "ticket id collision, drawing again");
        }

        // The range is not full, so a scan finds a free id
        warn!(min, max, attempts = self.max_attempts, "draws exhausted, scanning for a free id");
        (min..max)
            .map(TicketId::new)
            .find(|id| !self.tickets.contains_key(id))
            .ok_or(Error::IdSpaceExhausted { min, max })
    }

    /// Dequeue the oldest unprocessed ticket and mark it processed
    #[must_use = "the returned command must be recorded in the command log"]
    pub fn process_next(&mut self) -> Result<(TicketId, Command)> {
        let id = self.queue.pop_front().ok_or(Error::QueueEmpty)?;
        let ticket = self.tickets.get_mut(&id).ok_or(Error::NotFound(id))?;
        ticket.process();
        debug!(%id, "processed ticket");
        Ok((id, Command::Process { id }))
    }

    /// Replace a ticket's description in place
    #[must_use = "the returned command must be recorded in the command log"]
    pub fn modify_description(
        &mut self,
        id: TicketId,
        description: impl Into<String>,
    ) -> Result<Command> {
        let ticket = self.tickets.get_mut(&id).ok_or(Error::NotFound(id))?;
        let current = description.into();
        let previous = ticket.set_description(current.clone());
        debug!(%id, %previous, %current, "modified ticket description");
        Ok(Command::Modify {
            id,
            previous,
            current,
        })
    }

    /// Get a ticket by id
    pub fn get(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.get(&id)
    }

    /// Get a ticket by id, reporting unknown ids as [`Error::NotFound`]
    pub fn lookup(&self, id: TicketId) -> Result<&Ticket> {
        self.get(id).ok_or(Error::NotFound(id))
    }

    /// Check whether an id is in use
    pub fn contains(&self, id: TicketId) -> bool {
        self.tickets.contains_key(&id)
    }

    /// All tickets in creation order
    pub fn list_all(&self) -> Vec<&Ticket> {
        self.order
            .iter()
            .filter_map(|id| self.tickets.get(id))
            .collect()
    }

    /// Tickets still waiting in the queue, front first
    pub fn pending(&self) -> Vec<&Ticket> {
        self.queue
            .iter()
            .filter_map(|id| self.tickets.get(id))
            .collect()
    }

    /// Number of tickets ever created
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of tickets waiting to be processed
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Clear the processed flag without touching the queue
    pub(crate) fn mark_unprocessed(&mut self, id: TicketId) -> Result<()> {
        let ticket = self.tickets.get_mut(&id).ok_or(Error::NotFound(id))?;
        ticket.unprocess();
        debug!(%id, "cleared processed flag");
        Ok(())
    }

    /// Put back a description captured by an earlier modification
    pub(crate) fn restore_description(&mut self, id: TicketId, description: &str) -> Result<()> {
        let ticket = self.tickets.get_mut(&id).ok_or(Error::NotFound(id))?;
        ticket.set_description(description.to_string());
        debug!(%id, description, "restored ticket description");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SequentialIds;

    /// Replays a fixed list of candidates, then repeats the last one
    struct ScriptedIds {
        script: Vec<u32>,
        pos: usize,
    }

    impl ScriptedIds {
        fn new(script: &[u32]) -> Self {
            Self {
                script: script.to_vec(),
                pos: 0,
            }
        }
    }

    impl IdGenerator for ScriptedIds {
        fn next_candidate(&mut self) -> TicketId {
            let idx = self.pos.min(self.script.len() - 1);
            self.pos += 1;
            TicketId::new(self.script[idx])
        }

        fn range(&self) -> (u32, u32) {
            (0, u32::MAX)
        }
    }

    fn store_with(descriptions: &[&str]) -> (RecordStore, Vec<TicketId>) {
        let mut store = RecordStore::new();
        let mut ids = SequentialIds::default();
        let created = descriptions
            .iter()
            .map(|d| store.create(&mut ids, *d).unwrap().0)
            .collect();
        (store, created)
    }

    #[test]
    fn test_create_populates_all_views() {
        let (store, ids) = store_with(&["a", "b"]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.queue_len(), 2);
        assert!(store.contains(ids[0]));
        assert!(store.contains(ids[1]));
        let listed: Vec<_> = store.list_all().iter().map(|t| t.id()).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_create_returns_create_command() {
        let mut store = RecordStore::new();
        let mut ids = SequentialIds::default();
        let (id, command) = store.create(&mut ids, "x").unwrap();
        assert_eq!(command, Command::Create { id });
    }

    #[test]
    fn test_collision_is_redrawn() {
        let mut store = RecordStore::new();
        let mut ids = ScriptedIds::new(&[7, 7, 7, 8]);
        let (first, _) = store.create(&mut ids, "first").unwrap();
        let (second, _) = store.create(&mut ids, "second").unwrap();
        assert_eq!(first, TicketId::new(7));
        assert_eq!(second, TicketId::new(8));
        assert_eq!(store.lookup(first).unwrap().description(), "first");
    }

    #[test]
    fn test_exhausted_draws_fall_back_to_lowest_free_id() {
        let mut store = RecordStore::with_max_attempts(3);
        let mut ids = ScriptedIds::new(&[0, 0, 0, 0, 1, 1, 1, 1]);
        store.create(&mut ids, "first").unwrap();

        // Draws 0, 0, 0 all collide; the scan picks 1
        let (second, _) = store.create(&mut ids, "second").unwrap();
        assert_eq!(second, TicketId::new(1));

        // Draws 1, 1, 1 all collide; the scan skips 0 and 1
        let (third, _) = store.create(&mut ids, "third").unwrap();
        assert_eq!(third, TicketId::new(2));
        assert_eq!(store.len(), 3);
        assert_eq!(store.queue_len(), 3);
    }

    #[test]
    fn test_full_range_is_reported_up_front() {
        let mut store = RecordStore::new();
        let mut ids = SequentialIds::new(1, 3);
        store.create(&mut ids, "one").unwrap();
        store.create(&mut ids, "two").unwrap();
        let err = store.create(&mut ids, "three").unwrap_err();
        assert!(matches!(err, Error::IdSpaceExhausted { min: 1, max: 3 }));
        assert_eq!(store.len(), 2);
        assert_eq!(store.queue_len(), 2);
    }

    #[test]
    fn test_process_next_is_fifo() {
        let (mut store, ids) = store_with(&["a", "b", "c"]);
        assert_eq!(store.process_next().unwrap().0, ids[0]);
        assert_eq!(store.process_next().unwrap().0, ids[1]);
        assert!(store.lookup(ids[0]).unwrap().is_processed());
        assert!(!store.lookup(ids[2]).unwrap().is_processed());
        assert_eq!(store.pending().len(), 1);
    }

    #[test]
    fn test_process_empty_queue() {
        let mut store = RecordStore::new();
        assert!(matches!(store.process_next(), Err(Error::QueueEmpty)));
        assert!(matches!(store.process_next(), Err(Error::QueueEmpty)));
    }

    #[test]
    fn test_modify_is_visible_in_every_view() {
        let (mut store, ids) = store_with(&["old"]);
        let command = store.modify_description(ids[0], "new").unwrap();
        assert_eq!(
            command,
            Command::Modify {
                id: ids[0],
                previous: "old".into(),
                current: "new".into(),
            }
        );
        assert_eq!(store.lookup(ids[0]).unwrap().description(), "new");
        assert_eq!(store.list_all()[0].description(), "new");
        assert_eq!(store.pending()[0].description(), "new");
    }

    #[test]
    fn test_modify_unknown_id() {
        let (mut store, _) = store_with(&["a"]);
        let before: Vec<Ticket> = store.list_all().into_iter().cloned().collect();
        let err = store.modify_description(TicketId::new(1), "x").unwrap_err();
        assert!(matches!(err, Error::NotFound(id) if id == TicketId::new(1)));
        let after: Vec<Ticket> = store.list_all().into_iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_mark_unprocessed_does_not_requeue() {
        let (mut store, ids) = store_with(&["a", "b"]);
        let _ = store.process_next().unwrap();
        store.mark_unprocessed(ids[0]).unwrap();
        assert!(!store.lookup(ids[0]).unwrap().is_processed());
        let queued: Vec<_> = store.pending().iter().map(|t| t.id()).collect();
        assert_eq!(queued, vec![ids[1]]);
    }
}
