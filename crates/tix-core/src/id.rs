//! Ticket number generation
//!
//! Generators only propose candidates. Uniqueness is checked by the
//! [`RecordStore`](crate::RecordStore), which asks again on collision.

use crate::TicketId;
use uuid::Uuid;

/// Lowest ticket number handed out by default
pub const DEFAULT_MIN_ID: u32 = 1000;

/// Upper bound (exclusive) of the default ticket number range
pub const DEFAULT_MAX_ID: u32 = 10000;

/// Source of candidate ticket numbers
pub trait IdGenerator {
    /// Propose the next ticket number. May repeat earlier proposals.
    fn next_candidate(&mut self) -> TicketId;

    /// Range the generator draws from, as `(min, max_exclusive)`
    fn range(&self) -> (u32, u32);
}

/// Monotonic counter starting at `min`, wrapping back to `min` at `max`
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u32,
    min: u32,
    max: u32,
}

impl SequentialIds {
    pub fn new(min: u32, max: u32) -> Self {
        Self { next: min, min, max }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ID, DEFAULT_MAX_ID)
    }
}

impl IdGenerator for SequentialIds {
    fn next_candidate(&mut self) -> TicketId {
        let id = self.next;
        self.next = if id.saturating_add(1) >= self.max {
            self.min
        } else {
            id + 1
        };
        TicketId::new(id)
    }

    fn range(&self) -> (u32, u32) {
        (self.min, self.max)
    }
}

/// Uniform draw from `[min, max)`
///
/// Entropy comes from a v4 UUID so no extra RNG dependency is needed.
#[derive(Debug, Clone)]
pub struct RandomIds {
    min: u32,
    max: u32,
}

impl RandomIds {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ID, DEFAULT_MAX_ID)
    }
}

impl IdGenerator for RandomIds {
    fn next_candidate(&mut self) -> TicketId {
        let span = u128::from(self.max.saturating_sub(self.min).max(1));
        let offset = Uuid::new_v4().as_u128() % span;
        // offset < span <= u32::MAX, so the narrowing is lossless
        TicketId::new(self.min + offset as u32)
    }

    fn range(&self) -> (u32, u32) {
        (self.min, self.max)
    }
}
