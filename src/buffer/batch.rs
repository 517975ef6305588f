use crate::domain::TestcaseRequest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// What caused a batch to be flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlushTrigger {
    SizeBased,
    TimeBased,
    Shutdown,
}

impl fmt::Display for FlushTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlushTrigger::SizeBased => "size",
            FlushTrigger::TimeBased => "time",
            FlushTrigger::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

/// A sealed, non-empty group of test cases handed to the transport in one request.
#[derive(Debug, Clone)]
pub struct Batch {
    id: String,
    entries: Vec<TestcaseRequest>,
    trigger: FlushTrigger,
    opened_at: Instant,
}

impl Batch {
    fn new(entries: Vec<TestcaseRequest>, trigger: FlushTrigger, opened_at: Instant) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entries,
            trigger,
            opened_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[TestcaseRequest] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TestcaseRequest> {
        self.entries
    }

    pub fn trigger(&self) -> FlushTrigger {
        self.trigger
    }

    /// When the first entry of this batch was accepted.
    pub fn opened_at(&self) -> Instant {
        self.opened_at
    }

    /// How long the oldest entry has been waiting for delivery.
    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }
}

/// Accumulator owned by the batcher worker.
///
/// Entries keep their append order. `take` hands the contents over and
/// leaves a fresh empty accumulator behind; an empty accumulator yields
/// nothing, so an empty batch never reaches the transport.
#[derive(Debug)]
pub struct PendingBatch {
    max_size: usize,
    entries: Vec<TestcaseRequest>,
    opened_at: Option<Instant>,
}

impl PendingBatch {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            entries: Vec::with_capacity(max_size),
            opened_at: None,
        }
    }

    pub fn push(&mut self, entry: TestcaseRequest) {
        self.opened_at.get_or_insert_with(Instant::now);
        self.entries.push(entry);
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.max_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn take(&mut self, trigger: FlushTrigger) -> Option<Batch> {
        let opened_at = self.opened_at.take()?;
        let entries = std::mem::replace(&mut self.entries, Vec::with_capacity(self.max_size));
        Some(Batch::new(entries, trigger, opened_at))
    }
}
