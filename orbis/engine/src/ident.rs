//! Monotonic entity identity, injectable for tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic id source. Collections hold a reference to one of these so
/// identity stays testable; a process-wide default is provided below.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Generator starting at id 1 (0 is reserved as "never assigned").
    #[must_use]
    pub const fn new() -> Self {
        Self { next: AtomicU64::new(1) }
    }

    /// Hand out the next id. Never returns the same value twice.
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

static PROCESS_IDS: IdGenerator = IdGenerator::new();

/// Process-wide default generator.
#[must_use]
pub fn process_ids() -> &'static IdGenerator {
    &PROCESS_IDS
}
