//! Strategies for choosing the pool member that runs a command.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

/// Picks a member index in `0..len` for the next dispatch.
pub trait Selector: Send + Sync {
    /// Chooses an index below `len`, which is never zero.
    fn select(&self, len: usize) -> usize;
}

/// Uniformly random choice from the process-wide generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl Selector for RandomSelector {
    fn select(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Cycles through the members in identity order.
#[derive(Debug, Default)]
pub struct RoundRobinSelector {
    next: AtomicUsize,
}

impl RoundRobinSelector {
    /// A selector starting at the first member.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicUsize::new(0),
        }
    }
}

impl Selector for RoundRobinSelector {
    fn select(&self, len: usize) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed) % len
    }
}
