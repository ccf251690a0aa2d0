//! Fixed supply of request tokens shared by the workers

use std::sync::atomic::{AtomicUsize, Ordering};

/// Pre-filled, closed queue of indistinguishable request tokens
///
/// All tokens are inserted at construction and nothing is ever added
/// afterwards, so the queue is closed from the first `take`. Taking is a
/// lock-free countdown: a worker either claims one of the remaining tokens or
/// learns immediately that the supply is exhausted.
#[derive(Debug)]
pub struct TokenQueue {
    remaining: AtomicUsize,
}

impl TokenQueue {
    /// Create a queue holding exactly `count` tokens
    pub fn filled(count: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(count),
        }
    }

    /// Claim one token; `false` once the queue is exhausted
    pub fn take(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Tokens not yet claimed
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }
}
