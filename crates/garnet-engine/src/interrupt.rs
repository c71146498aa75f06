//! Cooperative cancellation
//!
//! Lowering a very large file can take a while. A client cancels it by
//! flipping an [`Interrupt`] shared with the translator; the translator polls
//! it at every statement boundary and stops there.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct InterruptState {
    cancelled: AtomicBool,
    polls: AtomicU64,
}

/// Handle used to request cancellation of a running lowering
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    state: Arc<InterruptState>,
}

impl Interrupt {
    /// Create a handle with no pending request
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every lowering polling this handle to stop
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Release);
    }

    /// Withdraw a pending request
    pub fn reset(&self) {
        self.state.cancelled.store(false, Ordering::Release);
    }

    /// Whether a cancellation is pending
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    /// Safepoint check; returns true when the caller must stop
    pub fn poll(&self) -> bool {
        self.state.polls.fetch_add(1, Ordering::Relaxed);
        self.is_cancelled()
    }

    /// Number of safepoint checks performed so far
    pub fn poll_count(&self) -> u64 {
        self.state.polls.load(Ordering::Relaxed)
    }
}
