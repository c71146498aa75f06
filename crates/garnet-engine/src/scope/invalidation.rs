//! Invalidation tokens
//!
//! A token is shared by a frame root and every closure scope nested in it.
//! Adding a variable to the frame at run time (through a binding or `eval`)
//! invalidates the token, which notifies whoever subscribed.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Subscriber = Box<dyn Fn() + Send + Sync>;

struct TokenState {
    valid: AtomicBool,
    subscribers: Mutex<Vec<Subscriber>>,
}

/// Shared "a dynamic variable was added" flag
#[derive(Clone)]
pub struct InvalidationToken {
    state: Arc<TokenState>,
}

impl InvalidationToken {
    /// Create a fresh, valid token
    pub fn new() -> Self {
        Self {
            state: Arc::new(TokenState {
                valid: AtomicBool::new(true),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Whether the token has not been invalidated yet
    pub fn is_valid(&self) -> bool {
        self.state.valid.load(Ordering::Acquire)
    }

    /// Register a callback run on invalidation
    ///
    /// Runs immediately when the token is already invalid.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) {
        let mut subscribers = self.state.subscribers.lock();
        if self.is_valid() {
            subscribers.push(Box::new(callback));
        } else {
            drop(subscribers);
            callback();
        }
    }

    /// Invalidate the token; returns false when it was already invalid
    pub fn invalidate(&self) -> bool {
        let subscribers = {
            let mut subscribers = self.state.subscribers.lock();
            if !self.state.valid.swap(false, Ordering::AcqRel) {
                return false;
            }
            std::mem::take(&mut *subscribers)
        };
        for subscriber in subscribers {
            subscriber();
        }
        true
    }

    /// Whether both handles refer to the same token
    pub fn same_as(&self, other: &InvalidationToken) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Default for InvalidationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InvalidationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvalidationToken")
            .field("valid", &self.is_valid())
            .field("subscribers", &self.state.subscribers.lock().len())
            .finish()
    }
}
