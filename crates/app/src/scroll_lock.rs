//! Page scroll locking while the chat widget covers the page.

use parking_lot::Mutex;
use std::sync::Arc;

/// Capability the chat session uses to freeze page scrolling.
///
/// `acquire` and `release` are always called in matched pairs.
pub trait ScrollLockController {
    fn acquire(&mut self);
    fn release(&mut self);
}

/// For hosts that have nothing to lock
#[derive(Debug, Default)]
pub struct NoScrollLock;

impl ScrollLockController for NoScrollLock {
    fn acquire(&mut self) {}
    fn release(&mut self) {}
}

/// Flag shared with the shell; the page body stops scrolling while it is set.
#[derive(Debug, Clone, Default)]
pub struct PageScrollLock {
    locked: Arc<Mutex<bool>>,
}

impl PageScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        *self.locked.lock()
    }
}

impl ScrollLockController for PageScrollLock {
    fn acquire(&mut self) {
        *self.locked.lock() = true;
    }

    fn release(&mut self) {
        *self.locked.lock() = false;
    }
}
