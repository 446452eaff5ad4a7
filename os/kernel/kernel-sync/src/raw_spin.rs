use crate::{RawLock, RawUnlock};
use core::hint::spin_loop;
use core::sync::atomic::{AtomicBool, Ordering};

/// Test-and-set spin lock state.
pub struct RawSpin {
    held: AtomicBool,
}

impl Default for RawSpin {
    fn default() -> Self {
        Self::new()
    }
}

impl RawSpin {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            held: AtomicBool::new(false),
        }
    }
}

impl RawLock for RawSpin {
    fn raw_lock(&self) {
        // Try once, then spin on a plain load until the lock looks free.
        while self.held.swap(true, Ordering::Acquire) {
            while self.held.load(Ordering::Relaxed) {
                spin_loop();
            }
        }
    }

    fn raw_try_lock(&self) -> bool {
        !self.held.swap(true, Ordering::Acquire)
    }
}

impl RawUnlock for RawSpin {
    unsafe fn raw_unlock(&self) {
        self.held.store(false, Ordering::Release);
    }
}
