//! # Kernel synchronization primitives
//!
//! Spin-based locking and one-shot initialization for code that cannot
//! sleep. [`IrqMutex`] additionally masks IRQs for the critical section so
//! interrupt handlers cannot re-enter a lock the interrupted code holds.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

#[cfg(target_arch = "aarch64")]
pub mod irq;
mod mutex;
mod raw_spin;
mod sync_once_cell;

#[cfg(target_arch = "aarch64")]
pub use irq::{IrqGuard, IrqMutex};
pub use mutex::{Mutex, MutexGuard};
pub use raw_spin::RawSpin;
pub use sync_once_cell::SyncOnceCell;

pub type SpinMutex<T> = Mutex<T, RawSpin>;

impl<T> SpinMutex<T> {
    pub const fn new(value: T) -> Self {
        Self::from_raw(RawSpin::new(), value)
    }
}

pub trait RawLock {
    fn raw_lock(&self);
    fn raw_try_lock(&self) -> bool;
}

pub trait RawUnlock {
    /// # Safety
    /// The caller must hold the lock.
    unsafe fn raw_unlock(&self);
}
