use crate::{Mutex, MutexGuard, RawLock, RawUnlock};

/// `DAIF` bit 7 — the IRQ mask. Set means IRQs are masked.
pub const DAIF_I: u64 = 1 << 7;

/// A mutex guard that also masks IRQs while held.
///
/// `IrqMutex` combines an interrupt guard with a regular [`MutexGuard`].
/// When created via [`Mutex::lock_irq`], it:
///
/// 1. saves the current IRQ mask state and masks IRQs, and
/// 2. acquires the underlying mutex,
///
/// releasing them in reverse order on drop: the mutex first, then the IRQ
/// mask. This prevents interrupt handlers from preempting the critical
/// section and re-entering code that uses the same lock.
///
/// # Platform
///
/// Uses `mrs`/`msr` on `DAIF` and therefore targets `aarch64`.
///
/// # Safety & Privilege
///
/// These operations must run at EL1. Calling from EL0 traps.
///
/// # Examples
///
/// ```no_run
/// use kernel_sync::{Mutex, RawSpin};
///
/// static M: Mutex<u64, RawSpin> = Mutex::from_raw(RawSpin::new(), 0);
///
/// // Mask IRQs and lock for the duration of the scope.
/// {
///     let mut g = M.lock_irq();
///     *g += 1;
/// }
/// // mutex released, then the previous IRQ mask state restored
/// ```
pub struct IrqMutex<'a, T, R: RawLock + RawUnlock> {
    // Field order is load-bearing: the mutex must release before the IRQ
    // mask state is restored.
    guard: MutexGuard<'a, T, R>,
    _irq: IrqGuard,
}

impl<T, R: RawLock + RawUnlock> core::ops::Deref for IrqMutex<'_, T, R> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T, R: RawLock + RawUnlock> core::ops::DerefMut for IrqMutex<'_, T, R> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T, R: RawLock + RawUnlock> Mutex<T, R> {
    /// Acquires the mutex with IRQs masked for the guard's lifetime.
    ///
    /// This constructs an [`IrqGuard`] to save and mask the IRQ state, then
    /// acquires the mutex and returns a paired [`IrqMutex`] guard. Dropping
    /// the guard releases the mutex and unmasks IRQs if they were unmasked
    /// before.
    #[inline]
    pub fn lock_irq(&self) -> IrqMutex<'_, T, R> {
        let irq = IrqGuard::new();
        let guard = self.lock();
        IrqMutex { guard, _irq: irq }
    }
}

/// Masks IRQs (`msr daifset, #2`).
///
/// # Safety & Privilege
///
/// Must only be called at EL1. Misuse can hang the system.
#[inline]
pub fn mask_irq() {
    unsafe { core::arch::asm!("msr daifset, #2", options(nomem, nostack, preserves_flags)) }
}

/// Unmasks IRQs (`msr daifclr, #2`).
///
/// # Safety & Privilege
///
/// Must only be called at EL1. Typically used to restore a previously
/// masked state.
#[inline]
pub fn unmask_irq() {
    unsafe { core::arch::asm!("msr daifclr, #2", options(nomem, nostack, preserves_flags)) }
}

/// Returns the current `DAIF` value.
///
/// Bit 7 ([`DAIF_I`]) indicates whether IRQs are masked.
#[inline]
#[must_use]
pub fn daif() -> u64 {
    let d: u64;
    unsafe { core::arch::asm!("mrs {}, daif", out(reg) d, options(nomem, nostack, preserves_flags)) }
    d
}

/// RAII guard that masks IRQs on creation and restores the state on drop.
///
/// `IrqGuard::new()` snapshots the `I` bit of `DAIF`. If IRQs were
/// unmasked, it masks them. On drop, it unmasks **only** if they were
/// previously unmasked, preserving the original state. Nesting therefore
/// works: only the outermost guard unmasks.
///
/// # Examples
///
/// ```no_run
/// use kernel_sync::irq::{daif, IrqGuard, DAIF_I};
///
/// {
///     let _g = IrqGuard::new();
///     assert_ne!(daif() & DAIF_I, 0); // IRQs masked here
/// }
/// // previous mask state restored
/// ```
pub struct IrqGuard {
    /// Whether IRQs were unmasked (I=0) when the guard was created.
    was_unmasked: bool,
}

impl Default for IrqGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl IrqGuard {
    /// Masks IRQs if they are currently unmasked and remembers the state.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        let unmasked = (daif() & DAIF_I) == 0;
        if unmasked {
            mask_irq();
        }
        Self {
            was_unmasked: unmasked,
        }
    }
}

impl Drop for IrqGuard {
    /// Unmasks IRQs only if they were unmasked before the guard existed.
    fn drop(&mut self) {
        if self.was_unmasked {
            unmask_irq();
        }
    }
}
