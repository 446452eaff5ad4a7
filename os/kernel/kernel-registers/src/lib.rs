//! # Typed `AArch64` System Registers
//!
//! Bitfield views over the EL1 system registers the paging code touches,
//! plus the load/store traits that abstract the `mrs`/`msr` access path.
//! The views themselves are plain values and fully testable on any host;
//! only the trait impls behind the `asm` feature emit instructions.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

#[cfg(feature = "tcr")]
pub mod tcr;

#[cfg(feature = "ttbr0")]
pub mod ttbr0;

pub trait LoadRegisterUnsafe {
    /// # Safety
    /// The caller must uphold the implementation-specific safety requirements.
    /// For example, the register access might be privileged and require EL1.
    unsafe fn load_unsafe() -> Self;
}

pub trait StoreRegisterUnsafe {
    /// # Safety
    /// The caller must uphold the implementation-specific safety requirements.
    /// For example, the register access might be privileged and require EL1,
    /// and the written value must leave the translation regime in a state the
    /// rest of the kernel expects.
    unsafe fn store_unsafe(self);
}
