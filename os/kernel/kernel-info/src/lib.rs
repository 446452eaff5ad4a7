//! # Kernel Configuration
//!
//! The authoritative source for the kernel's memory-layout and platform
//! constants. Everything here is a compile-time `const` shared by the
//! paging code, the physical-map backend, and the debug output path, so a
//! single definition governs them all.
//!
//! ## Virtual Address Space
//!
//! The kernel runs with two translation table base registers: `TTBR0_EL1`
//! covers the user half, `TTBR1_EL1` the kernel half. With `T0SZ = T1SZ =
//! 16` each half spans 48 bits:
//!
//! ```text
//! 0x0000_0000_0000_0000 ┌─────────────────────────────────┐
//!                       │          User half              │
//!                       │ (per-process, via TTBR0_EL1)    │
//! USER_SPACE_TOP        ├─────────────────────────────────┤ 0x0000_ffff_ffff_ffff
//!                       │   non-canonical gap (faults)    │
//! KERNEL_SPACE_BASE     ├─────────────────────────────────┤ 0xffff_0000_0000_0000
//!                       │         Kernel half             │
//!                       │ (shared, via TTBR1_EL1)         │
//! DMAP_BASE             ├─────────────────────────────────┤ 0xffff_ff80_0000_0000
//!                       │      Direct physical map        │
//!                       │  (offset view of low memory)    │
//! 0xFFFF_FFFF_FFFF_FFFF └─────────────────────────────────┘
//! ```
//!
//! The direct map occupies the last 512 GiB of the kernel half; the span it
//! actually covers is `DMAP_SIZE` bytes of physical memory starting at
//! physical zero.
//!
//! ## Modules
//!
//! - [`memory`]: address-space layout constants
//! - [`platform`]: board-specific MMIO locations
//!
//! Constants come with `const` assertion blocks; an inconsistent layout
//! fails the build instead of the boot.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod memory;
pub mod platform;
