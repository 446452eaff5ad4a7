//! # Physical Map Backend
//!
//! The architecture-specific floor of the virtual-memory system: this crate
//! encodes the `AArch64` VMSAv8-64 page-table format (4 KiB granule,
//! 48-bit addresses, four levels), switches the active user translation
//! context, and owns the kernel's direct physical-memory window.
//!
//! The machine-independent frontend decides *what* to map; this crate
//! decides *which bits* make the MMU agree.
//!
//! ## Translation walk
//!
//! ```text
//! VA[47:39]    VA[38:30]    VA[29:21]    VA[20:12]    VA[11:0]
//!    L0      →    L1      →    L2      →    L3      →  offset
//!  table        table        table        page
//! ```
//!
//! Interior levels hold [`TableEntry`] words naming the next table; the
//! last level holds [`LeafEntry`] words naming a physical frame plus its
//! access attributes.
//!
//! ## Components
//!
//! * [`prot`]: the constant table translating [`VmProt`] intents into
//!   hardware attribute bits. Everything else stays protection-agnostic.
//! * [`entry`]: leaf and table descriptor construction, plus protection
//!   changes on existing leaves.
//! * [`address_space`]: the two-state activator that parks or switches the
//!   `TTBR0_EL1` translation regime.
//! * [`dmap`]: the one-shot direct-map window and physical-to-virtual
//!   offset translation.
//!
//! All descriptor construction is pure computation over caller-supplied
//! values and carries no locks. The activator's register pair is the one
//! sequence with ordering requirements; its caller suspends preemption
//! around the call.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod address_space;
pub mod dmap;
pub mod entry;
pub mod prot;

pub use address_space::{activate, AddressSpace, Asid, MmuRegisters};
#[cfg(all(feature = "asm", target_arch = "aarch64"))]
pub use address_space::HwMmuRegisters;
pub use dmap::{bootstrap_direct_map, phys_to_dmap, DmapWindow};
pub use entry::{CachePolicy, EntryFlags, LeafEntry, Privilege, TableEntry};
pub use prot::VmProt;
