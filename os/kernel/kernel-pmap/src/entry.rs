//! Leaf and table descriptor construction.
//!
//! A translation walk reads one [`TableEntry`] per interior level and one
//! [`LeafEntry`] at the bottom. Both are plain 64-bit words; the bitfield
//! views here pin every field to the position VMSAv8-64 assigns it, so
//! construction is masking-free and the tests can talk about single bits.

use crate::prot::{protection_bits, VmProt};
use bitfield_struct::bitfield;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, Size4K};

/// `MAIR_EL1` slot assignment.
///
/// A leaf entry names its memory type by index into `MAIR_EL1`; the boot
/// path programs the register with these slots and every entry built here
/// must agree with that assignment.
pub mod mair {
    /// Device-nGnRnE memory.
    pub const DEVICE: u8 = 0;
    /// Normal memory, inner and outer non-cacheable.
    pub const NORMAL_NC: u8 = 1;
    /// Normal memory, inner and outer write-back.
    pub const NORMAL_WB: u8 = 2;
    /// Normal memory, inner and outer write-through.
    pub const NORMAL_WT: u8 = 3;
}

/// SH field value for the Inner Shareable domain.
pub const SH_INNER: u8 = 0b11;

/// Privilege context a leaf entry translates for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Privilege {
    Kernel,
    User,
}

/// Memory-type selection for a leaf mapping.
///
/// Exactly one policy applies per mapping; the variants carry the
/// precedence the flag-based callers expect (no-cache beats write-through
/// beats the write-back default).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CachePolicy {
    #[default]
    WriteBack,
    NoCache,
    WriteThrough,
}

impl CachePolicy {
    /// The `MAIR_EL1` slot this policy maps to.
    #[must_use]
    pub const fn memory_index(self) -> u8 {
        match self {
            Self::NoCache => mair::NORMAL_NC,
            Self::WriteThrough => mair::NORMAL_WT,
            Self::WriteBack => mair::NORMAL_WB,
        }
    }
}

/// Construction-time options for a leaf entry.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EntryFlags {
    pub privilege: Privilege,
    pub cache: CachePolicy,
}

impl EntryFlags {
    /// Kernel mapping with the default write-back policy.
    #[must_use]
    pub const fn kernel() -> Self {
        Self {
            privilege: Privilege::Kernel,
            cache: CachePolicy::WriteBack,
        }
    }

    /// User mapping with the default write-back policy.
    #[must_use]
    pub const fn user() -> Self {
        Self {
            privilege: Privilege::User,
            cache: CachePolicy::WriteBack,
        }
    }

    #[must_use]
    pub const fn with_cache(self, cache: CachePolicy) -> Self {
        Self { cache, ..self }
    }
}

/// A level-3 page descriptor mapping one 4 KiB frame.
///
/// ### Bit layout (VMSAv8-64, 4 KiB granule)
///
/// | Bits  | Name           | Meaning |
/// |-------|----------------|----------|
/// | 0–1   | descriptor     | `0b11` marks a valid page descriptor |
/// | 2–4   | `AttrIndx`     | index into `MAIR_EL1` (memory type) |
/// | 5     | `NS`           | non-secure output address |
/// | 6     | `AP[1]`        | EL0 access allowed |
/// | 7     | `AP[2]`        | write access removed (read-only) |
/// | 8–9   | `SH`           | shareability domain |
/// | 10    | `AF`           | access flag; clear faults on first touch |
/// | 11    | `nG`           | not global (ASID-tagged in the TLB) |
/// | 12–47 | output address | physical frame bits \[47:12\] |
/// | 48–50 | reserved       | res0 |
/// | 51    | `DBM`          | dirty-bit modifier |
/// | 52    | `Contiguous`   | contiguous-range hint |
/// | 53    | `PXN`          | privileged execute-never |
/// | 54    | `UXN`          | unprivileged execute-never |
/// | 55–57 | software       | read/write/noexec intent mirror |
/// | 58–63 | software/PBHA  | ignored by the walk |
///
/// The software bits 55..=57 shadow the abstract intent so the fault path
/// can reconstruct it without consulting frontend state.
#[bitfield(u64, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct LeafEntry {
    /// Bits 0–1 — descriptor type; `0b11` is a valid page at level 3.
    #[bits(2)]
    pub descriptor: u8,

    /// Bits 2–4 — AttrIndx: `MAIR_EL1` slot naming the memory type.
    #[bits(3)]
    pub memory_index: u8,

    /// Bit 5 — NS: output address is in the non-secure space.
    pub ns: bool,

    /// Bit 6 — AP\[1\]: EL0 may access this page.
    pub el0_accessible: bool,

    /// Bit 7 — AP\[2\]: write access removed at every level.
    pub read_only: bool,

    /// Bits 8–9 — SH: shareability of the mapped memory.
    #[bits(2)]
    pub shareability: u8,

    /// Bit 10 — AF: access flag.
    ///
    /// A clear flag makes the first access fault instead of translate.
    pub access_flag: bool,

    /// Bit 11 — nG: translation is ASID-specific, not global.
    pub not_global: bool,

    /// Bits 12–47 — physical frame bits \[47:12\].
    #[bits(36)]
    frame_47_12: u64,

    /// Bits 48–50 — Reserved (res0).
    #[bits(3)]
    pub reserved0: u8,

    /// Bit 51 — DBM: dirty-bit modifier.
    pub dbm: bool,

    /// Bit 52 — Contiguous: entry is part of a contiguous aligned range.
    pub contiguous: bool,

    /// Bit 53 — PXN: no instruction fetch at EL1.
    pub pxn: bool,

    /// Bit 54 — UXN: no instruction fetch at EL0.
    pub uxn: bool,

    /// Bit 55 — software: mapping was requested readable.
    pub sw_read: bool,

    /// Bit 56 — software: mapping was requested writable.
    pub sw_write: bool,

    /// Bit 57 — software: mapping was requested non-executable.
    pub sw_noexec: bool,

    /// Bits 58–63 — software spare and PBHA; unused.
    #[bits(6)]
    pub reserved1: u8,
}

impl LeafEntry {
    /// Descriptor-type value of a valid level-3 page.
    pub const PAGE_DESCRIPTOR: u8 = 0b11;

    /// Build a hardware-ready leaf entry.
    ///
    /// Looks the attribute bits up from the protection table, merges the
    /// frame address and the memory-type index, and applies the privilege
    /// context. User mappings come up with the access flag clear, so the
    /// first touch takes a fault rather than a translation.
    #[must_use]
    pub const fn build(frame: PhysicalPage<Size4K>, prot: VmProt, flags: EntryFlags) -> Self {
        let entry = protection_bits(prot)
            .with_frame(frame)
            .with_memory_index(flags.cache.memory_index());
        match flags.privilege {
            Privilege::Kernel => entry,
            Privilege::User => entry.with_el0_accessible(true).with_access_flag(false),
        }
    }

    /// Recompute the protection of an existing entry for `prot`.
    ///
    /// Replaces the permission, access-flag, and execute-never groups with
    /// the table's bits for `prot` while keeping the frame address, memory
    /// type, shareability, and the EL0-visibility bit exactly as they
    /// were. Idempotent for a fixed `prot`.
    #[must_use]
    pub const fn reprotect(self, prot: VmProt) -> Self {
        let kept = self
            .with_read_only(false)
            .with_el0_accessible(false)
            .with_pxn(false)
            .with_uxn(false)
            .with_sw_read(false)
            .with_sw_write(false)
            .with_sw_noexec(false)
            .with_access_flag(false);
        Self::from_bits(protection_bits(prot).into_bits() | kept.into_bits())
            .with_el0_accessible(self.el0_accessible())
    }

    /// Physical address of the mapped frame.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.frame_47_12() << 12)
    }

    #[inline]
    #[must_use]
    pub(crate) const fn with_frame(self, frame: PhysicalPage<Size4K>) -> Self {
        // store bits [47:12]; the page type guarantees the low bits are zero
        self.with_frame_47_12(frame.base().as_u64() >> 12)
    }
}

/// An interior descriptor naming the next-level table.
///
/// ### Bit layout (VMSAv8-64, 4 KiB granule)
///
/// | Bits  | Name        | Meaning |
/// |-------|-------------|----------|
/// | 0–1   | descriptor  | `0b11` marks a valid table descriptor |
/// | 2–3   | level tag   | software level marker (hardware ignores 11:2) |
/// | 4–11  | ignored     | available to software |
/// | 12–47 | table base  | next-level table bits \[47:12\] |
/// | 48–50 | reserved    | res0 |
/// | 51–58 | ignored     | available to software |
/// | 59    | `PXNTable`  | hierarchical privileged execute-never |
/// | 60    | `UXNTable`  | hierarchical execute-never |
/// | 61–62 | `APTable`   | hierarchical access-permission limit |
/// | 63    | `NSTable`   | security state of the next levels |
///
/// The walk treats every valid table descriptor identically; the level
/// tag exists so software can tell which level a descriptor was built
/// for when debugging a walk by hand.
#[bitfield(u64, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct TableEntry {
    /// Bits 0–1 — descriptor type; `0b11` is a valid table pointer.
    #[bits(2)]
    pub descriptor: u8,

    /// Bits 2–3 — software level tag; see [`TableEntry::for_level`].
    #[bits(2)]
    pub level_tag: u8,

    /// Bits 4–11 — ignored by hardware.
    #[bits(8)]
    pub ignored0: u8,

    /// Bits 12–47 — next-level table physical base bits \[47:12\].
    #[bits(36)]
    table_47_12: u64,

    /// Bits 48–50 — Reserved (res0).
    #[bits(3)]
    pub reserved0: u8,

    /// Bits 51–58 — ignored by hardware.
    #[bits(8)]
    pub ignored1: u8,

    /// Bit 59 — PXNTable: forbid EL1 execution below this table.
    pub pxn_table: bool,

    /// Bit 60 — UXNTable: forbid EL0 execution below this table.
    pub uxn_table: bool,

    /// Bits 61–62 — APTable: access-permission limit for lower levels.
    #[bits(2)]
    pub ap_table: u8,

    /// Bit 63 — NSTable: next levels live in the non-secure space.
    pub ns_table: bool,
}

impl TableEntry {
    /// Descriptor-type value of a valid table pointer.
    pub const TABLE_DESCRIPTOR: u8 = 0b11;

    /// Build a descriptor pointing at the next-level table for `level`.
    ///
    /// Levels 0 and 1 carry distinct tags; level 2 is the deepest interior
    /// level, and every level at or beyond it shares the terminal tag.
    /// Total over all levels.
    #[must_use]
    pub const fn for_level(level: usize, table: PhysicalPage<Size4K>) -> Self {
        let tag = match level {
            0 => 0,
            1 => 1,
            _ => 2,
        };
        Self::new()
            .with_descriptor(Self::TABLE_DESCRIPTOR)
            .with_level_tag(tag)
            .with_table(table)
    }

    /// Physical address of the next-level table.
    #[inline]
    #[must_use]
    pub const fn table(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.table_47_12() << 12)
    }

    #[inline]
    #[must_use]
    const fn with_table(self, table: PhysicalPage<Size4K>) -> Self {
        self.with_table_47_12(table.base().as_u64() >> 12)
    }
}
