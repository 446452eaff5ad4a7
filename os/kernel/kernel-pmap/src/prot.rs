//! Protection intents and their hardware encoding.
//!
//! The MMU grants an access only when the right combination of bits is
//! present in the leaf entry; anything else takes a fault. What "right"
//! means per access:
//!
//! | access       | AF | USER | RO | XN |
//! |--------------|----|------|----|----|
//! | user read    | 1  | 1    | any| any|
//! | user write   | 1  | 1    | 0  | any|
//! | user exec    | 1  | 1    | any| 0  |
//! | kernel read  | 1  | any  | any| any|
//! | kernel write | 1  | any  | 0  | any|
//! | kernel exec  | 1  | any  | any| 0  |
//!
//! [`PROT_ATTR`] centralizes that mapping as one constant table indexed by
//! the intent bits, so descriptor construction elsewhere is plain
//! arithmetic. The table also mirrors each intent into software-reserved
//! bits (55..=57) the hardware never reads; the fault path uses those to
//! tell a permission violation from a lazy-mapping miss.

use crate::entry::{LeafEntry, SH_INNER};
use bitflags::bitflags;

bitflags! {
    /// Abstract protection intent for one mapping.
    ///
    /// A bitmask over read, write, and execute; all eight combinations are
    /// meaningful, including empty (a mapping that faults on any access).
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct VmProt: u32 {
        const READ = 0b001;
        const WRITE = 0b010;
        const EXEC = 0b100;
    }
}

impl VmProt {
    /// No access at all.
    pub const NONE: Self = Self::empty();
}

const fn base() -> LeafEntry {
    LeafEntry::new()
        .with_descriptor(LeafEntry::PAGE_DESCRIPTOR)
        .with_shareability(SH_INNER)
}

const fn noexec(e: LeafEntry) -> LeafEntry {
    e.with_pxn(true).with_uxn(true).with_sw_noexec(true)
}

/// Attribute bits required per protection intent, indexed by the raw
/// [`VmProt`] bits.
///
/// Total over the whole 8-value domain. Rows without `READ | WRITE |
/// EXEC` leave the access flag clear, so the very first touch faults.
/// Memory-type index and user visibility are deliberately absent; the
/// builders fill those in from [`EntryFlags`](crate::entry::EntryFlags).
pub(crate) const PROT_ATTR: [LeafEntry; 8] = [
    // NONE
    noexec(base()),
    // READ
    noexec(
        base()
            .with_read_only(true)
            .with_sw_read(true)
            .with_access_flag(true),
    ),
    // WRITE
    noexec(base().with_sw_write(true).with_access_flag(true)),
    // READ | WRITE
    noexec(
        base()
            .with_sw_read(true)
            .with_sw_write(true)
            .with_access_flag(true),
    ),
    // EXEC
    base().with_access_flag(true),
    // READ | EXEC
    base()
        .with_read_only(true)
        .with_sw_read(true)
        .with_access_flag(true),
    // WRITE | EXEC
    base().with_sw_write(true).with_access_flag(true),
    // READ | WRITE | EXEC
    base()
        .with_sw_read(true)
        .with_sw_write(true)
        .with_access_flag(true),
];

/// Attribute bits the MMU needs for `prot`, independent of privilege.
#[inline]
#[must_use]
pub(crate) const fn protection_bits(prot: VmProt) -> LeafEntry {
    PROT_ATTR[prot.bits() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_prots() -> impl Iterator<Item = VmProt> {
        (0..8).map(VmProt::from_bits_truncate)
    }

    #[test]
    fn table_covers_the_whole_domain() {
        for prot in all_prots() {
            let row = protection_bits(prot);
            assert_eq!(row.descriptor(), LeafEntry::PAGE_DESCRIPTOR);
            assert_eq!(row.shareability(), SH_INNER);
        }
    }

    #[test]
    fn access_flag_tracks_reachability() {
        for prot in all_prots() {
            let row = protection_bits(prot);
            assert_eq!(row.access_flag(), prot != VmProt::NONE, "{prot:?}");
        }
    }

    #[test]
    fn software_bits_mirror_the_intent() {
        for prot in all_prots() {
            let row = protection_bits(prot);
            assert_eq!(row.sw_read(), prot.contains(VmProt::READ), "{prot:?}");
            assert_eq!(row.sw_write(), prot.contains(VmProt::WRITE), "{prot:?}");
            assert_eq!(row.sw_noexec(), !prot.contains(VmProt::EXEC), "{prot:?}");
        }
    }

    #[test]
    fn read_only_never_carries_write_permission() {
        for prot in all_prots() {
            let row = protection_bits(prot);
            if prot.contains(VmProt::WRITE) {
                assert!(!row.read_only(), "{prot:?} must stay writable");
            }
            if prot.contains(VmProt::READ) && !prot.contains(VmProt::WRITE) {
                assert!(row.read_only(), "{prot:?} must be read-only");
            }
        }
    }

    #[test]
    fn execute_never_set_exactly_without_exec() {
        for prot in all_prots() {
            let row = protection_bits(prot);
            let exec = prot.contains(VmProt::EXEC);
            assert_eq!(row.pxn(), !exec, "{prot:?}");
            assert_eq!(row.uxn(), !exec, "{prot:?}");
        }
    }

    #[test]
    fn table_never_presets_builder_owned_bits() {
        for prot in all_prots() {
            let row = protection_bits(prot);
            // user visibility, memory type, and the frame belong to the
            // builders; the table leaves them zero
            assert!(!row.el0_accessible(), "{prot:?}");
            assert_eq!(row.memory_index(), 0, "{prot:?}");
            assert_eq!(row.frame().as_u64(), 0, "{prot:?}");
        }
    }
}
