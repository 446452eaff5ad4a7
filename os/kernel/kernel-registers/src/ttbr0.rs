use crate::{LoadRegisterUnsafe, StoreRegisterUnsafe};
use bitfield_struct::bitfield;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, Size4K};

/// `TTBR0_EL1` — Translation Table Base Register 0.
///
/// Holds the physical base address of the level-0 translation table for the
/// lower (user) half, together with the ASID that tags its TLB entries when
/// `TCR_EL1.A1` is clear.
#[bitfield(u64, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct Ttbr0 {
    /// Bit 0 — CnP: Common not Private.
    ///
    /// When set, the tables may be shared with other cores that also set
    /// CnP for the same base.
    pub cnp: bool,

    /// Bits 1–47 — BADDR: level-0 table physical base >> 1.
    ///
    /// The register stores bits 47:1 of the table base. With 4 KiB-aligned
    /// tables the low bits are zero, so the raw register value equals
    /// `(asid << 48) | table_base`.
    #[bits(47)]
    baddr: u64,

    /// Bits 48–63 — ASID: address space identifier for this regime.
    #[bits(16)]
    pub asid: u16,
}

impl Ttbr0 {
    /// Bit position of the ASID field within the raw register value.
    pub const ASID_SHIFT: u32 = 48;

    /// Create a `Ttbr0` value from a level-0 table page and an ASID.
    ///
    /// The page type guarantees 4 KiB alignment, so no address bits are
    /// lost in the BADDR encoding.
    #[must_use]
    pub const fn from_root(root: PhysicalPage<Size4K>, asid: u16) -> Self {
        Self::new()
            .with_baddr(root.base().as_u64() >> 1)
            .with_asid(asid)
    }

    /// Return the full physical address of the level-0 table base.
    #[must_use]
    pub const fn root_phys(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.baddr() << 1)
    }
}

#[cfg(all(feature = "asm", target_arch = "aarch64"))]
impl LoadRegisterUnsafe for Ttbr0 {
    unsafe fn load_unsafe() -> Self {
        let ttbr0: u64;
        unsafe {
            core::arch::asm!("mrs {}, ttbr0_el1", out(reg) ttbr0, options(nomem, nostack, preserves_flags));
        }
        Self::from_bits(ttbr0)
    }
}

#[cfg(all(feature = "asm", target_arch = "aarch64"))]
impl StoreRegisterUnsafe for Ttbr0 {
    unsafe fn store_unsafe(self) {
        let ttbr0 = self.into_bits();
        // The isb orders the base switch against the walk reconfiguration
        // that usually follows.
        unsafe {
            core::arch::asm!(
                "msr ttbr0_el1, {}",
                "isb",
                in(reg) ttbr0,
                options(nostack, preserves_flags)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(pa: u64) -> PhysicalPage<Size4K> {
        PhysicalPage::from_addr(PhysicalAddress::new(pa))
    }

    #[test]
    fn raw_value_is_asid_shifted_or_base() {
        let ttbr0 = Ttbr0::from_root(page(0x8_0000), 5);
        assert_eq!(ttbr0.into_bits(), (5 << Ttbr0::ASID_SHIFT) | 0x8_0000);
    }

    #[test]
    fn base_round_trips_through_baddr() {
        let ttbr0 = Ttbr0::from_root(page(0x0000_7FFF_FFFF_F000), 0xFFFF);
        assert_eq!(ttbr0.root_phys().as_u64(), 0x0000_7FFF_FFFF_F000);
        assert_eq!(ttbr0.asid(), 0xFFFF);
    }

    #[test]
    fn zero_asid_keeps_high_bits_clear() {
        let ttbr0 = Ttbr0::from_root(page(0x4000_0000), 0);
        assert_eq!(ttbr0.into_bits() >> Ttbr0::ASID_SHIFT, 0);
        assert_eq!(ttbr0.into_bits(), 0x4000_0000);
    }
}
