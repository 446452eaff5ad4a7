use crate::{LoadRegisterUnsafe, StoreRegisterUnsafe};
use bitfield_struct::bitfield;

/// `TCR_EL1` — Translation Control Register.
///
/// Configures both translation regimes at EL1: region sizes, granules,
/// cacheability and shareability of the walks, and the per-regime walk
/// disable bits. The physical-map code mostly cares about [`Tcr::epd0`],
/// which parks the `TTBR0_EL1` regime without touching its base register.
#[bitfield(u64, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct Tcr {
    /// Bits 0–5 — T0SZ: size offset of the `TTBR0_EL1` region.
    ///
    /// The region spans `2^(64 - T0SZ)` bytes; 16 gives the full 48-bit
    /// lower half.
    #[bits(6)]
    pub t0sz: u8,

    /// Bit 6 — Reserved (res0).
    pub reserved0: bool,

    /// Bit 7 — EPD0: walk disable for `TTBR0_EL1`.
    ///
    /// When set, a TLB miss in the lower half raises a translation fault
    /// instead of walking the tables. `TTBR0_EL1` itself is unaffected.
    pub epd0: bool,

    /// Bits 8–9 — IRGN0: inner cacheability for `TTBR0_EL1` walks.
    #[bits(2)]
    pub irgn0: u8,

    /// Bits 10–11 — ORGN0: outer cacheability for `TTBR0_EL1` walks.
    #[bits(2)]
    pub orgn0: u8,

    /// Bits 12–13 — SH0: shareability for `TTBR0_EL1` walks.
    #[bits(2)]
    pub sh0: u8,

    /// Bits 14–15 — TG0: granule size for `TTBR0_EL1` (0b00 = 4 KiB).
    #[bits(2)]
    pub tg0: u8,

    /// Bits 16–21 — T1SZ: size offset of the `TTBR1_EL1` region.
    #[bits(6)]
    pub t1sz: u8,

    /// Bit 22 — A1: ASID source select (0 = `TTBR0_EL1`, 1 = `TTBR1_EL1`).
    pub a1: bool,

    /// Bit 23 — EPD1: walk disable for `TTBR1_EL1`.
    pub epd1: bool,

    /// Bits 24–25 — IRGN1: inner cacheability for `TTBR1_EL1` walks.
    #[bits(2)]
    pub irgn1: u8,

    /// Bits 26–27 — ORGN1: outer cacheability for `TTBR1_EL1` walks.
    #[bits(2)]
    pub orgn1: u8,

    /// Bits 28–29 — SH1: shareability for `TTBR1_EL1` walks.
    #[bits(2)]
    pub sh1: u8,

    /// Bits 30–31 — TG1: granule size for `TTBR1_EL1` (0b10 = 4 KiB).
    #[bits(2)]
    pub tg1: u8,

    /// Bits 32–34 — IPS: intermediate physical address size.
    #[bits(3)]
    pub ips: u8,

    /// Bit 35 — Reserved (res0).
    pub reserved1: bool,

    /// Bit 36 — AS: ASID size (0 = 8 bits, 1 = 16 bits).
    pub asid16: bool,

    /// Bit 37 — TBI0: top-byte ignore for the lower half.
    pub tbi0: bool,

    /// Bit 38 — TBI1: top-byte ignore for the upper half.
    pub tbi1: bool,

    /// Bit 39 — HA: hardware access-flag update.
    pub ha: bool,

    /// Bit 40 — HD: hardware dirty-state update.
    pub hd: bool,

    /// Bit 41 — HPD0: hierarchical permission disable, lower half.
    pub hpd0: bool,

    /// Bit 42 — HPD1: hierarchical permission disable, upper half.
    pub hpd1: bool,

    /// Bits 43–50 — HWU: hardware use of descriptor bits 59–62.
    #[bits(8)]
    pub hwu: u8,

    /// Bit 51 — TBID0: top-byte ignore applies to data accesses only, lower half.
    pub tbid0: bool,

    /// Bit 52 — TBID1: top-byte ignore applies to data accesses only, upper half.
    pub tbid1: bool,

    /// Bit 53 — NFD0: non-fault table walk disable, lower half (SVE).
    pub nfd0: bool,

    /// Bit 54 — NFD1: non-fault table walk disable, upper half (SVE).
    pub nfd1: bool,

    /// Bit 55 — E0PD0: EL0 access to the lower half faults without a walk.
    pub e0pd0: bool,

    /// Bit 56 — E0PD1: EL0 access to the upper half faults without a walk.
    pub e0pd1: bool,

    /// Bit 57 — TCMA0: unchecked accesses for tagged addresses, lower half (MTE).
    pub tcma0: bool,

    /// Bit 58 — TCMA1: unchecked accesses for tagged addresses, upper half (MTE).
    pub tcma1: bool,

    /// Bit 59 — DS: 52-bit output addressing with the 4 KiB granule.
    pub ds: bool,

    /// Bits 60–63 — Reserved (res0).
    #[bits(4)]
    pub reserved2: u8,
}

#[cfg(all(feature = "asm", target_arch = "aarch64"))]
impl LoadRegisterUnsafe for Tcr {
    unsafe fn load_unsafe() -> Self {
        let tcr: u64;
        unsafe {
            core::arch::asm!("mrs {}, tcr_el1", out(reg) tcr, options(nomem, nostack, preserves_flags));
        }
        Self::from_bits(tcr)
    }
}

#[cfg(all(feature = "asm", target_arch = "aarch64"))]
impl StoreRegisterUnsafe for Tcr {
    unsafe fn store_unsafe(self) {
        let tcr = self.into_bits();
        // The isb makes the new walk configuration visible to the next
        // instruction fetch and data access.
        unsafe {
            core::arch::asm!(
                "msr tcr_el1, {}",
                "isb",
                in(reg) tcr,
                options(nostack, preserves_flags)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epd0_is_bit_7() {
        let tcr = Tcr::new().with_epd0(true);
        assert_eq!(tcr.into_bits(), 1 << 7);

        let cleared = Tcr::from_bits(u64::MAX).with_epd0(false);
        assert_eq!(cleared.into_bits(), u64::MAX & !(1 << 7));
    }

    #[test]
    fn epd0_leaves_other_fields_alone() {
        let before = Tcr::new()
            .with_t0sz(16)
            .with_t1sz(16)
            .with_tg1(0b10)
            .with_ips(0b101)
            .with_asid16(true);
        let after = before.with_epd0(true).with_epd0(false);
        assert_eq!(before, after);
    }

    #[test]
    fn field_positions_match_the_architecture() {
        assert_eq!(Tcr::new().with_t0sz(0x3F).into_bits(), 0x3F);
        assert_eq!(Tcr::new().with_t1sz(0x3F).into_bits(), 0x3F << 16);
        assert_eq!(Tcr::new().with_ips(0b111).into_bits(), 0b111 << 32);
        assert_eq!(Tcr::new().with_asid16(true).into_bits(), 1 << 36);
        assert_eq!(Tcr::new().with_ds(true).into_bits(), 1 << 59);
    }
}
