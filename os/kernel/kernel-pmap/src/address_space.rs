//! User address-space activation.
//!
//! Context switch boils down to two register writes: point `TTBR0_EL1` at
//! the next process's top-level table and let the walker use it. The
//! activator has exactly two reachable states. With no address space the
//! user half is parked via `TCR_EL1.EPD0` and the stale base register is
//! simply never walked; with an address space the base is written first
//! and the walk re-enabled second, so the walker can never pair a fresh
//! ASID with a stale table or vice versa.
//!
//! The register accesses go through [`MmuRegisters`] so everything above
//! the trait stays testable off-target; [`HwMmuRegisters`] is the one
//! implementation that touches the real system registers.

use core::fmt;

use kernel_memory_addresses::{PhysicalPage, Size4K};
use kernel_registers::tcr::Tcr;
use kernel_registers::ttbr0::Ttbr0;
use log::trace;

/// Address-space identifier tagging TLB entries of one context.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Asid(pub u16);

impl fmt::Display for Asid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle naming one user translation context.
///
/// Owned and allocated by the frontend; this crate only reads the two
/// fields to program the hardware.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AddressSpace {
    asid: Asid,
    root: PhysicalPage<Size4K>,
}

impl AddressSpace {
    #[must_use]
    pub const fn new(asid: Asid, root: PhysicalPage<Size4K>) -> Self {
        Self { asid, root }
    }

    #[must_use]
    pub const fn asid(&self) -> Asid {
        self.asid
    }

    /// Physical page holding the level-0 table.
    #[must_use]
    pub const fn root(&self) -> PhysicalPage<Size4K> {
        self.root
    }

    /// The `TTBR0_EL1` value selecting this context.
    #[must_use]
    pub const fn ttbr0(&self) -> Ttbr0 {
        Ttbr0::from_root(self.root, self.asid.0)
    }
}

/// The slice of MMU state the activator needs.
///
/// One implementation talks to the hardware ([`HwMmuRegisters`]); tests
/// substitute a recording fake.
pub trait MmuRegisters {
    fn tcr(&mut self) -> Tcr;
    fn set_tcr(&mut self, tcr: Tcr);
    fn set_ttbr0(&mut self, ttbr0: Ttbr0);
}

/// Switch the user half of the address space.
///
/// `None` parks user-half walks entirely, leaving the base register
/// untouched; idle and early boot run this way. `Some(space)` programs
/// the base register with the context's table and ASID, then re-enables
/// walks.
///
/// The caller must keep the executing core from being preempted for the
/// duration of the call, so no interrupt handler can observe the base and
/// the walk-enable mid-update.
pub fn activate(regs: &mut impl MmuRegisters, space: Option<AddressSpace>) {
    let tcr = regs.tcr();
    match space {
        None => {
            trace!("activate: no user context, parking user-half walks");
            regs.set_tcr(tcr.with_epd0(true));
        }
        Some(space) => {
            trace!("activate: asid {} root {}", space.asid(), space.root());
            // Base first, walk enable second.
            regs.set_ttbr0(space.ttbr0());
            regs.set_tcr(tcr.with_epd0(false));
        }
    }
}

/// The hardware-backed [`MmuRegisters`] implementation.
#[cfg(all(feature = "asm", target_arch = "aarch64"))]
pub struct HwMmuRegisters(());

#[cfg(all(feature = "asm", target_arch = "aarch64"))]
impl HwMmuRegisters {
    /// # Safety
    /// The caller must run at EL1 and may only use the returned value in
    /// contexts where rewriting the translation registers is sound, with
    /// preemption suspended around [`activate`].
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self(())
    }
}

#[cfg(all(feature = "asm", target_arch = "aarch64"))]
impl MmuRegisters for HwMmuRegisters {
    fn tcr(&mut self) -> Tcr {
        use kernel_registers::LoadRegisterUnsafe;
        // SAFETY: constructing Self asserted EL1 execution.
        unsafe { Tcr::load_unsafe() }
    }

    fn set_tcr(&mut self, tcr: Tcr) {
        use kernel_registers::StoreRegisterUnsafe;
        // SAFETY: constructing Self asserted EL1 execution.
        unsafe { tcr.store_unsafe() }
    }

    fn set_ttbr0(&mut self, ttbr0: Ttbr0) {
        use kernel_registers::StoreRegisterUnsafe;
        // SAFETY: constructing Self asserted EL1 execution.
        unsafe { ttbr0.store_unsafe() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_memory_addresses::PhysicalAddress;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        WroteTtbr0(u64),
        WroteTcr(u64),
    }

    struct FakeMmu {
        tcr: Tcr,
        ttbr0: Ttbr0,
        ops: Vec<Op>,
    }

    impl FakeMmu {
        fn new(tcr: Tcr, ttbr0: Ttbr0) -> Self {
            Self {
                tcr,
                ttbr0,
                ops: Vec::new(),
            }
        }
    }

    impl MmuRegisters for FakeMmu {
        fn tcr(&mut self) -> Tcr {
            self.tcr
        }

        fn set_tcr(&mut self, tcr: Tcr) {
            self.tcr = tcr;
            self.ops.push(Op::WroteTcr(tcr.into_bits()));
        }

        fn set_ttbr0(&mut self, ttbr0: Ttbr0) {
            self.ttbr0 = ttbr0;
            self.ops.push(Op::WroteTtbr0(ttbr0.into_bits()));
        }
    }

    fn root(pa: u64) -> PhysicalPage<Size4K> {
        PhysicalPage::from_addr(PhysicalAddress::new(pa))
    }

    #[test]
    fn parking_sets_the_walk_disable_and_keeps_the_base() {
        let before = Ttbr0::from_root(root(0x8_1000), 7);
        let mut mmu = FakeMmu::new(Tcr::new().with_t0sz(16).with_t1sz(16), before);

        activate(&mut mmu, None);

        assert!(mmu.tcr.epd0());
        // the rest of TCR is untouched
        assert_eq!(mmu.tcr.with_epd0(false), Tcr::new().with_t0sz(16).with_t1sz(16));
        // base register byte-for-byte unchanged, and never written
        assert_eq!(mmu.ttbr0, before);
        assert_eq!(mmu.ops, vec![Op::WroteTcr(mmu.tcr.into_bits())]);
    }

    #[test]
    fn activation_programs_the_base_before_enabling_walks() {
        let mut mmu = FakeMmu::new(Tcr::new().with_epd0(true), Ttbr0::new());
        let space = AddressSpace::new(Asid(42), root(0x4020_0000));

        activate(&mut mmu, Some(space));

        let expected_base = (42 << Ttbr0::ASID_SHIFT) | 0x4020_0000;
        assert_eq!(mmu.ttbr0.into_bits(), expected_base);
        assert!(!mmu.tcr.epd0());
        assert_eq!(
            mmu.ops,
            vec![
                Op::WroteTtbr0(expected_base),
                Op::WroteTcr(Tcr::new().into_bits()),
            ]
        );
    }

    #[test]
    fn reactivation_is_driven_by_the_argument_alone() {
        let mut mmu = FakeMmu::new(Tcr::new(), Ttbr0::new());
        let first = AddressSpace::new(Asid(1), root(0x1000));
        let second = AddressSpace::new(Asid(2), root(0x2000));

        activate(&mut mmu, Some(first));
        activate(&mut mmu, None);
        activate(&mut mmu, Some(second));

        assert_eq!(
            mmu.ttbr0.into_bits(),
            (2 << Ttbr0::ASID_SHIFT) | 0x2000
        );
        assert!(!mmu.tcr.epd0());
    }

    #[test]
    fn handle_exposes_its_two_fields() {
        let space = AddressSpace::new(Asid(9), root(0x7000));
        assert_eq!(space.asid(), Asid(9));
        assert_eq!(space.root().base().as_u64(), 0x7000);
        assert_eq!(
            space.ttbr0().into_bits(),
            (9 << Ttbr0::ASID_SHIFT) | 0x7000
        );
    }
}
