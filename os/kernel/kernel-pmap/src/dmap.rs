//! The kernel's direct physical-memory window.
//!
//! Once bootstrapped, every managed physical address has exactly one
//! virtual alias at a fixed offset, so kernel code can reach physical
//! memory without conjuring temporary mappings. The window bounds are
//! fixed exactly once at boot and never move; translation is pure offset
//! arithmetic afterwards.
//!
//! Populating page tables for the window is the frontend's business
//! (large-block mappings); this module only owns the bounds and the
//! arithmetic.

use kernel_info::memory::{DMAP_BASE, DMAP_SIZE};
use kernel_memory_addresses::{PhysicalAddress, VirtualAddress};
use kernel_sync::SyncOnceCell;
use log::info;

/// A linear physical window `[base, end)` aliased at a fixed virtual base.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DmapWindow {
    base: PhysicalAddress,
    end: PhysicalAddress,
    virt: VirtualAddress,
}

impl DmapWindow {
    #[must_use]
    pub const fn new(base: PhysicalAddress, end: PhysicalAddress, virt: VirtualAddress) -> Self {
        assert!(base.as_u64() <= end.as_u64());
        Self { base, end, virt }
    }

    /// First physical address covered by the window.
    #[must_use]
    pub const fn base(&self) -> PhysicalAddress {
        self.base
    }

    /// First physical address past the window.
    #[must_use]
    pub const fn end(&self) -> PhysicalAddress {
        self.end
    }

    /// Virtual address aliasing [`base`](Self::base).
    #[must_use]
    pub const fn virt_base(&self) -> VirtualAddress {
        self.virt
    }

    /// Bytes of physical memory covered.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.end.as_u64() - self.base.as_u64()
    }

    #[must_use]
    pub const fn contains(&self, pa: PhysicalAddress) -> bool {
        pa.as_u64() >= self.base.as_u64() && pa.as_u64() < self.end.as_u64()
    }

    /// The virtual alias of `pa` inside the window.
    ///
    /// # Panics
    /// Panics when `pa` lies outside the window. A caller holding such an
    /// address has no business dereferencing it through the direct map;
    /// continuing would turn a kernel bug into a wild pointer.
    #[must_use]
    pub fn translate(&self, pa: PhysicalAddress) -> VirtualAddress {
        assert!(
            self.contains(pa),
            "{pa:?} outside the direct map [{:?}, {:?})",
            self.base,
            self.end
        );
        self.virt + (pa.as_u64() - self.base.as_u64())
    }
}

static WINDOW: SyncOnceCell<DmapWindow> = SyncOnceCell::new();

/// Fix the direct-map window bounds.
///
/// Runs once at boot, before the first [`phys_to_dmap`] caller. The
/// window covers all physical memory the kernel manages, starting at
/// physical zero, aliased at [`DMAP_BASE`].
///
/// # Panics
/// Panics when called a second time; the window is immutable for the
/// lifetime of the kernel.
pub fn bootstrap_direct_map() {
    let window = DmapWindow::new(
        PhysicalAddress::new(0),
        PhysicalAddress::new(DMAP_SIZE),
        VirtualAddress::new(DMAP_BASE),
    );
    assert!(
        WINDOW.set(window).is_ok(),
        "direct map bootstrapped twice"
    );
    info!(
        "direct map: physical [{:#x}, {:#x}) aliased at {:#x}",
        window.base().as_u64(),
        window.end().as_u64(),
        window.virt_base().as_u64()
    );
}

/// The virtual alias of `pa` inside the direct map.
///
/// # Panics
/// Panics when the window has not been bootstrapped yet or when `pa`
/// falls outside it; both are kernel bugs, not recoverable conditions.
#[must_use]
pub fn phys_to_dmap(pa: PhysicalAddress) -> VirtualAddress {
    let Some(window) = WINDOW.get() else {
        panic!("direct map used before bootstrap");
    };
    window.translate(pa)
}

/// The bootstrapped window, if any.
#[must_use]
pub fn window() -> Option<&'static DmapWindow> {
    WINDOW.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_for_test() -> DmapWindow {
        DmapWindow::new(
            PhysicalAddress::new(0x1000),
            PhysicalAddress::new(0x9000),
            VirtualAddress::new(0xFFFF_FF80_0000_0000),
        )
    }

    #[test]
    fn translation_is_a_fixed_offset() {
        let w = window_for_test();
        assert_eq!(w.translate(PhysicalAddress::new(0x1000)).as_u64(), 0xFFFF_FF80_0000_0000);
        assert_eq!(
            w.translate(PhysicalAddress::new(0x4321)).as_u64(),
            0xFFFF_FF80_0000_3321
        );
    }

    #[test]
    fn last_covered_byte_translates() {
        let w = window_for_test();
        let last = w.translate(PhysicalAddress::new(0x8FFF));
        assert_eq!(last.as_u64(), 0xFFFF_FF80_0000_0000 + w.size() - 1);
    }

    #[test]
    #[should_panic(expected = "outside the direct map")]
    fn one_past_the_end_is_fatal() {
        window_for_test().translate(PhysicalAddress::new(0x9000));
    }

    #[test]
    #[should_panic(expected = "outside the direct map")]
    fn below_the_base_is_fatal() {
        window_for_test().translate(PhysicalAddress::new(0xFFF));
    }

    #[test]
    fn bounds_arithmetic() {
        let w = window_for_test();
        assert_eq!(w.size(), 0x8000);
        assert!(w.contains(PhysicalAddress::new(0x1000)));
        assert!(w.contains(PhysicalAddress::new(0x8FFF)));
        assert!(!w.contains(PhysicalAddress::new(0x9000)));
        assert!(!w.contains(PhysicalAddress::new(0)));
    }
}
