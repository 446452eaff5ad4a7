//! # Platform Locations
//!
//! MMIO addresses for QEMU's `virt` machine, the only board we target for
//! now. These match the device tree QEMU generates with default options.

/// Physical base of the PL011 UART used for debug output.
pub const UART0_BASE: u64 = 0x0900_0000;

/// Physical base of DRAM.
///
/// The `virt` board maps flash and MMIO below this; RAM starts at 1 GiB.
pub const DRAM_BASE: u64 = 0x4000_0000;

const _: () = {
    assert!(UART0_BASE < DRAM_BASE);
    assert!(UART0_BASE.is_multiple_of(4096));
};
