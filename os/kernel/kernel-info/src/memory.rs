//! # Memory Layout

/// First virtual address of the kernel half.
///
/// Everything at or above this address translates through `TTBR1_EL1`;
/// addresses in between [`USER_SPACE_TOP`] and this are non-canonical and
/// fault on access.
pub const KERNEL_SPACE_BASE: u64 = 0xffff_0000_0000_0000;

/// Last valid virtual address of the user half.
///
/// Userspace translates through `TTBR0_EL1` and spans 48 bits with
/// `T0SZ = 16`.
pub const USER_SPACE_TOP: u64 = 0x0000_ffff_ffff_ffff;

/// Base of the kernel's direct physical map.
///
/// Physical memory starting at physical zero is visible here at a fixed
/// offset: physical `pa` lives at [`DMAP_BASE`] + `pa`. The window sits in
/// the last 512 GiB of the kernel half.
pub const DMAP_BASE: u64 = 0xffff_ff80_0000_0000;

/// Bytes of physical memory covered by the direct map.
///
/// QEMU's `virt` board puts DRAM at [`DRAM_BASE`](crate::platform::DRAM_BASE)
/// and our machines carry at most 4 GiB, so the window covers the first
/// 4 GiB of the physical address space.
pub const DMAP_SIZE: u64 = 4 * 1024 * 1024 * 1024;

const _: () = {
    assert!(USER_SPACE_TOP < KERNEL_SPACE_BASE);
    assert!(DMAP_BASE >= KERNEL_SPACE_BASE);
    assert!(DMAP_SIZE.is_multiple_of(4096));
    // The window must fit between DMAP_BASE and the top of the VA space.
    assert!(DMAP_SIZE <= u64::MAX - DMAP_BASE + 1);
};
