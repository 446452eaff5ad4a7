//! # Typed Virtual and Physical Addresses
//!
//! Strongly typed wrappers for raw memory addresses and page bases used by
//! the paging and physical-map code.
//!
//! ## Overview
//!
//! Mixing up a physical frame address and a virtual address is the classic
//! way to corrupt a page table. This crate makes that a type error while
//! keeping every wrapper a zero-cost `u64`.
//!
//! | Type | Meaning |
//! |------|----------|
//! | [`VirtualAddress`] | An MMU-translated address. |
//! | [`PhysicalAddress`] | An address in RAM or MMIO space. |
//! | [`VirtualPage<S>`] / [`PhysicalPage<S>`] | A page-aligned base for a page of size [`S`](PageSize). |
//! | [`PageOffset<S>`] | A byte offset within a page of size `S`. |
//!
//! Paging code never meets an address of unknown kind: a descriptor holds a
//! physical base, a walk starts from a virtual address, and the direct map
//! converts one into the other explicitly. The wrappers sit directly on
//! `u64`, there is no shared untyped layer to launder one kind into the
//! other.
//!
//! ## Page Sizes
//!
//! With the 4 KiB translation granule, VMSAv8-64 produces three mapping
//! sizes, one per level a walk can terminate at:
//!
//! - [`Size4K`] — 4 KiB page, mapped by a level-3 page descriptor
//! - [`Size2M`] — 2 MiB block, mapped by a level-2 block descriptor
//! - [`Size1G`] — 1 GiB block, mapped by a level-1 block descriptor
//!
//! The [`PageSize`] trait carries [`SIZE`](PageSize::SIZE) and
//! [`SHIFT`](PageSize::SHIFT) for the alignment arithmetic.
//!
//! ## Typical Usage
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let va = VirtualAddress::new(0xFFFF_FF80_0000_1234);
//!
//! // Split into a page base and an in-page offset.
//! let (page, off) = va.split::<Size4K>();
//! assert_eq!(page.base().as_u64(), 0xFFFF_FF80_0000_1000);
//! assert_eq!(off.as_u64(), 0x234);
//!
//! // Join them back to the same address.
//! assert_eq!(page.join(off), va);
//!
//! // Descriptors only accept aligned physical bases; the conversion is
//! // fallible for arbitrary addresses.
//! let pa = PhysicalAddress::new(0x4000_0000);
//! let frame = PhysicalPage::<Size4K>::try_from(pa).unwrap();
//! assert_eq!(frame.base(), pa);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

use core::fmt;
use core::hash::Hash;
use core::marker::PhantomData;
use core::ops::{Add, AddAssign};

/// Keeps `PageSize` closed to the three markers below.
mod sealed {
    pub trait Sealed {}
}

/// Marker trait for supported translation sizes.
pub trait PageSize:
    sealed::Sealed + Clone + Copy + Eq + PartialEq + Ord + PartialOrd + Hash + fmt::Debug
{
    /// Mapping size in bytes (power of two).
    const SIZE: u64;
    /// Number of offset bits, `SIZE == 1 << SHIFT`.
    const SHIFT: u32;
    /// Short human label, used by `Display` impls and error messages.
    const NAME: &'static str;
}

/// 4 KiB page (4096 bytes), the level-3 leaf granule.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Size4K;
impl sealed::Sealed for Size4K {}
impl PageSize for Size4K {
    const SIZE: u64 = 4096;
    const SHIFT: u32 = 12;
    const NAME: &'static str = "4K";
}

/// 2 MiB block (`2_097_152` bytes), a level-2 block mapping.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Size2M;
impl sealed::Sealed for Size2M {}
impl PageSize for Size2M {
    const SIZE: u64 = 2 * 1024 * 1024;
    const SHIFT: u32 = 21;
    const NAME: &'static str = "2M";
}

/// 1 GiB block (`1_073_741_824` bytes), a level-1 block mapping.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Size1G;
impl sealed::Sealed for Size1G {}
impl PageSize for Size1G {
    const SIZE: u64 = 1024 * 1024 * 1024;
    const SHIFT: u32 = 30;
    const NAME: &'static str = "1G";
}

/// Error for conversions that require a page-aligned address.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("address {addr:#018x} is not aligned to a {page} boundary")]
pub struct Misaligned {
    addr: u64,
    page: &'static str,
}

impl Misaligned {
    /// The offending address.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> u64 {
        self.addr
    }
}

/// A byte offset within a page of size `S` (always below `S::SIZE`).
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PageOffset<S: PageSize> {
    value: u64,
    _size: PhantomData<S>,
}

impl<S: PageSize> PageOffset<S> {
    /// Wrap a raw value, keeping only the low `S::SHIFT` bits.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self {
            value: value & (S::SIZE - 1),
            _size: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.value
    }
}

impl<S: PageSize> fmt::Debug for PageOffset<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Offset<{}>({:#X})", S::NAME, self.value)
    }
}

/// Virtual memory address.
///
/// Denotes an address that goes through the MMU. The type does not check
/// canonicality; it only carries the *kind* of address so virtual and
/// physical values cannot be mixed by accident.
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::*;
/// let va = VirtualAddress::new(0xFFFF_FF80_0000_1234);
/// let (vp, off) = va.split::<Size4K>();
/// assert_eq!(vp.join(off), va);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualAddress(u64);

impl VirtualAddress {
    #[inline]
    #[must_use]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Reinterpret as a raw const pointer.
    ///
    /// Dereferencing is only valid while the address is actually mapped.
    #[inline]
    #[must_use]
    pub const fn as_ptr<T>(self) -> *const T {
        self.0 as *const T
    }

    /// Reinterpret as a raw mut pointer.
    #[inline]
    #[must_use]
    pub const fn as_mut_ptr<T>(self) -> *mut T {
        self.0 as *mut T
    }

    /// The page of size `S` containing this address (aligns down).
    #[inline]
    #[must_use]
    pub const fn page<S: PageSize>(self) -> VirtualPage<S> {
        VirtualPage::from_addr(self)
    }

    /// The in-page offset of this address for page size `S`.
    #[inline]
    #[must_use]
    pub const fn offset_in_page<S: PageSize>(self) -> PageOffset<S> {
        PageOffset::new(self.0)
    }

    /// Split into the containing page and the in-page offset.
    #[inline]
    #[must_use]
    pub const fn split<S: PageSize>(self) -> (VirtualPage<S>, PageOffset<S>) {
        (self.page::<S>(), self.offset_in_page::<S>())
    }

    /// Whether the low `S::SHIFT` bits are zero.
    #[inline]
    #[must_use]
    pub const fn is_aligned<S: PageSize>(self) -> bool {
        self.0 & (S::SIZE - 1) == 0
    }
}

impl fmt::Debug for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VA(0x{:016X})", self.0)
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl Add<u64> for VirtualAddress {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign<u64> for VirtualAddress {
    #[inline]
    fn add_assign(&mut self, rhs: u64) {
        self.0 += rhs;
    }
}

/// Physical memory address.
///
/// Denotes an address in RAM or an MMIO region. There is deliberately no
/// pointer conversion here: physical memory is only dereferenceable
/// through a virtual alias, such as the one the direct map provides.
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::*;
/// let pa = PhysicalAddress::new(0x0000_0000_4020_0042);
/// let (pp, off) = pa.split::<Size4K>();
/// assert_eq!(pp.base().as_u64(), 0x4020_0000);
/// assert_eq!(pp.join(off), pa);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u64);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The page of size `S` containing this address (aligns down).
    #[inline]
    #[must_use]
    pub const fn page<S: PageSize>(self) -> PhysicalPage<S> {
        PhysicalPage::from_addr(self)
    }

    /// The in-page offset of this address for page size `S`.
    #[inline]
    #[must_use]
    pub const fn offset_in_page<S: PageSize>(self) -> PageOffset<S> {
        PageOffset::new(self.0)
    }

    /// Split into the containing page and the in-page offset.
    #[inline]
    #[must_use]
    pub const fn split<S: PageSize>(self) -> (PhysicalPage<S>, PageOffset<S>) {
        (self.page::<S>(), self.offset_in_page::<S>())
    }

    /// Whether the low `S::SHIFT` bits are zero.
    #[inline]
    #[must_use]
    pub const fn is_aligned<S: PageSize>(self) -> bool {
        self.0 & (S::SIZE - 1) == 0
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:016X})", self.0)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl Add<u64> for PhysicalAddress {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign<u64> for PhysicalAddress {
    #[inline]
    fn add_assign(&mut self, rhs: u64) {
        self.0 += rhs;
    }
}

/// A virtual page of size `S`, identified by its aligned base.
///
/// The low `S::SHIFT` bits are always zero.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualPage<S: PageSize> {
    base: u64,
    _size: PhantomData<S>,
}

impl<S: PageSize> VirtualPage<S> {
    /// The page containing `addr` (aligns down).
    #[inline]
    #[must_use]
    pub const fn from_addr(addr: VirtualAddress) -> Self {
        Self {
            base: addr.as_u64() & !(S::SIZE - 1),
            _size: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> VirtualAddress {
        VirtualAddress::new(self.base)
    }

    /// Combine with an in-page offset to form a full address.
    #[inline]
    #[must_use]
    pub const fn join(self, off: PageOffset<S>) -> VirtualAddress {
        VirtualAddress::new(self.base + off.as_u64())
    }
}

impl<S: PageSize> fmt::Display for VirtualPage<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}/{}", self.base, S::NAME)
    }
}

impl<S: PageSize> fmt::Debug for VirtualPage<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtualPage<{}>(0x{:016X})", S::NAME, self.base)
    }
}

impl<S: PageSize> TryFrom<VirtualAddress> for VirtualPage<S> {
    type Error = Misaligned;

    #[inline]
    fn try_from(va: VirtualAddress) -> Result<Self, Misaligned> {
        if va.is_aligned::<S>() {
            Ok(va.page())
        } else {
            Err(Misaligned {
                addr: va.as_u64(),
                page: S::NAME,
            })
        }
    }
}

/// A physical page (frame) of size `S`, identified by its aligned base.
///
/// Descriptor builders take this type, so an unaligned frame address is
/// unrepresentable at the hardware boundary.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalPage<S: PageSize> {
    base: u64,
    _size: PhantomData<S>,
}

impl<S: PageSize> PhysicalPage<S> {
    /// The page containing `addr` (aligns down).
    #[inline]
    #[must_use]
    pub const fn from_addr(addr: PhysicalAddress) -> Self {
        Self {
            base: addr.as_u64() & !(S::SIZE - 1),
            _size: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        PhysicalAddress::new(self.base)
    }

    /// Combine with an in-page offset to form a full address.
    #[inline]
    #[must_use]
    pub const fn join(self, off: PageOffset<S>) -> PhysicalAddress {
        PhysicalAddress::new(self.base + off.as_u64())
    }
}

impl<S: PageSize> fmt::Display for PhysicalPage<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}/{}", self.base, S::NAME)
    }
}

impl<S: PageSize> fmt::Debug for PhysicalPage<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalPage<{}>(0x{:016X})", S::NAME, self.base)
    }
}

impl<S: PageSize> TryFrom<PhysicalAddress> for PhysicalPage<S> {
    type Error = Misaligned;

    #[inline]
    fn try_from(pa: PhysicalAddress) -> Result<Self, Misaligned> {
        if pa.is_aligned::<S>() {
            Ok(pa.page())
        } else {
            Err(Misaligned {
                addr: pa.as_u64(),
                page: S::NAME,
            })
        }
    }
}
