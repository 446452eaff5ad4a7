//! # PL011 Development and Debug Support
//!
//! This crate provides the kernel's early debug output path on QEMU's
//! `virt` board. It routes logging, tracing, and diagnostic text to the
//! board's PL011 UART so messages reach the host terminal from the first
//! instruction onwards.
//!
//! ## Overview
//!
//! Kernel development presents unique debugging challenges: no standard
//! I/O, limited debugging tools, and the need for early-boot diagnostics.
//! On the `virt` board the PL011 at `0x0900_0000` is the one peripheral
//! that is always there, and QEMU forwards everything written to it to the
//! host side with `-serial stdio`.
//!
//! ## Output Mechanism
//!
//! ```text
//! Kernel Code
//!     ↓
//! uart_trace! macro / log::info! etc.
//!     ↓
//! Pl011 (fmt::Write)
//!     ↓
//! UARTDR at UART0_BASE
//!     ↓
//! QEMU -serial backend
//!     ↓
//! Host Terminal/Console
//! ```
//!
//! ## Core Components
//!
//! * **Logger** ([`Pl011Logger`]): a `log::Log` implementation that formats
//!   records as `[LEVEL] target: message` and hands them to the UART.
//! * **Trace Macro** ([`uart_trace!`]): direct output bypassing the logging
//!   framework, for paths that run before the logger exists.
//! * **Output Sink** ([`uart_fmt::Pl011`]): the byte-at-a-time `fmt::Write`
//!   sink over the UART's MMIO window. A spin mutex keeps concurrent
//!   writers from interleaving mid-line.
//!
//! ## Feature System
//!
//! The `enabled` feature (default) compiles the real MMIO path. With the
//! feature disabled every operation becomes a no-op with zero runtime
//! overhead, suitable for production builds.
//!
//! ## QEMU Integration
//!
//! ```bash
//! # Standard invocation with UART output on the terminal
//! qemu-system-aarch64 -M virt -kernel kernel.bin -serial stdio
//!
//! # Redirect to file
//! qemu-system-aarch64 -M virt -kernel kernel.bin -serial file:debug.log
//! ```
//!
//! ## Safety Considerations
//!
//! The writer touches the UART's data and flag registers only, relies on
//! the emulated device's reset state, and never reads the receive side.
//! It assumes the MMIO window is mapped (identity or direct map) at
//! [`UART0_BASE`](kernel_info::platform::UART0_BASE); using it before that
//! mapping exists faults.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod logger;

pub use logger::Pl011Logger;

#[cfg(feature = "enabled")]
pub mod uart_fmt {
    use bitflags::bitflags;
    use core::fmt::{self, Write};
    use kernel_info::platform::UART0_BASE;
    use kernel_sync::SpinMutex;

    bitflags! {
        /// PL011 flag register (FR) bits.
        #[derive(Debug, Copy, Clone, Eq, PartialEq)]
        struct Flags: u32 {
            /// Transmit FIFO full (bit 5).
            const TXFF = 1 << 5;
            /// Transmission in progress (bit 3).
            const BUSY = 1 << 3;
        }
    }

    /// Data register offset.
    const UARTDR: u64 = 0x00;
    /// Flag register offset.
    const UARTFR: u64 = 0x18;

    /// Byte-at-a-time writer over the PL011's MMIO window.
    pub struct Pl011 {
        base: u64,
    }

    impl Pl011 {
        #[must_use]
        pub const fn at(base: u64) -> Self {
            Self { base }
        }

        fn reg(&self, offset: u64) -> *mut u32 {
            (self.base + offset) as *mut u32
        }

        fn flags(&self) -> Flags {
            let fr = unsafe { core::ptr::read_volatile(self.reg(UARTFR)) };
            Flags::from_bits_truncate(fr)
        }

        /// Write one byte, spinning while the transmit FIFO is full.
        pub fn write_byte(&mut self, byte: u8) {
            while self.flags().contains(Flags::TXFF) {
                core::hint::spin_loop();
            }
            unsafe { core::ptr::write_volatile(self.reg(UARTDR), u32::from(byte)) }
        }

        /// Spin until the UART has drained its FIFO onto the wire.
        pub fn flush(&self) {
            while self.flags().contains(Flags::BUSY) {
                core::hint::spin_loop();
            }
        }
    }

    impl Write for Pl011 {
        #[inline]
        fn write_str(&mut self, s: &str) -> fmt::Result {
            for b in s.bytes() {
                self.write_byte(b);
            }
            Ok(())
        }

        #[inline]
        fn write_char(&mut self, c: char) -> fmt::Result {
            // UTF-8 encode without allocation.
            let mut buf = [0u8; 4];
            let s = c.encode_utf8(&mut buf);
            self.write_str(s)
        }
    }

    static UART: SpinMutex<Pl011> = SpinMutex::new(Pl011::at(UART0_BASE));

    #[doc(hidden)]
    pub fn uart_write(args: fmt::Arguments) {
        // Ignore errors; this is best-effort debug output. IRQs stay masked
        // for the write so a handler cannot deadlock on the UART lock.
        #[cfg(target_arch = "aarch64")]
        {
            let mut uart = UART.lock_irq();
            let _ = uart.write_fmt(args);
        }
        #[cfg(not(target_arch = "aarch64"))]
        {
            let mut uart = UART.lock();
            let _ = uart.write_fmt(args);
        }
    }

    #[doc(hidden)]
    pub fn uart_flush() {
        #[cfg(target_arch = "aarch64")]
        UART.lock_irq().flush();
        #[cfg(not(target_arch = "aarch64"))]
        UART.lock().flush();
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn txff_is_bit_5() {
            assert_eq!(Flags::TXFF.bits(), 1 << 5);
        }

        #[test]
        fn busy_is_bit_3() {
            assert_eq!(Flags::BUSY.bits(), 1 << 3);
        }

        #[test]
        fn register_offsets_match_the_pl011() {
            assert_eq!(UARTDR, 0x00);
            assert_eq!(UARTFR, 0x18);
        }

        #[test]
        fn unknown_flag_bits_are_dropped() {
            let flags = Flags::from_bits_truncate(0xFFFF_FFFF);
            assert_eq!(flags, Flags::TXFF | Flags::BUSY);
        }
    }
}

#[cfg(not(feature = "enabled"))]
pub mod uart_fmt {
    use core::fmt;

    #[doc(hidden)]
    pub fn uart_write(_: fmt::Arguments) {
        // no-op when feature disabled
    }

    #[doc(hidden)]
    pub fn uart_flush() {
        // no-op when feature disabled
    }
}

#[macro_export]
macro_rules! uart_trace {
    ($($arg:tt)*) => {{
        // No allocation: `format_args!` builds a lightweight `Arguments`.
        $crate::uart_fmt::uart_write(core::format_args!($($arg)*));
    }};
}
