use crate::{uart_fmt, uart_trace};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Routes `log` records to the PL011 debug UART.
pub struct Pl011Logger {
    max_level: LevelFilter,
}

impl Pl011Logger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }

    /// Call this once during early init.
    #[allow(
        static_mut_refs,
        clippy::missing_errors_doc,
        clippy::missing_panics_doc
    )]
    pub fn init(self) -> Result<(), SetLoggerError> {
        // SAFETY: log::set_logger expects &'static Log. Use a leaked boxed (or a static) in kernels.
        // For no-alloc, we'll use a static.
        static mut LOGGER: Option<Pl011Logger> = None;

        // move self into static
        unsafe {
            LOGGER = Some(self);
            // set_logger requires &'static dyn Log
            log::set_logger(LOGGER.as_ref().unwrap() as &'static dyn Log)?;
        }
        log::set_max_level(LevelFilter::Trace);
        Ok(())
    }
}

impl Log for Pl011Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Format: "[LEVEL] target: message\n"
        // Keep allocations out; format directly into uart_trace!
        uart_trace!(
            "[{}] {}: {}\n",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        uart_fmt::uart_flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    fn metadata(level: Level) -> Metadata<'static> {
        Metadata::builder().level(level).target("pmap").build()
    }

    #[test]
    fn records_above_the_threshold_are_dropped() {
        let logger = Pl011Logger::new(LevelFilter::Info);
        assert!(logger.enabled(&metadata(Level::Error)));
        assert!(logger.enabled(&metadata(Level::Info)));
        assert!(!logger.enabled(&metadata(Level::Debug)));
        assert!(!logger.enabled(&metadata(Level::Trace)));
    }

    #[test]
    fn off_disables_everything() {
        let logger = Pl011Logger::new(LevelFilter::Off);
        assert!(!logger.enabled(&metadata(Level::Error)));
    }
}
