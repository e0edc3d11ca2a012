//! Adapting [`SdLogger`]'s byte-sink methods to [`embedded_io::Write`].
//!
//! The telemetry framer elsewhere in the system writes its serialized
//! messages through whatever implements `embedded_io::Write`. [`LoggingSink`]
//! is the adapter that lets it write straight into the logger without
//! knowing about block buffers, multi-write sessions, or the SD card driver.

use embedded_io::{ErrorType, Write};

use super::{SdCardDriver, SdLogger};

/// The narrow byte-sink surface [`SdLogger`] exposes to a telemetry framer,
/// pulled out as a trait so [`LoggingSink`] doesn't need to know about the
/// driver type or the overflow buffer's const generic.
pub trait TelemetrySink {
    /// Whether at least `n` more bytes can be accepted right now.
    fn check_free_space(&mut self, n: usize) -> bool;
    /// Append one byte, assuming the caller already checked for space.
    fn put_byte(&mut self, byte: u8);
    /// Mark the end of one framed message. A no-op for this sink; framing
    /// lives in the bytes themselves.
    fn send_message(&mut self);
}

/// Couples an [`SdLogger`] with the driver its `put_byte`/`check_free_space`
/// need, so the pair together can implement [`TelemetrySink`].
pub struct Coupled<'a, D, const LOGGER_BUFFER_SIZE: usize> {
    /// The logger being written into.
    pub logger: &'a mut SdLogger<LOGGER_BUFFER_SIZE>,
    /// The driver `logger` was last ticked with.
    pub driver: &'a mut D,
}

impl<'a, D: SdCardDriver, const LOGGER_BUFFER_SIZE: usize> TelemetrySink
    for Coupled<'a, D, LOGGER_BUFFER_SIZE>
{
    fn check_free_space(&mut self, n: usize) -> bool {
        self.logger.check_free_space(n)
    }

    fn put_byte(&mut self, byte: u8) {
        self.logger.put_byte(self.driver, byte);
    }

    fn send_message(&mut self) {
        self.logger.send_message();
    }
}

/// An `embedded_io::Write` view of a [`TelemetrySink`].
///
/// `write` accepts bytes one at a time, stopping at the first one
/// [`TelemetrySink::check_free_space`] refuses; this is a faithful
/// byte-for-byte backpressure signal rather than an all-or-nothing gate on
/// the whole buffer. A write that stops partway is not an error: the caller
/// sees a short write, exactly as `embedded_io::Write` intends.
pub struct LoggingSink<T> {
    sink: T,
}

impl<T> LoggingSink<T> {
    /// Wrap a [`TelemetrySink`] for use as an `embedded_io::Write`.
    pub fn new(sink: T) -> Self {
        LoggingSink { sink }
    }

    /// Unwrap back to the underlying sink.
    pub fn into_inner(self) -> T {
        self.sink
    }
}

impl<T: TelemetrySink> ErrorType for LoggingSink<T> {
    type Error = core::convert::Infallible;
}

impl<T: TelemetrySink> Write for LoggingSink<T> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut written = 0;
        for &byte in buf {
            if !self.sink.check_free_space(1) {
                break;
            }
            self.sink.put_byte(byte);
            written += 1;
        }
        Ok(written)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.sink.send_message();
        Ok(())
    }
}
