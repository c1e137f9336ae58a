//! Transport layer for the dome-controller serial link

use crate::error::Result;

mod mock;
mod serial;
pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Transport trait for dome-controller communication
///
/// A session owns exactly one transport for its lifetime; there are no
/// interleaved writers.
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read (0 on timeout)
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write data from buffer, returns number of bytes written
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Flush any pending writes (blocking until complete)
    fn flush(&mut self) -> Result<()>;

    /// Check how many bytes are available to read
    fn available(&mut self) -> Result<usize>;
}
