//! Transport layer for serial I/O abstraction

use crate::error::Result;

mod serial;
pub mod mock;
pub use serial::{channel_path, SerialOpener, SerialTransport};

/// Transport trait for device communication
///
/// All reads are non-blocking: a read with no data waiting returns
/// `Ok(0)` rather than suspending the caller. Pacing between polls is
/// the caller's responsibility.
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read (0 if none waiting)
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write data from buffer, returns number of bytes written
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Flush any pending writes (blocking until complete)
    fn flush(&mut self) -> Result<()>;

    /// Check if data is available to read
    fn available(&mut self) -> Result<usize> {
        Ok(0) // Default implementation
    }
}

/// Factory for opening transports by channel identifier
///
/// Discovery walks a numeric channel range rather than concrete port
/// paths, so the mapping from identifier to transport sits behind this
/// trait. Tests substitute a scripted opener.
pub trait PortOpener {
    /// Open the transport for a channel, failing if it is busy or absent
    fn open(&mut self, channel: u8) -> Result<Box<dyn Transport>>;
}
