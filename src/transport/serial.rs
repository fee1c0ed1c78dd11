//! Serial transport implementation

use super::{PortOpener, Transport};
use crate::error::Result;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use std::time::Duration;

/// Serial transport for UART communication
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open a serial port in 8N1 mode
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyS0", "COM1")
    /// * `baud_rate` - Baud rate (e.g., 19200)
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_micros(100)) // 100μs timeout for minimal blocking
            .open()?;

        log::debug!("Opened serial port: {} at {} baud", path, baud_rate);

        Ok(SerialTransport { port })
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        match self.port.read(buffer) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        Ok(self.port.write(data)?)
    }

    fn flush(&mut self) -> Result<()> {
        self.port.flush()?;
        Ok(())
    }

    fn available(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }
}

/// Map a channel identifier to the platform's serial port path
///
/// Channel 0 is `/dev/ttyS0` on Unix and `COM1` on Windows, matching
/// the numbering the Arduino logger documentation uses.
pub fn channel_path(channel: u8) -> String {
    #[cfg(windows)]
    {
        format!("COM{}", u16::from(channel) + 1)
    }
    #[cfg(not(windows))]
    {
        format!("/dev/ttyS{}", channel)
    }
}

/// Opens real serial ports by channel identifier at a fixed baud rate
pub struct SerialOpener {
    baud_rate: u32,
}

impl SerialOpener {
    /// Create an opener for the given baud rate
    pub fn new(baud_rate: u32) -> Self {
        SerialOpener { baud_rate }
    }
}

impl PortOpener for SerialOpener {
    fn open(&mut self, channel: u8) -> Result<Box<dyn Transport>> {
        let path = channel_path(channel);
        let transport = SerialTransport::open(&path, self.baud_rate)?;
        Ok(Box::new(transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_path_numbering() {
        #[cfg(not(windows))]
        {
            assert_eq!(channel_path(0), "/dev/ttyS0");
            assert_eq!(channel_path(19), "/dev/ttyS19");
        }
        #[cfg(windows)]
        {
            assert_eq!(channel_path(0), "COM1");
            assert_eq!(channel_path(19), "COM20");
        }
    }
}
