//! Byte links carrying frames to the device.

use std::fmt;
use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};
use tracing::debug;

use super::error::TransportError;

/// Read timeout applied to the serial port itself. Reads are only issued once
/// a byte is known to be waiting, so this merely bounds a misbehaving driver.
pub const SERIAL_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Minimal byte link used by the handshake transport.
///
/// Implementations must not buffer writes past [`Link::flush`], and
/// [`Link::read_byte`] is only called after [`Link::bytes_available`]
/// reported at least one byte.
pub trait Link {
    /// Write the whole buffer.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Push any buffered output onto the wire.
    fn flush(&mut self) -> io::Result<()>;

    /// Number of received bytes that can be read without blocking.
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Read exactly one received byte.
    fn read_byte(&mut self) -> io::Result<u8>;

    /// Drop every received byte not yet read.
    fn discard_input(&mut self) -> io::Result<()>;
}

impl<L: Link + ?Sized> Link for &mut L {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        (**self).read_byte()
    }

    fn discard_input(&mut self) -> io::Result<()> {
        (**self).discard_input()
    }
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        (**self).read_byte()
    }

    fn discard_input(&mut self) -> io::Result<()> {
        (**self).discard_input()
    }
}

/// Serial port link backed by the `serialport` crate.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialLink {
    /// Open `port` at `baud_rate` (8N1, no flow control).
    pub fn open(port: &str, baud_rate: u32) -> Result<Self, TransportError> {
        let handle = serialport::new(port, baud_rate)
            .timeout(SERIAL_READ_TIMEOUT)
            .open()
            .map_err(|source| TransportError::Open {
                port: port.to_owned(),
                source,
            })?;
        debug!(port, baud_rate, "serial port opened");
        Ok(Self {
            port: handle,
            name: port.to_owned(),
        })
    }

    /// Port identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialLink")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Link for SerialLink {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        Write::write_all(&mut self.port, bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.port)
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        let waiting = self.port.bytes_to_read().map_err(io::Error::from)?;
        Ok(waiting as usize)
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let mut byte = [0u8; 1];
        self.port.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn discard_input(&mut self) -> io::Result<()> {
        self.port
            .clear(ClearBuffer::Input)
            .map_err(io::Error::from)
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        debug!(port = %self.name, "serial port closed");
    }
}
