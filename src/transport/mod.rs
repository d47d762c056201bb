//! Links and the handshake transport.

mod error;
mod handshake;
mod link;
mod loopback;

pub use error::TransportError;
pub use handshake::{DEFAULT_POLL_INTERVAL, Handshake, HandshakeOutcome};
pub use link::{Link, SERIAL_READ_TIMEOUT, SerialLink};
pub use loopback::LoopbackLink;

/// List the serial ports the operating system reports.
pub fn available_ports() -> Result<Vec<String>, TransportError> {
    let ports = serialport::available_ports().map_err(std::io::Error::from)?;
    Ok(ports.into_iter().map(|port| port.port_name).collect())
}
