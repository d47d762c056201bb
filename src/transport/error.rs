//! Transport-level error types covering link and framing failures.

use std::io;

use thiserror::Error;

use crate::protocol;

/// Unified error type for link and handshake operations.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The serial port could not be opened (missing, busy, no permission).
    #[error("failed to open serial port {port}: {source}")]
    Open {
        /// Port identifier as given by the caller.
        port: String,
        /// Underlying serial port error.
        #[source]
        source: serialport::Error,
    },

    /// Read, write, flush or poll failure on an open link.
    #[error("link I/O error: {0}")]
    Io(#[from] io::Error),

    /// Frame could not be encoded.
    #[error("frame error: {0}")]
    Frame(#[from] protocol::Error),
}
