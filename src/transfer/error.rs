//! Transfer error types

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::session::SessionState;
use crate::protocol::{self, Command};
use crate::transport::TransportError;

/// Session-level failures. Every variant ends the session; there is no
/// partial success.
#[derive(Error, Debug)]
pub enum TransferError {
    /// Serial port could not be opened
    #[error("failed to open serial port {port}: {source}")]
    LinkOpen {
        /// Port identifier
        port: String,
        /// Underlying serial port error
        #[source]
        source: serialport::Error,
    },

    /// Firmware image missing or unreadable
    #[error("failed to read firmware image {}: {source}", path.display())]
    ImageRead {
        /// Image path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Image size does not fit the 32-bit START payload
    #[error("firmware image of {size} bytes exceeds the 4 GiB protocol limit")]
    ImageTooLarge {
        /// Image size
        size: usize,
    },

    /// Options rejected before the session began
    #[error("invalid transfer configuration: {0}")]
    InvalidConfig(String),

    /// Device rejected a frame
    #[error("device rejected {command} frame at offset {offset}")]
    Nak {
        /// Rejected command
        command: Command,
        /// Bytes acknowledged before the rejection
        offset: usize,
    },

    /// No reply within the handshake window
    #[error("no reply to {command} frame at offset {offset} within {timeout:?}")]
    Timeout {
        /// Unanswered command
        command: Command,
        /// Bytes acknowledged before the timeout
        offset: usize,
        /// Handshake window
        timeout: Duration,
    },

    /// Reply byte that is neither ACK nor NAK
    #[error("unexpected reply {byte:#04x} to {command} frame at offset {offset}")]
    MalformedReply {
        /// Command being acknowledged
        command: Command,
        /// Bytes acknowledged before the reply
        offset: usize,
        /// Reply byte received
        byte: u8,
    },

    /// Link I/O failure during a handshake
    #[error("link I/O error: {0}")]
    Link(#[source] io::Error),

    /// Frame could not be built
    #[error("frame error: {0}")]
    Frame(#[source] protocol::Error),

    /// Session cancelled by the host
    #[error("transfer aborted at offset {offset}")]
    Aborted {
        /// Bytes acknowledged before the abort
        offset: usize,
    },

    /// Session state machine misuse
    #[error("invalid session transition from {from} to {to}")]
    InvalidTransition {
        /// State the session was in
        from: SessionState,
        /// State that was requested
        to: SessionState,
    },
}

impl From<TransportError> for TransferError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Open { port, source } => Self::LinkOpen { port, source },
            TransportError::Io(err) => Self::Link(err),
            TransportError::Frame(err) => Self::Frame(err),
        }
    }
}

impl TransferError {
    /// Whether the device explicitly or implicitly refused a frame (NAK,
    /// timeout or unexpected reply).
    #[must_use]
    pub const fn is_protocol_failure(&self) -> bool {
        matches!(
            self,
            Self::Nak { .. } | Self::Timeout { .. } | Self::MalformedReply { .. }
        )
    }
}
