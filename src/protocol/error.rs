//! Protocol error types

use thiserror::Error;

/// Frame codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Frame does not open with 0x55 0xAA
    #[error("invalid preamble: expected 55 aa, got {:02x} {:02x}", found[0], found[1])]
    InvalidPreamble {
        /// Bytes found where the preamble should be
        found: [u8; 2],
    },

    /// Command byte outside the protocol vocabulary
    #[error("unknown command: {byte:#04x}")]
    UnknownCommand {
        /// Offending command byte
        byte: u8,
    },

    /// CRC over the payload does not match the checksum field
    #[error("checksum mismatch: expected {expected:#06x}, got {found:#06x}")]
    ChecksumMismatch {
        /// CRC recomputed over the received payload
        expected: u16,
        /// Checksum carried by the frame
        found: u16,
    },

    /// Payload does not fit the 16-bit length field
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Payload size
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Buffer too small
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
