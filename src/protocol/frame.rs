//! Frame representation

use bytes::Bytes;

use super::{Command, Result};

/// A command and its payload, as carried by one frame on the link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    command: Command,
    payload: Bytes,
}

impl Frame {
    /// Create a new frame
    pub fn new(command: Command, payload: impl Into<Bytes>) -> Self {
        Self {
            command,
            payload: payload.into(),
        }
    }

    /// START frame announcing an image of `image_size` bytes
    #[must_use]
    pub fn start(image_size: u32) -> Self {
        Self::new(
            Command::Start,
            Bytes::copy_from_slice(&image_size.to_le_bytes()),
        )
    }

    /// DATA frame carrying one chunk
    pub fn data(chunk: impl Into<Bytes>) -> Self {
        Self::new(Command::Data, chunk)
    }

    /// END frame
    #[must_use]
    pub fn end() -> Self {
        Self::new(Command::End, Bytes::new())
    }

    /// ABORT frame
    #[must_use]
    pub fn abort() -> Self {
        Self::new(Command::Abort, Bytes::new())
    }

    /// Get command
    #[must_use]
    pub const fn command(&self) -> Command {
        self.command
    }

    /// Get payload
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Image size announced by a START frame.
    ///
    /// Returns `None` for other commands or when the payload is not exactly
    /// four bytes.
    #[must_use]
    pub fn image_size(&self) -> Option<u32> {
        if self.command != Command::Start {
            return None;
        }
        let bytes: [u8; 4] = self.payload.as_ref().try_into().ok()?;
        Some(u32::from_le_bytes(bytes))
    }

    /// Encode frame to bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        super::encode(self.command, &self.payload)
    }

    /// Decode a frame from the front of `bytes`, returning it with the number
    /// of bytes consumed
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        super::decode(bytes)
    }
}
