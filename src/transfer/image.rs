//! Firmware image loading and chunking.

use std::fs;
use std::path::Path;

use bytes::Bytes;

use super::error::TransferError;

/// Firmware image held in memory for the length of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    data: Bytes,
}

impl FirmwareImage {
    /// Wrap bytes already in memory.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Read an image from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TransferError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| TransferError::ImageRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(data))
    }

    /// Image bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &Bytes {
        &self.data
    }

    /// Image length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the image is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Image length as carried by the START frame.
    pub fn size(&self) -> Result<u32, TransferError> {
        u32::try_from(self.data.len())
            .map_err(|_| TransferError::ImageTooLarge { size: self.data.len() })
    }

    /// Number of DATA frames needed at `chunk_size`.
    #[must_use]
    pub fn chunk_count(&self, chunk_size: usize) -> usize {
        self.data.len().div_ceil(chunk_size)
    }

    /// Consecutive chunks of at most `chunk_size` bytes, sharing the image
    /// buffer. Only the last chunk may be shorter.
    pub fn chunks(&self, chunk_size: usize) -> impl Iterator<Item = Bytes> + '_ {
        assert!(chunk_size > 0, "chunk_size must be positive");
        (0..self.data.len())
            .step_by(chunk_size)
            .map(move |start| {
                let end = (start + chunk_size).min(self.data.len());
                self.data.slice(start..end)
            })
    }
}
