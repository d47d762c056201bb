//! Flash sinks receiving the image on the device side.

use thiserror::Error;

/// Errors raised by a flash sink; the receiver answers them with NAK.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// Announced image does not fit the target slot.
    #[error("image of {size} bytes exceeds slot capacity of {capacity} bytes")]
    ImageTooLarge {
        /// Announced image size.
        size: u32,
        /// Slot capacity.
        capacity: u32,
    },

    /// Write would land outside the slot.
    #[error("write of {len} bytes at offset {offset} exceeds slot capacity of {capacity} bytes")]
    OutOfBounds {
        /// Write offset.
        offset: u32,
        /// Write length.
        len: usize,
        /// Slot capacity.
        capacity: u32,
    },

    /// Finish was requested before the announced size was written.
    #[error("image incomplete: {written} of {expected} bytes written")]
    Incomplete {
        /// Bytes written.
        written: u32,
        /// Bytes announced by START.
        expected: u32,
    },
}

/// Destination for image bytes on the device.
pub trait FlashSink {
    /// Prepare the slot for an image of `image_size` bytes.
    fn begin(&mut self, image_size: u32) -> Result<(), SinkError>;

    /// Store `data` at `offset` within the slot.
    fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), SinkError>;

    /// Seal the image once every byte has been written.
    fn finish(&mut self) -> Result<(), SinkError>;

    /// Discard a partially written image.
    fn abort(&mut self) {}
}

/// In-memory slot, used by the loopback link and in tests.
#[derive(Debug, Clone)]
pub struct MemorySink {
    capacity: u32,
    expected: Option<u32>,
    image: Vec<u8>,
    finished: bool,
}

impl MemorySink {
    /// Slot holding at most `capacity` bytes.
    #[must_use]
    pub const fn new(capacity: u32) -> Self {
        Self {
            capacity,
            expected: None,
            image: Vec::new(),
            finished: false,
        }
    }

    /// Bytes written so far.
    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Whether the last image was sealed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Size announced by the last START.
    #[must_use]
    pub const fn expected_size(&self) -> Option<u32> {
        self.expected
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(u32::MAX)
    }
}

impl FlashSink for MemorySink {
    fn begin(&mut self, image_size: u32) -> Result<(), SinkError> {
        if image_size > self.capacity {
            return Err(SinkError::ImageTooLarge {
                size: image_size,
                capacity: self.capacity,
            });
        }
        self.expected = Some(image_size);
        self.image.clear();
        self.finished = false;
        Ok(())
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), SinkError> {
        let end = u64::from(offset) + data.len() as u64;
        if end > u64::from(self.capacity) {
            return Err(SinkError::OutOfBounds {
                offset,
                len: data.len(),
                capacity: self.capacity,
            });
        }
        let start = offset as usize;
        let end = end as usize;
        if self.image.len() < end {
            self.image.resize(end, 0xFF);
        }
        self.image[start..end].copy_from_slice(data);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        let expected = self.expected.unwrap_or(0);
        let written = u32::try_from(self.image.len()).unwrap_or(u32::MAX);
        if written != expected {
            return Err(SinkError::Incomplete { written, expected });
        }
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.expected = None;
        self.image.clear();
        self.finished = false;
    }
}
