//! In-process link wired to a device-role receiver.

use std::collections::VecDeque;
use std::io;

use super::link::Link;
use crate::device::{FlashSink, Receiver};

/// Link whose far end is a [`Receiver`] running in the same process.
///
/// Bytes written are decoded immediately and the receiver's replies queue up
/// for the host to read, so a full session runs without hardware.
#[derive(Debug)]
pub struct LoopbackLink<S> {
    receiver: Receiver<S>,
    replies: VecDeque<u8>,
    bytes_written: usize,
}

impl<S: FlashSink> LoopbackLink<S> {
    /// Connect to `receiver`.
    pub fn new(receiver: Receiver<S>) -> Self {
        Self {
            receiver,
            replies: VecDeque::new(),
            bytes_written: 0,
        }
    }

    /// Access the receiver.
    pub fn receiver(&self) -> &Receiver<S> {
        &self.receiver
    }

    /// Total bytes the host wrote.
    #[must_use]
    pub const fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Release the receiver.
    pub fn into_receiver(self) -> Receiver<S> {
        self.receiver
    }
}

impl<S: FlashSink> Link for LoopbackLink<S> {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.bytes_written += bytes.len();
        let replies = self.receiver.feed(bytes);
        self.replies.extend(replies.into_iter().map(|reply| reply.as_u8()));
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        Ok(self.replies.len())
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        self.replies
            .pop_front()
            .ok_or_else(|| io::Error::from(io::ErrorKind::WouldBlock))
    }

    fn discard_input(&mut self) -> io::Result<()> {
        self.replies.clear();
        Ok(())
    }
}
