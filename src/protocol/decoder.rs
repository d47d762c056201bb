//! Streaming frame decoder
//!
//! Consumes link bytes one at a time, resynchronising on the preamble, so a
//! receiver can act on frames as they complete without buffering the stream.

use bytes::BytesMut;
use tracing::trace;

use super::{Command, Crc16, DEVICE_MAX_PAYLOAD, Frame, PREAMBLE};

/// Outcome of a completed (or discarded) frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// Checksum-valid frame with a known command
    Frame(Frame),
    /// Frame whose payload CRC does not match its checksum field
    ChecksumMismatch {
        /// Raw command byte
        command: u8,
        /// CRC recomputed over the received payload
        expected: u16,
        /// Checksum carried by the frame
        found: u16,
    },
    /// Checksum-valid frame with a command outside the vocabulary
    UnknownCommand {
        /// Raw command byte
        byte: u8,
    },
    /// Length field above the decoder's limit; the frame was dropped and the
    /// decoder went back to preamble search
    Oversized {
        /// Announced payload length
        len: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Preamble1,
    Preamble2,
    Command,
    LenHi,
    LenLo,
    Payload,
    CrcHi,
    CrcLo,
}

/// Byte-at-a-time frame decoder
#[derive(Debug)]
pub struct FrameDecoder {
    state: State,
    max_payload: usize,
    command: u8,
    len: usize,
    payload: BytesMut,
    crc: Crc16,
    checksum_hi: u8,
}

impl FrameDecoder {
    /// Decoder accepting payloads up to [`DEVICE_MAX_PAYLOAD`] bytes
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_payload(DEVICE_MAX_PAYLOAD)
    }

    /// Decoder accepting payloads up to `max_payload` bytes
    #[must_use]
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self {
            state: State::Preamble1,
            max_payload,
            command: 0,
            len: 0,
            payload: BytesMut::with_capacity(max_payload),
            crc: Crc16::new(),
            checksum_hi: 0,
        }
    }

    /// Largest payload accepted
    #[must_use]
    pub const fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Whether the decoder sits between frames
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == State::Preamble1
    }

    /// Drop any partial frame and wait for the next preamble
    pub fn reset(&mut self) {
        self.state = State::Preamble1;
        self.payload.clear();
        self.crc = Crc16::new();
    }

    /// Feed one byte, returning an event when a frame completes
    pub fn push(&mut self, byte: u8) -> Option<DecodeEvent> {
        match self.state {
            State::Preamble1 => {
                if byte == PREAMBLE[0] {
                    self.state = State::Preamble2;
                } else {
                    trace!(byte, "skipping byte outside frame");
                }
            }
            State::Preamble2 => {
                if byte == PREAMBLE[1] {
                    self.state = State::Command;
                } else if byte != PREAMBLE[0] {
                    self.state = State::Preamble1;
                }
            }
            State::Command => {
                self.command = byte;
                self.state = State::LenHi;
            }
            State::LenHi => {
                self.len = usize::from(byte) << 8;
                self.state = State::LenLo;
            }
            State::LenLo => {
                self.len |= usize::from(byte);
                self.payload.clear();
                self.crc = Crc16::new();
                if self.len > self.max_payload {
                    let len = self.len;
                    self.reset();
                    return Some(DecodeEvent::Oversized { len });
                }
                self.state = if self.len == 0 {
                    State::CrcHi
                } else {
                    State::Payload
                };
            }
            State::Payload => {
                self.payload.extend_from_slice(&[byte]);
                self.crc.update_byte(byte);
                if self.payload.len() == self.len {
                    self.state = State::CrcHi;
                }
            }
            State::CrcHi => {
                self.checksum_hi = byte;
                self.state = State::CrcLo;
            }
            State::CrcLo => {
                let found = u16::from_be_bytes([self.checksum_hi, byte]);
                let event = self.complete(found);
                self.reset();
                return Some(event);
            }
        }
        None
    }

    /// Feed a slice, returning every event it completes in order
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<DecodeEvent> {
        bytes.iter().filter_map(|&byte| self.push(byte)).collect()
    }

    fn complete(&mut self, found: u16) -> DecodeEvent {
        let expected = self.crc.finish();
        if expected != found {
            return DecodeEvent::ChecksumMismatch {
                command: self.command,
                expected,
                found,
            };
        }
        match Command::from_u8(self.command) {
            Some(command) => DecodeEvent::Frame(Frame::new(command, self.payload.split().freeze())),
            None => DecodeEvent::UnknownCommand { byte: self.command },
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
