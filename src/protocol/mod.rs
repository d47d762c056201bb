//! Serial OTA wire protocol
//!
//! This module provides the frame format, command vocabulary, CRC engine and
//! codec shared by the host-side transfer engine and the device-role receiver.
//!
//! # Wire Format
//!
//! ```text
//! Frame := 0x55 0xAA CMD LEN_HI LEN_LO PAYLOAD[LEN] CRC_HI CRC_LO
//! CMD   := START(0x01) | DATA(0x02) | END(0x03) | ABORT(0x04)
//! Reply := ACK(0x06) | NAK(0x15)
//! ```
//!
//! The checksum covers the payload only.

mod codec;
mod crc;
mod decoder;
mod error;
mod frame;
mod types;

pub use codec::{decode, encode};
pub use crc::{Crc16, crc16};
pub use decoder::{DecodeEvent, FrameDecoder};
pub use error::{Error, Result};
pub use frame::Frame;
pub use types::{Command, Reply};

/// Two-byte marker opening every frame
pub const PREAMBLE: [u8; 2] = [0x55, 0xAA];

/// Header size in bytes (preamble + command + length)
pub const HEADER_SIZE: usize = 5;

/// Checksum size in bytes
pub const CHECKSUM_SIZE: usize = 2;

/// Minimum frame size (header + checksum, empty payload)
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + CHECKSUM_SIZE;

/// Largest payload the 16-bit length field can describe
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Payload limit enforced by the reference device firmware
pub const DEVICE_MAX_PAYLOAD: usize = 1024;
