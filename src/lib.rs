//! serial-ota - firmware download over a serial line
//!
//! Host-side implementation of a small framed protocol for pushing a firmware
//! image to a device through a UART, with a stop-and-wait ACK/NAK handshake
//! per frame.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use serial_ota::transfer::{DownloadOptions, download};
//!
//! let options = DownloadOptions::new("/dev/ttyUSB0", "firmware.bin");
//! let report = download(&options, |progress| {
//!     println!("{}%", progress.percent());
//! })?;
//! println!("sent {} bytes", report.bytes);
//! # Ok::<(), serial_ota::transfer::TransferError>(())
//! ```
//!
//! # Layers
//!
//! - [`protocol`] - CRC16-CCITT, frame encoding and a streaming decoder
//! - [`transport`] - byte links (serial, in-process) and the handshake
//! - [`transfer`] - session state machine and the orchestrator
//! - [`device`] - device-role receiver used for loopback and dry runs
//!
//! # Wire format
//!
//! ```text
//! 0x55 0xAA | CMD | LEN_HI LEN_LO | PAYLOAD | CRC_HI CRC_LO
//! ```
//!
//! The CRC16-CCITT checksum covers the payload only.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod device;
pub mod protocol;
pub mod transfer;
pub mod transport;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod logging;

pub use protocol::{Command, Crc16, Error, Frame, FrameDecoder, Reply, Result, crc16};
pub use transfer::{
    CancelToken, DownloadOptions, FirmwareImage, Progress, RetryPolicy, Transfer, TransferConfig,
    TransferError, TransferReport, download,
};
pub use transport::{Handshake, HandshakeOutcome, Link, SerialLink};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
