//! Device-role counterpart of the transfer protocol.
//!
//! Hosts never need this to flash real hardware; it documents the wire
//! contract from the device side and backs the in-process loopback link.

mod receiver;
mod sink;

pub use receiver::Receiver;
pub use sink::{FlashSink, MemorySink, SinkError};
