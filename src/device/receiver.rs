//! Device-role frame receiver.

use tracing::{debug, info, warn};

use super::sink::FlashSink;
use crate::protocol::{Command, DEVICE_MAX_PAYLOAD, DecodeEvent, Frame, FrameDecoder, Reply};

/// Receives frames from the host, drives a [`FlashSink`] and produces the
/// single-byte replies the host waits for.
///
/// Replies:
/// - checksum mismatch or unknown command: NAK
/// - START with a payload other than 4 bytes, or refused by the sink: NAK
/// - DATA or END outside a started session: NAK
/// - ABORT: session reset, always ACK
///
/// A length above the decoder limit is dropped silently.
#[derive(Debug)]
pub struct Receiver<S> {
    decoder: FrameDecoder,
    sink: S,
    started: bool,
    complete: bool,
    image_size: u32,
    written: u32,
}

impl<S: FlashSink> Receiver<S> {
    /// Receiver accepting payloads up to [`DEVICE_MAX_PAYLOAD`] bytes.
    pub fn new(sink: S) -> Self {
        Self::with_max_payload(sink, DEVICE_MAX_PAYLOAD)
    }

    /// Receiver accepting payloads up to `max_payload` bytes.
    pub fn with_max_payload(sink: S, max_payload: usize) -> Self {
        Self {
            decoder: FrameDecoder::with_max_payload(max_payload),
            sink,
            started: false,
            complete: false,
            image_size: 0,
            written: 0,
        }
    }

    /// Consume link bytes, returning one reply per completed frame.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Reply> {
        let events = self.decoder.feed(bytes);
        events
            .into_iter()
            .filter_map(|event| self.handle(event))
            .collect()
    }

    fn handle(&mut self, event: DecodeEvent) -> Option<Reply> {
        match event {
            DecodeEvent::Frame(frame) => Some(self.process(&frame)),
            DecodeEvent::ChecksumMismatch {
                command,
                expected,
                found,
            } => {
                warn!(command, expected, found, "checksum mismatch");
                Some(Reply::Nak)
            }
            DecodeEvent::UnknownCommand { byte } => {
                warn!(byte, "unknown command");
                Some(Reply::Nak)
            }
            DecodeEvent::Oversized { len } => {
                warn!(len, "payload length above limit, frame dropped");
                None
            }
        }
    }

    fn process(&mut self, frame: &Frame) -> Reply {
        match frame.command() {
            Command::Start => {
                let Some(image_size) = frame.image_size() else {
                    warn!(len = frame.payload().len(), "START with invalid payload length");
                    return Reply::Nak;
                };
                if let Err(err) = self.sink.begin(image_size) {
                    warn!(%err, "sink refused image");
                    return Reply::Nak;
                }
                info!(image_size, "session started");
                self.started = true;
                self.complete = false;
                self.image_size = image_size;
                self.written = 0;
                Reply::Ack
            }
            Command::Data => {
                if !self.started {
                    warn!("DATA before START");
                    return Reply::Nak;
                }
                let payload = frame.payload();
                if let Err(err) = self.sink.write(self.written, payload) {
                    warn!(%err, offset = self.written, "chunk write failed");
                    return Reply::Nak;
                }
                self.written = self
                    .written
                    .saturating_add(u32::try_from(payload.len()).unwrap_or(u32::MAX));
                debug!(written = self.written, total = self.image_size, "chunk stored");
                Reply::Ack
            }
            Command::End => {
                if !self.started {
                    warn!("END before START");
                    return Reply::Nak;
                }
                if let Err(err) = self.sink.finish() {
                    warn!(%err, "finish failed");
                    return Reply::Nak;
                }
                info!(written = self.written, "session complete");
                self.started = false;
                self.complete = true;
                Reply::Ack
            }
            Command::Abort => {
                warn!(written = self.written, "session aborted by host");
                self.sink.abort();
                self.reset();
                Reply::Ack
            }
        }
    }

    /// Return to the idle state, dropping any partial frame.
    pub fn reset(&mut self) {
        self.decoder.reset();
        self.started = false;
        self.complete = false;
        self.image_size = 0;
        self.written = 0;
    }

    /// Whether a START has been accepted and no END/ABORT followed.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Whether the last session ended with an accepted END.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Bytes stored in the current session.
    #[must_use]
    pub const fn written(&self) -> u32 {
        self.written
    }

    /// Image size announced by the current session.
    #[must_use]
    pub const fn image_size(&self) -> u32 {
        self.image_size
    }

    /// Access the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Release the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
