//! One frame out, one reply byte back.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{instrument, trace, warn};

use super::error::TransportError;
use super::link::Link;
use crate::protocol::{self, Command, Reply};

/// Default sleep between polls for a reply byte.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_micros(500);

/// Result of a single handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakeOutcome {
    /// Device acknowledged the frame.
    Ack,
    /// Device rejected the frame.
    Nak,
    /// No reply byte arrived within the window.
    Timeout,
    /// A reply byte that is neither ACK nor NAK.
    Garbage(u8),
}

impl HandshakeOutcome {
    /// Classify a reply byte.
    #[must_use]
    pub const fn from_reply_byte(byte: u8) -> Self {
        match Reply::from_u8(byte) {
            Some(Reply::Ack) => Self::Ack,
            Some(Reply::Nak) => Self::Nak,
            None => Self::Garbage(byte),
        }
    }

    /// Whether the device accepted the frame.
    #[must_use]
    pub const fn is_ack(self) -> bool {
        matches!(self, Self::Ack)
    }
}

impl fmt::Display for HandshakeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ack => write!(f, "ACK"),
            Self::Nak => write!(f, "NAK"),
            Self::Timeout => write!(f, "timeout"),
            Self::Garbage(byte) => write!(f, "unexpected reply {byte:#04x}"),
        }
    }
}

/// Handshake transport over an exclusively owned link.
///
/// Each [`Handshake::send`] performs exactly one write and at most one
/// single-byte read. Retry policy belongs to the caller.
#[derive(Debug)]
pub struct Handshake<L> {
    link: L,
    poll_interval: Duration,
    frames_sent: u64,
}

impl<L: Link> Handshake<L> {
    /// Wrap a link using [`DEFAULT_POLL_INTERVAL`].
    pub fn new(link: L) -> Self {
        Self {
            link,
            poll_interval: DEFAULT_POLL_INTERVAL,
            frames_sent: 0,
        }
    }

    /// Override the poll interval. A zero interval is raised to 1 µs so the
    /// wait loop always yields.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_micros(1));
        self
    }

    /// Poll interval in use.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Number of frames written so far.
    #[must_use]
    pub const fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Send one frame and wait up to `timeout` for the reply byte.
    ///
    /// Link failures are returned as errors; everything the device does (or
    /// does not do) is reported through [`HandshakeOutcome`].
    #[instrument(level = "trace", skip(self, payload), fields(len = payload.len()))]
    pub fn send(
        &mut self,
        command: Command,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<HandshakeOutcome, TransportError> {
        let frame = protocol::encode(command, payload)?;
        self.link.write_all(&frame)?;
        self.link.flush()?;
        self.frames_sent += 1;
        trace!(bytes = frame.len(), "frame written");

        let started = Instant::now();
        loop {
            if self.link.bytes_available()? > 0 {
                let byte = self.link.read_byte()?;
                let outcome = HandshakeOutcome::from_reply_byte(byte);
                if let HandshakeOutcome::Garbage(byte) = outcome {
                    warn!(%command, byte, "unexpected reply byte");
                }
                trace!(%outcome, elapsed = ?started.elapsed(), "reply received");
                return Ok(outcome);
            }
            if started.elapsed() >= timeout {
                return Ok(HandshakeOutcome::Timeout);
            }
            thread::sleep(self.poll_interval);
        }
    }

    /// Access the link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Drop reply bytes still waiting from earlier frames, so the next
    /// [`Handshake::send`] reads only the reply to its own frame.
    pub fn discard_input(&mut self) -> Result<(), TransportError> {
        self.link.discard_input()?;
        trace!("pending input discarded");
        Ok(())
    }

    /// Release the link.
    pub fn into_link(self) -> L {
        self.link
    }
}
