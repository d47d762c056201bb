//! Session configuration.

use std::time::Duration;

use super::error::TransferError;
use crate::protocol::MAX_PAYLOAD_SIZE;
use crate::transport::DEFAULT_POLL_INTERVAL;

/// Default DATA payload size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Default per-handshake reply window.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default serial baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 2_000_000;

/// Default pause between opening the port and sending START.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// How failed handshakes are retried.
///
/// Pending input is discarded before every resend. DATA frames carry no
/// offset, so a DATA retry after a timeout or unexpected reply can store the
/// chunk twice if the device had in fact accepted it; the device then refuses
/// END and the session fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    /// Extra attempts after the first one fails (0 = fail immediately).
    pub max_retries: u32,
    /// Pause before each retry.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Never retry.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Retry up to `max_retries` times, pausing `backoff` before each one.
    #[must_use]
    pub const fn retries(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Per-session transfer options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferConfig {
    /// Maximum DATA payload per frame.
    pub chunk_size: usize,
    /// Reply window for each handshake; restarts on every frame.
    pub handshake_timeout: Duration,
    /// Sleep between polls for a reply byte.
    pub poll_interval: Duration,
    /// Retry behavior for NAK, timeout and unexpected replies.
    pub retry: RetryPolicy,
    /// Send ABORT when a session fails after START was acknowledged.
    pub abort_on_failure: bool,
}

impl TransferConfig {
    /// Check the options before any byte is sent.
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.chunk_size == 0 {
            return Err(TransferError::InvalidConfig(
                "chunk size must be at least 1 byte".into(),
            ));
        }
        if self.chunk_size > MAX_PAYLOAD_SIZE {
            return Err(TransferError::InvalidConfig(format!(
                "chunk size {} exceeds the frame limit of {MAX_PAYLOAD_SIZE} bytes",
                self.chunk_size
            )));
        }
        if self.handshake_timeout.is_zero() {
            return Err(TransferError::InvalidConfig(
                "handshake timeout must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry: RetryPolicy::default(),
            abort_on_failure: true,
        }
    }
}
