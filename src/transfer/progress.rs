//! Progress notifications and host-side cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Emitted after every acknowledged DATA frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// DATA frames acknowledged so far.
    pub chunk: usize,
    /// DATA frames in the session.
    pub total_chunks: usize,
    /// Bytes acknowledged so far.
    pub offset: usize,
    /// Image size.
    pub total: usize,
}

impl Progress {
    /// Whole percent acknowledged (`offset * 100 / total`). An empty image
    /// counts as done.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let percent = self.offset as u128 * 100 / self.total as u128;
        u8::try_from(percent).unwrap_or(100)
    }
}

/// Shared flag a host sets to cancel a running session.
///
/// The orchestrator checks it before every handshake; once set, the session
/// sends ABORT and ends in the Aborted state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        let progress = Progress {
            chunk: 3,
            total_chunks: 3,
            offset: 1300,
            total: 1300,
        };
        assert_eq!(progress.percent(), 100);

        let empty = Progress {
            chunk: 0,
            total_chunks: 0,
            offset: 0,
            total: 0,
        };
        assert_eq!(empty.percent(), 100);
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());
    }
}
