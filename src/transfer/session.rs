//! Session state machine.
//!
//! ```text
//! Idle -> Started -> Transferring -> Completed
//!            |            |
//!            +-> Failed <-+
//!            +-> Aborted <+
//! ```
//!
//! Completed, Failed and Aborted are terminal.

use std::fmt;

use tracing::debug;
use uuid::Uuid;

use super::error::TransferError;
use super::progress::Progress;

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Created, nothing sent yet.
    Idle,
    /// Link open and image loaded; START is in flight.
    Started,
    /// START acknowledged; DATA frames (then END) are being sent.
    Transferring,
    /// END acknowledged.
    Completed,
    /// Host cancelled the session.
    Aborted,
    /// A handshake failed.
    Failed,
}

impl SessionState {
    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted | Self::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Started => "started",
            Self::Transferring => "transferring",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// One firmware image on its way to the device.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    state: SessionState,
    firmware_size: u32,
    chunk_size: usize,
    offset: usize,
    chunks_acked: usize,
}

impl Session {
    /// New idle session.
    #[must_use]
    pub fn new(firmware_size: u32, chunk_size: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            firmware_size,
            chunk_size,
            offset: 0,
            chunks_acked: 0,
        }
    }

    /// Session identifier, for log correlation.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Image size announced in START.
    #[must_use]
    pub const fn firmware_size(&self) -> u32 {
        self.firmware_size
    }

    /// DATA payload bound for this session.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Bytes acknowledged so far.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// DATA frames acknowledged so far.
    #[must_use]
    pub const fn chunks_acked(&self) -> usize {
        self.chunks_acked
    }

    /// Total DATA frames in the session.
    #[must_use]
    pub fn total_chunks(&self) -> usize {
        (self.firmware_size as usize).div_ceil(self.chunk_size)
    }

    /// Whether every byte has been acknowledged.
    #[must_use]
    pub fn all_chunks_acked(&self) -> bool {
        self.offset == self.firmware_size as usize
    }

    /// Snapshot for progress reporting.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            chunk: self.chunks_acked,
            total_chunks: self.total_chunks(),
            offset: self.offset,
            total: self.firmware_size as usize,
        }
    }

    /// Idle -> Started.
    pub fn begin(&mut self) -> Result<(), TransferError> {
        self.transition(SessionState::Started, self.state == SessionState::Idle)
    }

    /// Started -> Transferring, after START was acknowledged.
    pub fn start_acknowledged(&mut self) -> Result<(), TransferError> {
        self.transition(
            SessionState::Transferring,
            self.state == SessionState::Started,
        )
    }

    /// Record an acknowledged DATA chunk of `len` bytes.
    pub fn chunk_acknowledged(&mut self, len: usize) -> Result<(), TransferError> {
        let within_image = self.offset + len <= self.firmware_size as usize;
        if self.state != SessionState::Transferring || len == 0 || !within_image {
            return Err(TransferError::InvalidTransition {
                from: self.state,
                to: SessionState::Transferring,
            });
        }
        self.offset += len;
        self.chunks_acked += 1;
        Ok(())
    }

    /// Transferring -> Completed, after END was acknowledged.
    pub fn complete(&mut self) -> Result<(), TransferError> {
        let ready = self.state == SessionState::Transferring && self.all_chunks_acked();
        self.transition(SessionState::Completed, ready)
    }

    /// Any non-terminal state -> Failed.
    pub fn fail(&mut self) -> Result<(), TransferError> {
        self.transition(SessionState::Failed, !self.state.is_terminal())
    }

    /// Started/Transferring -> Aborted.
    pub fn abort(&mut self) -> Result<(), TransferError> {
        let allowed = matches!(
            self.state,
            SessionState::Started | SessionState::Transferring
        );
        self.transition(SessionState::Aborted, allowed)
    }

    fn transition(&mut self, to: SessionState, allowed: bool) -> Result<(), TransferError> {
        if !allowed {
            return Err(TransferError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        debug!(session = %self.id, from = %self.state, %to, offset = self.offset, "session transition");
        self.state = to;
        Ok(())
    }
}
