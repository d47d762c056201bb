//! Drives one session START -> DATA* -> END over a handshake transport.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, info_span, instrument, warn};
use uuid::Uuid;

use super::config::TransferConfig;
use super::error::TransferError;
use super::image::FirmwareImage;
use super::progress::{CancelToken, Progress};
use super::session::{Session, SessionState};
use crate::protocol::Command;
use crate::transport::{Handshake, HandshakeOutcome, Link};

/// Window used for the best-effort ABORT handshake when unwinding.
const ABORT_TIMEOUT_CAP: Duration = Duration::from_secs(1);

/// Summary of a completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    /// Session identifier.
    pub session_id: Uuid,
    /// Image bytes acknowledged.
    pub bytes: usize,
    /// DATA frames acknowledged.
    pub chunks: usize,
    /// Frames written, including retries.
    pub frames_sent: u64,
    /// Handshakes repeated under the retry policy.
    pub retries: u64,
    /// Wall time from START to the END acknowledgment.
    pub elapsed: Duration,
}

/// Transfer orchestrator.
///
/// Owns the link for the whole session and releases it when [`Transfer::run`]
/// returns, whatever the outcome.
#[derive(Debug)]
pub struct Transfer<L> {
    handshake: Handshake<L>,
    config: TransferConfig,
    cancel: CancelToken,
    retries: u64,
}

impl<L: Link> Transfer<L> {
    /// Create an orchestrator over `link`.
    pub fn new(link: L, config: TransferConfig) -> Result<Self, TransferError> {
        config.validate()?;
        let handshake = Handshake::new(link).with_poll_interval(config.poll_interval);
        Ok(Self {
            handshake,
            config,
            cancel: CancelToken::new(),
            retries: 0,
        })
    }

    /// Observe `token` for cancellation.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Session options in use.
    #[must_use]
    pub const fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Deliver `image`, calling `on_progress` after every acknowledged chunk.
    ///
    /// The observer runs on the transfer thread between handshakes.
    pub fn run<F>(
        mut self,
        image: &FirmwareImage,
        mut on_progress: F,
    ) -> Result<TransferReport, TransferError>
    where
        F: FnMut(&Progress),
    {
        let firmware_size = image.size()?;
        let mut session = Session::new(firmware_size, self.config.chunk_size);
        let span = info_span!("session", id = %session.id());
        let _guard = span.enter();

        info!(
            firmware_size,
            chunk_size = self.config.chunk_size,
            chunks = session.total_chunks(),
            "transfer starting"
        );

        let started = Instant::now();
        session.begin()?;
        let result = self.drive(&mut session, image, &mut on_progress);

        match result {
            Ok(()) => {
                let report = TransferReport {
                    session_id: session.id(),
                    bytes: session.offset(),
                    chunks: session.chunks_acked(),
                    frames_sent: self.handshake.frames_sent(),
                    retries: self.retries,
                    elapsed: started.elapsed(),
                };
                info!(elapsed = ?report.elapsed, frames = report.frames_sent, "transfer complete");
                Ok(report)
            }
            Err(err) => {
                self.unwind(&mut session, &err);
                Err(err)
            }
        }
    }

    fn drive<F>(
        &mut self,
        session: &mut Session,
        image: &FirmwareImage,
        on_progress: &mut F,
    ) -> Result<(), TransferError>
    where
        F: FnMut(&Progress),
    {
        let size_payload = session.firmware_size().to_le_bytes();
        self.exchange(session, Command::Start, &size_payload)?;
        session.start_acknowledged()?;

        for chunk in image.chunks(session.chunk_size()) {
            self.exchange(session, Command::Data, &chunk)?;
            session.chunk_acknowledged(chunk.len())?;
            on_progress(&session.progress());
        }

        self.exchange(session, Command::End, &[])?;
        session.complete()
    }

    /// One handshake under the retry policy. Cancellation is checked before
    /// every attempt.
    #[instrument(level = "debug", skip(self, session, payload), fields(offset = session.offset(), len = payload.len()))]
    fn exchange(
        &mut self,
        session: &mut Session,
        command: Command,
        payload: &[u8],
    ) -> Result<(), TransferError> {
        let policy = self.config.retry;
        let mut attempt = 0;
        loop {
            if self.cancel.is_cancelled() {
                return Err(self.abort(session));
            }

            let outcome = self
                .handshake
                .send(command, payload, self.config.handshake_timeout)?;
            let Some(failure) = self.outcome_error(session, command, outcome) else {
                return Ok(());
            };

            if attempt >= policy.max_retries {
                return Err(failure);
            }
            attempt += 1;
            self.retries += 1;
            warn!(%command, %outcome, attempt, max_retries = policy.max_retries, "handshake failed, retrying");
            if !policy.backoff.is_zero() {
                thread::sleep(policy.backoff);
            }
            // A late reply to the failed attempt must not answer the resend
            self.handshake.discard_input()?;
        }
    }

    /// Map a handshake outcome to the session error it causes, if any.
    fn outcome_error(
        &self,
        session: &Session,
        command: Command,
        outcome: HandshakeOutcome,
    ) -> Option<TransferError> {
        let offset = session.offset();
        match outcome {
            HandshakeOutcome::Ack => None,
            HandshakeOutcome::Nak => Some(TransferError::Nak { command, offset }),
            HandshakeOutcome::Timeout => Some(TransferError::Timeout {
                command,
                offset,
                timeout: self.config.handshake_timeout,
            }),
            HandshakeOutcome::Garbage(byte) => Some(TransferError::MalformedReply {
                command,
                offset,
                byte,
            }),
        }
    }

    /// Cancel the session: send ABORT and move to Aborted.
    fn abort(&mut self, session: &mut Session) -> TransferError {
        warn!(offset = session.offset(), "transfer cancelled, sending ABORT");
        self.send_abort();
        if let Err(err) = session.abort() {
            return err;
        }
        TransferError::Aborted {
            offset: session.offset(),
        }
    }

    /// Move a session that ended in error to its terminal state. The device
    /// is told to stop waiting for DATA when START had been acknowledged.
    fn unwind(&mut self, session: &mut Session, err: &TransferError) {
        if session.state().is_terminal() {
            return;
        }
        let device_expects_more = session.state() == SessionState::Transferring;
        if let Err(transition) = session.fail() {
            debug!(%transition, "session already terminal");
        }
        warn!(%err, offset = session.offset(), "transfer failed");
        if device_expects_more && self.config.abort_on_failure {
            self.send_abort();
        }
    }

    fn send_abort(&mut self) {
        let timeout = self.config.handshake_timeout.min(ABORT_TIMEOUT_CAP);
        match self.handshake.send(Command::Abort, &[], timeout) {
            Ok(HandshakeOutcome::Ack) => debug!("device acknowledged ABORT"),
            Ok(outcome) => debug!(%outcome, "ABORT not acknowledged"),
            Err(err) => debug!(%err, "ABORT could not be sent"),
        }
    }

    /// Release the link without running a session.
    pub fn into_link(self) -> L {
        self.handshake.into_link()
    }
}
