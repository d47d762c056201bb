//! Host-side transfer: image loading, session state, and the orchestrator
//! that drives START, DATA and END over a handshake transport.

mod config;
mod download;
mod error;
mod image;
mod orchestrator;
mod progress;
mod session;

pub use config::{
    DEFAULT_BAUD_RATE, DEFAULT_CHUNK_SIZE, DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_SETTLE_DELAY,
    RetryPolicy, TransferConfig,
};
pub use download::{DownloadOptions, download, simulate};
pub use error::TransferError;
pub use image::FirmwareImage;
pub use orchestrator::{Transfer, TransferReport};
pub use progress::{CancelToken, Progress};
pub use session::{Session, SessionState};
