//! Host entry points: a session over a real serial port, or against the
//! in-process device.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use tracing::{info, instrument};

use super::config::{DEFAULT_BAUD_RATE, DEFAULT_SETTLE_DELAY, TransferConfig};
use super::error::TransferError;
use super::image::FirmwareImage;
use super::orchestrator::{Transfer, TransferReport};
use super::progress::{CancelToken, Progress};
use crate::device::{MemorySink, Receiver};
use crate::protocol::DEVICE_MAX_PAYLOAD;
use crate::transport::{Link, LoopbackLink, SerialLink};

/// Everything needed to run one download.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Serial port identifier (e.g. `/dev/ttyUSB0`, `COM3`).
    pub port: String,
    /// Firmware image path.
    pub firmware: PathBuf,
    /// Line speed.
    pub baud_rate: u32,
    /// Pause after opening the port, before START.
    pub settle_delay: Duration,
    /// Session options.
    pub transfer: TransferConfig,
    /// Cancellation flag observed between handshakes.
    pub cancel: CancelToken,
}

impl DownloadOptions {
    /// Options with default line and session settings.
    pub fn new(port: impl Into<String>, firmware: impl Into<PathBuf>) -> Self {
        Self {
            port: port.into(),
            firmware: firmware.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            settle_delay: DEFAULT_SETTLE_DELAY,
            transfer: TransferConfig::default(),
            cancel: CancelToken::new(),
        }
    }
}

/// Download a firmware file to the device on `options.port`.
///
/// The image is read and the options validated before the port is opened.
/// The port is closed when this returns, on every path.
#[instrument(skip(options, on_progress), fields(port = %options.port, firmware = %options.firmware.display()))]
pub fn download<F>(options: &DownloadOptions, on_progress: F) -> Result<TransferReport, TransferError>
where
    F: FnMut(&Progress),
{
    options.transfer.validate()?;
    let image = FirmwareImage::from_file(&options.firmware)?;
    image.size()?;

    let mut link = SerialLink::open(&options.port, options.baud_rate)?;
    if !options.settle_delay.is_zero() {
        thread::sleep(options.settle_delay);
    }
    link.discard_input().map_err(TransferError::Link)?;
    info!(baud_rate = options.baud_rate, bytes = image.len(), "port ready");

    Transfer::new(link, options.transfer.clone())?
        .with_cancel_token(options.cancel.clone())
        .run(&image, on_progress)
}

/// Run `image` through a session against an in-process device.
///
/// Returns the report together with the bytes the device committed. The
/// device accepts DATA frames up to the larger of its own limit and the
/// configured chunk size.
pub fn simulate<F>(
    image: &FirmwareImage,
    config: &TransferConfig,
    cancel: &CancelToken,
    on_progress: F,
) -> Result<(TransferReport, Vec<u8>), TransferError>
where
    F: FnMut(&Progress),
{
    config.validate()?;
    let max_payload = config.chunk_size.max(DEVICE_MAX_PAYLOAD);
    let receiver = Receiver::with_max_payload(MemorySink::default(), max_payload);
    let mut link = LoopbackLink::new(receiver);

    let report = Transfer::new(&mut link, config.clone())?
        .with_cancel_token(cancel.clone())
        .run(image, on_progress)?;

    let committed = link.into_receiver().into_sink().image().to_vec();
    Ok((report, committed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = DownloadOptions::new("/dev/ttyUSB0", "fw.bin");

        assert_eq!(options.baud_rate, 2_000_000);
        assert_eq!(options.settle_delay, Duration::from_millis(500));
        assert_eq!(options.transfer, TransferConfig::default());
        assert!(!options.cancel.is_cancelled());
    }

    #[test]
    fn test_missing_firmware_fails_before_port_open() {
        let options = DownloadOptions::new("/dev/does-not-exist", "/no/such/firmware.bin");
        let result = download(&options, |_| {});

        assert!(matches!(result, Err(TransferError::ImageRead { .. })));
    }

    #[test]
    fn test_invalid_config_fails_before_image_read() {
        let mut options = DownloadOptions::new("/dev/does-not-exist", "/no/such/firmware.bin");
        options.transfer.chunk_size = 0;

        let result = download(&options, |_| {});
        assert!(matches!(result, Err(TransferError::InvalidConfig(_))));
    }

    #[test]
    fn test_simulate_with_large_chunks() {
        let firmware: Vec<u8> = (0..5000u32).map(|i| (i * 7) as u8).collect();
        let config = TransferConfig {
            chunk_size: 4096,
            ..TransferConfig::default()
        };

        let (report, committed) = simulate(
            &FirmwareImage::from_bytes(firmware.clone()),
            &config,
            &CancelToken::new(),
            |_| {},
        )
        .unwrap();

        assert_eq!(report.chunks, 2);
        assert_eq!(committed, firmware);
    }
}
