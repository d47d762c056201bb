//! Command-line interface definition.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::logging::LoggingConfig;
use crate::transfer::{
    DEFAULT_BAUD_RATE, DEFAULT_CHUNK_SIZE, DownloadOptions, RetryPolicy, TransferConfig,
    TransferError,
};

/// Download a firmware image to a device over a serial port
#[derive(Parser, Debug)]
#[command(
    name = "serial-ota",
    version,
    about = "Download a firmware image to a device over a serial port",
    long_about = r#"
Sends FIRMWARE to the device on PORT using framed START / DATA / END
commands. Every frame waits for the device's ACK before the next one is
sent; a NAK or a missing reply ends the session.

EXAMPLES:
  serial-ota /dev/ttyUSB0 build/app.bin
  serial-ota COM3 app.bin --baud 115200 --chunk-size 256
  serial-ota --list-ports
"#
)]
pub struct Cli {
    /// Serial port (e.g. /dev/ttyUSB0, COM3)
    #[arg(required_unless_present = "list_ports")]
    pub port: Option<String>,

    /// Firmware image to send
    #[arg(required_unless_present = "list_ports")]
    pub firmware: Option<PathBuf>,

    /// Line speed in baud
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,

    /// Bytes per DATA frame
    #[arg(short, long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Seconds to wait for each ACK
    #[arg(short, long, default_value_t = 5.0)]
    pub timeout: f64,

    /// Extra attempts for a frame that is NAKed or unanswered
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Pause before each retry, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub retry_backoff_ms: u64,

    /// Pause after opening the port, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub settle_ms: u64,

    /// Do not send ABORT when a session fails mid-transfer
    #[arg(long)]
    pub no_abort_on_failure: bool,

    /// Transfer into an in-process device instead of the serial port
    #[arg(long)]
    pub dry_run: bool,

    /// List serial ports and exit
    #[arg(long)]
    pub list_ports: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    pub log_level: String,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Logging options implied by the flags.
    #[must_use]
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            color: !self.no_color,
        }
    }

    /// Session options implied by the flags.
    pub fn transfer_config(&self) -> Result<TransferConfig, TransferError> {
        let handshake_timeout = Duration::try_from_secs_f64(self.timeout).map_err(|_| {
            TransferError::InvalidConfig(format!("invalid timeout {}", self.timeout))
        })?;
        let config = TransferConfig {
            chunk_size: self.chunk_size,
            handshake_timeout,
            retry: RetryPolicy::retries(
                self.retries,
                Duration::from_millis(self.retry_backoff_ms),
            ),
            abort_on_failure: !self.no_abort_on_failure,
            ..TransferConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Download options implied by the flags. Port and firmware must be set.
    pub fn download_options(&self) -> Result<DownloadOptions, TransferError> {
        let (Some(port), Some(firmware)) = (&self.port, &self.firmware) else {
            return Err(TransferError::InvalidConfig(
                "a port and a firmware path are required".into(),
            ));
        };
        let mut options = DownloadOptions::new(port.clone(), firmware.clone());
        options.baud_rate = self.baud;
        options.settle_delay = Duration::from_millis(self.settle_ms);
        options.transfer = self.transfer_config()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_library() {
        let cli = Cli::try_parse_from(["serial-ota", "/dev/ttyUSB0", "fw.bin"]).unwrap();
        let options = cli.download_options().unwrap();

        assert_eq!(options.port, "/dev/ttyUSB0");
        assert_eq!(options.firmware, PathBuf::from("fw.bin"));
        assert_eq!(options.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(options.settle_delay, Duration::from_millis(500));
        assert_eq!(options.transfer, TransferConfig::default());
    }

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "serial-ota",
            "COM3",
            "app.bin",
            "--baud",
            "115200",
            "--chunk-size",
            "256",
            "--timeout",
            "0.5",
            "--retries",
            "2",
            "--retry-backoff-ms",
            "10",
            "--no-abort-on-failure",
        ])
        .unwrap();
        let options = cli.download_options().unwrap();

        assert_eq!(options.baud_rate, 115_200);
        assert_eq!(options.transfer.chunk_size, 256);
        assert_eq!(options.transfer.handshake_timeout, Duration::from_millis(500));
        assert_eq!(
            options.transfer.retry,
            RetryPolicy::retries(2, Duration::from_millis(10))
        );
        assert!(!options.transfer.abort_on_failure);
    }

    #[test]
    fn test_list_ports_needs_no_positionals() {
        let cli = Cli::try_parse_from(["serial-ota", "--list-ports"]).unwrap();
        assert!(cli.list_ports);
        assert!(cli.download_options().is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["serial-ota", "/dev/ttyUSB0"]).is_err());

        let zero_chunk =
            Cli::try_parse_from(["serial-ota", "p", "f", "--chunk-size", "0"]).unwrap();
        assert!(matches!(
            zero_chunk.transfer_config(),
            Err(TransferError::InvalidConfig(_))
        ));

        let negative = Cli::try_parse_from(["serial-ota", "p", "f", "--timeout=-1"]).unwrap();
        assert!(negative.transfer_config().is_err());
    }
}
