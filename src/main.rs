//! serial-ota command-line tool.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use serial_ota::cli::Cli;
use serial_ota::logging::init_logging;
use serial_ota::transfer::{
    CancelToken, FirmwareImage, Progress, TransferReport, download, simulate,
};
use serial_ota::transport::available_ports;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&cli.logging()) {
        eprintln!("warning: {err}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.list_ports {
        return list_ports();
    }

    let options = cli.download_options()?;
    let bar = progress_bar()?;
    let on_progress = |progress: &Progress| {
        bar.set_length(progress.total as u64);
        bar.set_position(progress.offset as u64);
    };

    let report = if cli.dry_run {
        let image = FirmwareImage::from_file(&options.firmware)?;
        let (report, committed) = simulate(
            &image,
            &options.transfer,
            &CancelToken::new(),
            on_progress,
        )
        .context("dry run failed")?;
        anyhow::ensure!(
            committed.as_slice() == image.as_bytes().as_ref(),
            "dry run committed image differs from {}",
            options.firmware.display()
        );
        report
    } else {
        download(&options, on_progress)
            .with_context(|| format!("download to {} failed", options.port))?
    };

    bar.finish_and_clear();
    print_summary(&report);
    Ok(())
}

fn list_ports() -> Result<()> {
    let ports = available_ports().context("failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("no serial ports found");
    }
    for port in ports {
        println!("{port}");
    }
    Ok(())
}

fn progress_bar() -> Result<ProgressBar> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {bytes_per_sec}")?
            .progress_chars("█▓░"),
    );
    Ok(bar)
}

fn print_summary(report: &TransferReport) {
    let secs = report.elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        report.bytes as f64 / secs / 1024.0
    } else {
        0.0
    };
    println!(
        "transfer complete: {} bytes in {} chunks, {:.2}s ({rate:.1} KiB/s), {} frames, {} retries",
        report.bytes, report.chunks, secs, report.frames_sent, report.retries
    );
}
