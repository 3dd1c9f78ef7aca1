//! flash-updater - Write a firmware image to a flash partition
//!
//! Usage: `flash-updater <FIRMWARE> <PARTITION>`
//!
//! MTD character devices (`/dev/mtdN`) are erased first; any other target,
//! including `/dev/mtdblockN`, is written directly. The image is then copied
//! in fixed-size chunks, flushed and synced.
//!
//! Diagnostics go to stderr as `LEVEL: message` lines. On success a single
//! confirmation line is printed to stdout. Any fatal error exits with 1;
//! erase and sync failures are only logged.

mod cli;

use clap::Parser;
use cli::Cli;
use flash_updater_core::{flash_image, FlashConfig, FlashRequest};
use flash_updater_linux_mtd::MtdEraser;
use log::{Level, LevelFilter};
use std::io::Write;
use std::process::ExitCode;

/// Printed to stdout once the image is fully written and flushed
const SUCCESS_LINE: &str = "Firmware written successfully";

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version go to stdout and are not failures
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logger(cli.verbose);

    let request = FlashRequest::new(cli.firmware, cli.partition);
    let config = FlashConfig::default()
        .with_chunk_size(cli.chunk_size)
        .with_erase(!cli.no_erase);

    match flash_image(&request, &config, MtdEraser) {
        Ok(report) => {
            println!("{}", SUCCESS_LINE);
            log::info!("Total bytes written: {}", report.bytes_written);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the stderr logger with `LEVEL: message` lines
fn init_logger(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    // Set log level based on verbosity
    match verbose {
        0 => {} // default (info, or RUST_LOG)
        1 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }

    builder
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => "ERROR",
                Level::Warn => "WARNING",
                Level::Info => "INFO",
                Level::Debug => "DEBUG",
                Level::Trace => "TRACE",
            };
            writeln!(buf, "{}: {}", level, record.args())
        })
        .init();
}
