//! CLI argument parsing

use clap::Parser;
use flash_updater_core::DEFAULT_CHUNK_SIZE;
use std::path::PathBuf;

/// Parse a non-zero byte count given as hex or decimal
fn parse_chunk_size(s: &str) -> Result<usize, String> {
    let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))?
    } else {
        s.parse::<usize>()
            .map_err(|e| format!("Invalid number: {}", e))?
    };

    if value == 0 {
        return Err("Chunk size must be greater than zero".to_string());
    }
    Ok(value)
}

#[derive(Parser, Debug)]
#[command(name = "flash-updater")]
#[command(author, version, about = "Write a firmware image to a flash partition", long_about = None)]
#[command(after_help = "Example: flash-updater firmware.img /dev/mtdblock1")]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Bytes moved per read/write (hex or decimal)
    #[arg(long, value_parser = parse_chunk_size, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Don't erase MTD partitions before writing
    #[arg(long)]
    pub no_erase: bool,

    /// Firmware image to write
    pub firmware: PathBuf,

    /// Flash partition to overwrite (e.g. /dev/mtd1, /dev/mtdblock1)
    pub partition: PathBuf,
}
