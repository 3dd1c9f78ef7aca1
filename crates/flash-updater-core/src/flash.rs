//! The full flashing procedure: stat, erase, copy, flush, sync

use crate::config::FlashConfig;
use crate::copy::Copier;
use crate::erase::{EraseOutcome, Eraser, SkipReason};
use crate::error::{Error, Result};
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;

/// What to flash and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashRequest {
    /// Firmware image to read
    pub source: PathBuf,
    /// Partition or device node to overwrite
    pub destination: PathBuf,
}

impl FlashRequest {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Result of asking the OS to commit written data
#[derive(Debug)]
pub enum SyncOutcome {
    Synced,
    /// Non-fatal; flush already pushed the data out of our buffers
    Failed(io::Error),
}

/// Summary of a successful run
#[derive(Debug)]
pub struct FlashReport {
    /// Source size as reported by stat before copying
    pub source_size: u64,
    /// Bytes written to the destination, always equal to `source_size`
    pub bytes_written: u64,
    /// Number of progress lines logged during the copy
    pub progress_lines: u64,
    pub erase: EraseOutcome,
    pub sync: SyncOutcome,
}

/// Write `request.source` to `request.destination`
///
/// The source is stat-ed first; if that fails nothing else is touched. The
/// erase step is best-effort and its outcome is only reported. Any error from
/// opening, copying or flushing is fatal. Files are closed on every path.
pub fn flash_image<E: Eraser>(
    request: &FlashRequest,
    config: &FlashConfig,
    mut eraser: E,
) -> Result<FlashReport> {
    config.validate()?;

    let metadata = fs::metadata(&request.source).map_err(|source| Error::SourceAccess {
        path: request.source.clone(),
        source,
    })?;
    let source_size = metadata.len();
    info!("Firmware size: {} bytes", source_size);

    let erase = if config.erase {
        eraser.erase(&request.destination)
    } else {
        info!("Erase disabled, skipping erase");
        EraseOutcome::Skipped(SkipReason::Disabled)
    };
    debug!("Erase outcome: {:?}", erase);

    let source = File::open(&request.source).map_err(|source| Error::OpenSource {
        path: request.source.clone(),
        source,
    })?;

    let dest = File::create(&request.destination).map_err(|source| Error::OpenDestination {
        path: request.destination.clone(),
        source,
    })?;
    let mut dest = BufWriter::new(dest);

    info!("Writing firmware to flash partition...");
    let stats = Copier::new(config)?.copy(&source, &mut dest, source_size)?;

    let sync = sync_destination(dest.get_ref());

    Ok(FlashReport {
        source_size,
        bytes_written: stats.bytes_written,
        progress_lines: stats.progress_lines,
        erase,
        sync,
    })
}

/// Ask the OS to commit `file` to stable storage, logging failures
pub fn sync_destination(file: &File) -> SyncOutcome {
    match file.sync_all() {
        Ok(()) => SyncOutcome::Synced,
        Err(e) => {
            warn!("fsync failed: {}", e);
            SyncOutcome::Failed(e)
        }
    }
}
