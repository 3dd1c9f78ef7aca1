//! Error types for Linux MTD erase operations

use flash_updater_core::EraseRegion;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Linux MTD erase errors
///
/// None of these abort a run; they end up in
/// [`flash_updater_core::EraseOutcome::Failed`].
#[derive(Debug, Error)]
pub enum MtdError {
    /// Device node could not be opened read/write
    #[error("Cannot open partition {} for erase: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Neither MEMGETINFO nor file metadata gave a size
    #[error("Cannot get partition size of {}: {source}", .path.display())]
    SizeQuery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Device reported a size of zero
    #[error("Partition {} reports a size of 0 bytes", .path.display())]
    EmptyDevice { path: PathBuf },

    /// MEMERASE / MEMERASE64 failed
    #[error("Erase of {region} failed: {source}")]
    EraseFailed {
        region: EraseRegion,
        #[source]
        source: nix::errno::Errno,
    },
}

/// Result type for Linux MTD operations
pub type Result<T> = std::result::Result<T, MtdError>;
