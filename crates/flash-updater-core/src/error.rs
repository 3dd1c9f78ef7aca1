//! Error types for the flashing procedure
//!
//! Everything in here is fatal: the run stops and the process exits with
//! status 1. Best-effort failures (erase, sync) are not errors at this level,
//! see [`crate::erase::EraseOutcome`] and [`crate::flash::SyncOutcome`].

use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal flashing errors
#[derive(Debug, Error)]
pub enum Error {
    /// Source image could not be stat-ed
    #[error("Cannot access firmware file {}: {source}", .path.display())]
    SourceAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Source image could not be opened for reading
    #[error("Cannot open firmware file {} for reading: {source}", .path.display())]
    OpenSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Destination could not be opened for writing
    #[error("Cannot open flash partition {} for writing: {source}", .path.display())]
    OpenDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Staging buffer allocation failed
    #[error("Cannot allocate {size} bytes for buffer: {source}")]
    BufferAlloc {
        size: usize,
        #[source]
        source: TryReserveError,
    },

    /// Destination accepted fewer bytes than were read
    #[error("Write error: bytes written ({written}) != bytes read ({expected})")]
    ShortWrite { expected: usize, written: usize },

    /// Read from the source failed mid-stream
    #[error("Error reading firmware file: {0}")]
    ReadSource(#[source] io::Error),

    /// Write to the destination failed
    #[error("Error writing to flash partition: {0}")]
    WriteDestination(#[source] io::Error),

    /// Source ended before the size reported by stat
    #[error("Firmware file changed during copy: expected {expected} bytes, got {actual}")]
    SourceChanged { expected: u64, actual: u64 },

    /// Flushing buffered data to the destination failed
    #[error("Error flushing data to flash: {0}")]
    Flush(#[source] io::Error),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Result type for flashing operations
pub type Result<T> = std::result::Result<T, Error>;
