//! Run configuration

use crate::error::{Error, Result};

/// Default staging buffer size in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Default distance between progress lines (1 MiB)
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1024 * 1024;

/// Tunables for a single flashing run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashConfig {
    /// Bytes moved per read/write pair
    pub chunk_size: usize,
    /// A progress line is logged each time the total crosses a multiple of this
    pub progress_interval: u64,
    /// Whether MTD destinations are erased before writing
    pub erase: bool,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            erase: true,
        }
    }
}

impl FlashConfig {
    /// Override the chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Override the progress interval
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Enable or disable the erase step
    pub fn with_erase(mut self, erase: bool) -> Self {
        self.erase = erase;
        self
    }

    /// Reject values the copy loop cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk size must be greater than zero"));
        }
        if self.progress_interval == 0 {
            return Err(Error::InvalidConfig(
                "progress interval must be greater than zero",
            ));
        }
        Ok(())
    }
}
