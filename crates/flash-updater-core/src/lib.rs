//! flash-updater-core - Firmware flashing procedure
//!
//! This crate implements the device-independent part of flash-updater:
//! stat the firmware image, run a best-effort erase through an [`Eraser`],
//! stream the image into the destination through a fixed-size staging
//! buffer, then flush and sync.
//!
//! Device-specific erase support lives in `flash-updater-linux-mtd`.
//!
//! # Example
//!
//! ```ignore
//! use flash_updater_core::{flash_image, FlashConfig, FlashRequest};
//! use flash_updater_linux_mtd::MtdEraser;
//!
//! let request = FlashRequest::new("firmware.img", "/dev/mtd1");
//! let report = flash_image(&request, &FlashConfig::default(), MtdEraser)?;
//! println!("{} bytes written", report.bytes_written);
//! ```

pub mod config;
pub mod copy;
pub mod erase;
pub mod error;
pub mod flash;

// Re-exports
pub use config::{FlashConfig, DEFAULT_CHUNK_SIZE, DEFAULT_PROGRESS_INTERVAL};
pub use copy::{CopyStats, Copier};
pub use erase::{EraseOutcome, EraseRegion, Eraser, SkipReason};
pub use error::{Error, Result};
pub use flash::{flash_image, sync_destination, FlashReport, FlashRequest, SyncOutcome};
