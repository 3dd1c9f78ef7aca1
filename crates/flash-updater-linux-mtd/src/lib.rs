//! flash-updater-linux-mtd - Linux MTD (Memory Technology Device) erase support
//!
//! Raw NOR/NAND flash partitions are exposed by Linux at `/dev/mtdN` as
//! character devices. Unlike block devices, they must be erased before they
//! can be rewritten. This crate detects such nodes, queries their size with
//! `MEMGETINFO` and erases them with `MEMERASE` (or `MEMERASE64` for ranges
//! that do not fit in 32 bits).
//!
//! Erase here is best-effort: [`MtdEraser`] never fails a run, it only
//! reports an [`flash_updater_core::EraseOutcome`].
//!
//! # Example
//!
//! ```ignore
//! use flash_updater_core::Eraser;
//! use flash_updater_linux_mtd::MtdEraser;
//! use std::path::Path;
//!
//! let outcome = MtdEraser.erase(Path::new("/dev/mtd1"));
//! println!("{:?}", outcome);
//! ```
//!
//! # Device Discovery
//!
//! ```bash
//! cat /proc/mtd
//! ls -la /dev/mtd*
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with MTD support (`CONFIG_MTD`, `CONFIG_MTD_CHAR`)
//! - Read/write access to `/dev/mtdN` (root or udev rules)

pub mod device;
pub mod erase;
pub mod error;

// Re-exports
pub use device::{MtdDevice, MtdInfo};
pub use erase::{erase_partition_with, is_mtd_char_device, EraseGeometry, EraseTarget, MtdEraser};
pub use error::{MtdError, Result};
