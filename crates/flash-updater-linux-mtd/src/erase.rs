//! Best-effort MTD partition erase

use crate::device::MtdDevice;
use crate::error::{MtdError, Result};
use flash_updater_core::{EraseOutcome, EraseRegion, Eraser, SkipReason};
use log::{info, warn};
use std::path::Path;

/// Device root shared by all MTD character nodes (`/dev/mtd0`, `/dev/mtd1ro`)
const MTD_CHAR_PREFIX: &str = "/dev/mtd";

/// Size and erase requirement of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraseGeometry {
    /// Total size in bytes
    pub size: u64,
    /// False for devices that need no erase before write (e.g. RAM-backed MTD)
    pub requires_erase: bool,
}

/// Something that can be sized and erased
pub trait EraseTarget {
    fn geometry(&mut self) -> Result<EraseGeometry>;
    fn erase(&mut self, region: EraseRegion) -> Result<()>;
}

/// True if `path` names an MTD character device
///
/// `/dev/mtdblockN` nodes are block devices and do not accept erase ioctls.
pub fn is_mtd_char_device(path: &Path) -> bool {
    path.to_str()
        .and_then(|p| p.strip_prefix(MTD_CHAR_PREFIX))
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}

/// Erase the whole of `path` if it is an MTD character device
///
/// `open` is only called for MTD paths. Every failure is logged as a warning
/// and returned as [`EraseOutcome::Failed`]; the target is closed before
/// returning.
pub fn erase_partition_with<T, F>(path: &Path, open: F) -> EraseOutcome
where
    T: EraseTarget,
    F: FnOnce(&Path) -> Result<T>,
{
    if !is_mtd_char_device(path) {
        info!("Not an MTD device, skipping erase");
        return EraseOutcome::Skipped(SkipReason::NotMtd);
    }

    match erase_target(path, open) {
        Ok(outcome) => outcome,
        Err(e @ MtdError::EraseFailed { .. }) => {
            warn!("{} (continuing anyway)", e);
            EraseOutcome::Failed(Box::new(e))
        }
        Err(e) => {
            warn!("{}", e);
            EraseOutcome::Failed(Box::new(e))
        }
    }
}

fn erase_target<T, F>(path: &Path, open: F) -> Result<EraseOutcome>
where
    T: EraseTarget,
    F: FnOnce(&Path) -> Result<T>,
{
    let mut target = open(path)?;
    let geometry = target.geometry()?;

    if !geometry.requires_erase {
        info!("Flash partition does not require erase, skipping");
        return Ok(EraseOutcome::Skipped(SkipReason::NotRequired));
    }

    if geometry.size == 0 {
        return Err(MtdError::EmptyDevice {
            path: path.to_path_buf(),
        });
    }

    let region = EraseRegion::full(geometry.size);
    info!("Erasing flash partition (size: {} bytes)...", region.length);
    target.erase(region)?;
    info!("Flash partition erased successfully");

    Ok(EraseOutcome::Erased {
        length: region.length,
    })
}

/// [`Eraser`] backed by real MTD device nodes
#[derive(Debug, Clone, Copy, Default)]
pub struct MtdEraser;

impl Eraser for MtdEraser {
    fn erase(&mut self, destination: &Path) -> EraseOutcome {
        erase_partition_with(destination, MtdDevice::open)
    }
}
