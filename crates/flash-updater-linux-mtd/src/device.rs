//! Linux MTD character device handle

use crate::erase::{EraseGeometry, EraseTarget};
use crate::error::{MtdError, Result};
use flash_updater_core::EraseRegion;
use log::debug;
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

/// MTD flags from kernel headers
mod mtd_flags {
    /// MTD device doesn't require erase
    pub const MTD_NO_ERASE: u32 = 0x1000;
}

/// MEMGETINFO result structure
/// Matches struct mtd_info_user from mtd/mtd-abi.h
#[repr(C)]
#[derive(Debug, Default)]
#[allow(dead_code)]
struct MtdInfoUser {
    mtd_type: u8,
    flags: u32,
    size: u32,
    erasesize: u32,
    writesize: u32,
    oobsize: u32,
    padding: u64,
}

/// MEMERASE ioctl argument structure
/// Matches struct erase_info_user from mtd/mtd-abi.h
#[repr(C)]
struct EraseInfo {
    start: u32,
    length: u32,
}

/// MEMERASE64 ioctl argument structure
/// Matches struct erase_info_user64 from mtd/mtd-abi.h
#[repr(C)]
struct EraseInfo64 {
    start: u64,
    length: u64,
}

// MEMGETINFO = _IOR('M', 1, struct mtd_info_user)
// MEMERASE = _IOW('M', 2, struct erase_info_user)
// MEMERASE64 = _IOW('M', 20, struct erase_info_user64)
nix::ioctl_read!(memgetinfo, b'M', 1, MtdInfoUser);
nix::ioctl_write_ptr!(memerase, b'M', 2, EraseInfo);
nix::ioctl_write_ptr!(memerase64, b'M', 20, EraseInfo64);

/// Geometry reported by MEMGETINFO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MtdInfo {
    /// Total size in bytes
    pub total_size: u64,
    /// Whether the device requires erase before write
    pub requires_erase: bool,
}

impl MtdInfo {
    fn from_raw(raw: &MtdInfoUser) -> Self {
        Self {
            total_size: u64::from(raw.size),
            requires_erase: raw.flags & mtd_flags::MTD_NO_ERASE == 0,
        }
    }
}

/// An open MTD device node
///
/// The file handle is closed when this is dropped.
pub struct MtdDevice {
    file: File,
    path: PathBuf,
}

impl MtdDevice {
    /// Open `path` read/write for erasing
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| MtdError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Query MEMGETINFO
    ///
    /// Fails with `ENOTTY` on anything that is not an MTD character device.
    pub fn info(&self) -> nix::Result<MtdInfo> {
        let mut raw = MtdInfoUser::default();

        // SAFETY: valid file descriptor and a properly sized, writable
        // mtd_info_user for the kernel to fill in
        unsafe {
            memgetinfo(self.file.as_raw_fd(), &mut raw)?;
        }

        debug!(
            "{}: type={}, size={}, erasesize={}, writesize={}, flags={:#x}",
            self.path.display(),
            raw.mtd_type,
            raw.size,
            raw.erasesize,
            raw.writesize,
            raw.flags
        );

        Ok(MtdInfo::from_raw(&raw))
    }
}

impl EraseTarget for MtdDevice {
    fn geometry(&mut self) -> Result<EraseGeometry> {
        match self.info() {
            Ok(info) => Ok(EraseGeometry {
                size: info.total_size,
                requires_erase: info.requires_erase,
            }),
            Err(errno) => {
                // fstat reports 0 for character devices, so metadata is only
                // a fallback for nodes without MEMGETINFO
                debug!(
                    "MEMGETINFO on {} failed ({}), falling back to file size",
                    self.path.display(),
                    errno
                );
                let metadata = self.file.metadata().map_err(|source| MtdError::SizeQuery {
                    path: self.path.clone(),
                    source,
                })?;
                Ok(EraseGeometry {
                    size: metadata.len(),
                    requires_erase: true,
                })
            }
        }
    }

    fn erase(&mut self, region: EraseRegion) -> Result<()> {
        let fd = self.file.as_raw_fd();

        let result = match (u32::try_from(region.start), u32::try_from(region.length)) {
            (Ok(start), Ok(length)) => {
                let erase_info = EraseInfo { start, length };
                // SAFETY: We're calling an ioctl with a valid file descriptor and
                // a properly initialized EraseInfo struct
                unsafe { memerase(fd, &erase_info) }
            }
            _ => {
                debug!("Region {} exceeds 32 bits, using MEMERASE64", region);
                let erase_info = EraseInfo64 {
                    start: region.start,
                    length: region.length,
                };
                // SAFETY: as above, with the 64-bit descriptor
                unsafe { memerase64(fd, &erase_info) }
            }
        };

        result
            .map(|_| ())
            .map_err(|source| MtdError::EraseFailed { region, source })
    }
}
