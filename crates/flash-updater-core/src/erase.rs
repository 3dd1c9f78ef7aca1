//! Best-effort erase step
//!
//! Erasing never stops a run. Implementations of [`Eraser`] report what
//! happened through [`EraseOutcome`], which the caller only logs.

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;

/// Byte range handed to the device erase command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraseRegion {
    /// Offset of the first byte to erase
    pub start: u64,
    /// Number of bytes to erase
    pub length: u64,
}

impl EraseRegion {
    /// Region covering a whole device of `size` bytes
    pub fn full(size: u64) -> Self {
        Self {
            start: 0,
            length: size,
        }
    }

    /// Whether both fields fit the kernel's 32-bit erase descriptor
    pub fn fits_u32(&self) -> bool {
        u32::try_from(self.start).is_ok() && u32::try_from(self.length).is_ok()
    }
}

impl fmt::Display for EraseRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}+{:#x}", self.start, self.length)
    }
}

/// Why the erase step did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Destination is not an MTD character device
    NotMtd,
    /// Erase disabled by configuration
    Disabled,
    /// Device reports that it does not need erasing
    NotRequired,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotMtd => f.write_str("not an MTD device"),
            SkipReason::Disabled => f.write_str("erase disabled"),
            SkipReason::NotRequired => f.write_str("device does not require erase"),
        }
    }
}

/// Result of a best-effort erase
#[derive(Debug)]
pub enum EraseOutcome {
    /// Nothing was attempted
    Skipped(SkipReason),
    /// Erase was attempted and failed; the run continues regardless
    Failed(Box<dyn StdError + Send + Sync>),
    /// The whole region was erased
    Erased { length: u64 },
}

impl EraseOutcome {
    /// True if an erase command completed
    pub fn is_erased(&self) -> bool {
        matches!(self, EraseOutcome::Erased { .. })
    }

    /// True if erase was attempted and failed
    pub fn is_failed(&self) -> bool {
        matches!(self, EraseOutcome::Failed(_))
    }
}

/// Prepares a destination before it is written
pub trait Eraser {
    /// Erase `destination` if it is meaningful to do so
    ///
    /// Must not fail the run: every problem is folded into the outcome.
    fn erase(&mut self, destination: &Path) -> EraseOutcome;
}

impl<E: Eraser + ?Sized> Eraser for &mut E {
    fn erase(&mut self, destination: &Path) -> EraseOutcome {
        (**self).erase(destination)
    }
}
