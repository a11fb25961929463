//! Flash interface trait
//!
//! This module defines the flash storage interface that platform
//! implementations must provide. Flash holds the persisted device
//! configuration blob.

use crate::platform::Result;

/// Flash interface trait
///
/// Platform implementations must provide this interface for flash
/// read/write/erase operations.
///
/// # Flash Characteristics
///
/// - Flash is organized in blocks (4 KB on RP2350)
/// - Erase operations set all bytes to 0xFF
/// - Write operations can only change bits from 1 to 0 (erase first)
/// - Flash operations are blocking and can take 100ms+
///
/// # Safety Invariants
///
/// - Only one owner per flash instance (no concurrent access)
/// - Implementations must reject addresses in the firmware region
///
/// # Memory Layout (Pico 2 W)
///
/// ```text
/// [Firmware]      0x000000 - 0x040000 (256 KB) - DO NOT WRITE
/// [Config Block]  0x040000 - 0x041000 (4 KB)
/// ```
pub trait FlashInterface {
    /// Read `buf.len()` bytes from flash starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the
    /// range is out of bounds.
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()>;

    /// Write `data` to flash starting at `address`.
    ///
    /// The target region must have been erased first; writes can only clear
    /// bits.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the
    /// range is in the firmware region or out of bounds,
    /// `FlashError::WriteFailed` if the write fails.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<()>;

    /// Erase `size` bytes of flash starting at `address`, setting them to
    /// 0xFF.
    ///
    /// `address` must be block-aligned and `size` a multiple of the block
    /// size.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` on
    /// unaligned or protected ranges, `FlashError::EraseFailed` if the erase
    /// fails.
    fn erase(&mut self, address: u32, size: u32) -> Result<()>;

    /// Minimum erasable unit size (4096 bytes on RP2350).
    fn block_size(&self) -> u32;

    /// Total flash capacity in bytes.
    fn capacity(&self) -> u32;
}
