//! RP2350 flash implementation
//!
//! Flash access through the RP2350 ROM routines.
//!
//! # Flash Layout
//!
//! ```text
//! [Firmware]      0x000000 - 0x040000 (256 KB) - PROTECTED
//! [Config Block]  0x040000 - 0x041000 (4 KB)
//! [Unused]        0x041000 - 0x400000
//! ```
//!
//! # Safety
//!
//! Erase and program run with XIP disabled, so interrupts are masked for the
//! duration and nothing may execute from flash meanwhile. Operations are
//! blocking and can take 100 ms+.

use crate::platform::{error::FlashError, traits::FlashInterface, Result};
use rp235x_hal::rom_data;

/// Protected firmware region (first 256 KB)
const FIRMWARE_SIZE: u32 = 0x40000;

/// Minimum erase unit
const BLOCK_SIZE: u32 = 4096;

/// 4 KB sector erase command
const SECTOR_ERASE_CMD: u8 = 0x20;

/// Total flash capacity on the Pico 2 W
const FLASH_CAPACITY: u32 = 4 * 1024 * 1024;

/// Flash is memory-mapped here while XIP is active
const XIP_BASE: usize = 0x10000000;

/// ROM-routine backed flash access
pub struct Rp2350Flash;

impl Rp2350Flash {
    pub fn new() -> Self {
        Self
    }

    fn is_writable(&self, address: u32) -> bool {
        (FIRMWARE_SIZE..FLASH_CAPACITY).contains(&address)
    }

    /// Run `f` with flash in serial command mode.
    ///
    /// # Safety
    ///
    /// `f` must not touch XIP-mapped memory; interrupts stay masked until it
    /// returns and the cache is flushed.
    unsafe fn with_xip_disabled<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        cortex_m::interrupt::free(|_cs| {
            rom_data::connect_internal_flash();
            rom_data::flash_exit_xip();

            let result = f();

            rom_data::flash_flush_cache();
            rom_data::flash_enter_cmd_xip();

            result
        })
    }
}

impl Default for Rp2350Flash {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashInterface for Rp2350Flash {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        if address >= FLASH_CAPACITY || address as usize + buf.len() > FLASH_CAPACITY as usize {
            return Err(FlashError::InvalidAddress.into());
        }

        // Reads go through the XIP mapping; no mode switch needed
        let flash_ptr = (XIP_BASE + address as usize) as *const u8;
        // SAFETY: range validated above, mapping is always readable
        unsafe {
            core::ptr::copy_nonoverlapping(flash_ptr, buf.as_mut_ptr(), buf.len());
        }
        Ok(())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        if !self.is_writable(address) {
            return Err(FlashError::InvalidAddress.into());
        }
        if address as usize + data.len() > FLASH_CAPACITY as usize {
            return Err(FlashError::InvalidAddress.into());
        }

        // SAFETY: range validated; ROM routine handles page alignment
        unsafe {
            self.with_xip_disabled(|| {
                rom_data::flash_range_program(address, data.as_ptr(), data.len());
            });
        }
        Ok(())
    }

    fn erase(&mut self, address: u32, size: u32) -> Result<()> {
        if !self.is_writable(address) {
            return Err(FlashError::InvalidAddress.into());
        }
        if address % BLOCK_SIZE != 0 || size % BLOCK_SIZE != 0 {
            return Err(FlashError::InvalidAddress.into());
        }
        if address + size > FLASH_CAPACITY {
            return Err(FlashError::InvalidAddress.into());
        }

        // SAFETY: range validated and sector-aligned
        unsafe {
            self.with_xip_disabled(|| {
                rom_data::flash_range_erase(address, size as usize, BLOCK_SIZE, SECTOR_ERASE_CMD);
            });
        }
        Ok(())
    }

    fn block_size(&self) -> u32 {
        BLOCK_SIZE
    }

    fn capacity(&self) -> u32 {
        FLASH_CAPACITY
    }
}
