//! Mock flash implementation for testing
//!
//! Provides in-memory flash simulation for unit tests. Only the region
//! holding the configuration block is modeled; everything below it counts as
//! the protected firmware region.

use crate::platform::{error::FlashError, traits::FlashInterface, Result};

/// Flash block size (4 KB, same as RP2350)
const BLOCK_SIZE: u32 = 4096;

/// Start of the writable region (first 256 KB protected as firmware)
const FIRMWARE_SIZE: u32 = 0x040000;

/// Number of modeled blocks above the firmware region
const MODELED_BLOCKS: u32 = 4;

/// Simulated flash capacity
const FLASH_CAPACITY: u32 = FIRMWARE_SIZE + MODELED_BLOCKS * BLOCK_SIZE;

/// Mock flash implementation
///
/// Simulates flash storage in memory for testing. Supports:
/// - Read/write/erase with real flash semantics (writes only clear bits)
/// - Corruption injection for testing error recovery
/// - Write/erase failure injection for testing persistence errors
/// - Erase count tracking
#[derive(Debug)]
pub struct MockFlash {
    /// Storage for the modeled region (initialized to 0xFF, erased state)
    storage: [u8; (MODELED_BLOCKS * BLOCK_SIZE) as usize],
    /// Erase count per modeled block
    erase_counts: [u32; MODELED_BLOCKS as usize],
    /// When set, the next write reports WriteFailed
    fail_next_write: bool,
    /// When set, the next erase reports EraseFailed
    fail_next_erase: bool,
}

impl MockFlash {
    /// Create a new mock flash instance with every block erased
    pub fn new() -> Self {
        Self {
            storage: [0xFF; (MODELED_BLOCKS * BLOCK_SIZE) as usize],
            erase_counts: [0; MODELED_BLOCKS as usize],
            fail_next_write: false,
            fail_next_erase: false,
        }
    }

    /// Get flash contents (for test verification)
    pub fn contents(&self, address: u32, len: usize) -> &[u8] {
        let start = (address - FIRMWARE_SIZE) as usize;
        &self.storage[start..start + len]
    }

    /// Overwrite bytes at `address` with a corrupt pattern, bypassing flash
    /// write semantics
    pub fn inject_corruption(&mut self, address: u32, len: usize) {
        let start = (address - FIRMWARE_SIZE) as usize;
        for byte in &mut self.storage[start..start + len] {
            *byte = 0xAA;
        }
    }

    /// Make the next write operation fail
    pub fn fail_next_write(&mut self) {
        self.fail_next_write = true;
    }

    /// Make the next erase operation fail
    pub fn fail_next_erase(&mut self) {
        self.fail_next_erase = true;
    }

    /// Number of times the block at `address` has been erased
    pub fn erase_count(&self, address: u32) -> u32 {
        self.erase_counts[((address - FIRMWARE_SIZE) / BLOCK_SIZE) as usize]
    }

    fn is_writable(&self, address: u32) -> bool {
        (FIRMWARE_SIZE..FLASH_CAPACITY).contains(&address)
    }

    fn is_block_aligned(&self, address: u32) -> bool {
        address % BLOCK_SIZE == 0
    }
}

impl Default for MockFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashInterface for MockFlash {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        if !self.is_writable(address) {
            return Err(FlashError::InvalidAddress.into());
        }
        if address as usize + buf.len() > FLASH_CAPACITY as usize {
            return Err(FlashError::InvalidAddress.into());
        }

        let start = (address - FIRMWARE_SIZE) as usize;
        buf.copy_from_slice(&self.storage[start..start + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        if !self.is_writable(address) {
            return Err(FlashError::InvalidAddress.into());
        }
        if address as usize + data.len() > FLASH_CAPACITY as usize {
            return Err(FlashError::InvalidAddress.into());
        }
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(FlashError::WriteFailed.into());
        }

        // Flash can only change bits from 1 to 0
        let start = (address - FIRMWARE_SIZE) as usize;
        for (i, byte) in data.iter().enumerate() {
            self.storage[start + i] &= byte;
        }
        Ok(())
    }

    fn erase(&mut self, address: u32, size: u32) -> Result<()> {
        if !self.is_writable(address) {
            return Err(FlashError::InvalidAddress.into());
        }
        if !self.is_block_aligned(address) || size % BLOCK_SIZE != 0 {
            return Err(FlashError::InvalidAddress.into());
        }
        if address + size > FLASH_CAPACITY {
            return Err(FlashError::InvalidAddress.into());
        }
        if self.fail_next_erase {
            self.fail_next_erase = false;
            return Err(FlashError::EraseFailed.into());
        }

        let start = (address - FIRMWARE_SIZE) as usize;
        for byte in &mut self.storage[start..start + size as usize] {
            *byte = 0xFF;
        }

        let first_block = (address - FIRMWARE_SIZE) / BLOCK_SIZE;
        for block in first_block..first_block + size / BLOCK_SIZE {
            self.erase_counts[block as usize] += 1;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_round_trip() {
        let mut flash = MockFlash::new();

        flash.erase(0x040000, 4096).unwrap();
        let data = [0x44, 0x43, 0x46, 0x47]; // "DCFG"
        flash.write(0x040000, &data).unwrap();

        let mut buf = [0u8; 4];
        flash.read(0x040000, &mut buf).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn erase_resets_to_ff() {
        let mut flash = MockFlash::new();

        flash.erase(0x040000, 4096).unwrap();
        flash.write(0x040000, &[0x55; 256]).unwrap();
        flash.erase(0x040000, 4096).unwrap();

        assert!(flash.contents(0x040000, 256).iter().all(|&b| b == 0xFF));
        assert_eq!(flash.erase_count(0x040000), 2);
    }

    #[test]
    fn rejects_firmware_region_and_out_of_bounds() {
        let mut flash = MockFlash::new();

        assert!(flash.write(0x000000, &[0x00; 4]).is_err());
        let mut buf = [0u8; 4];
        assert!(flash.read(flash.capacity(), &mut buf).is_err());
    }

    #[test]
    fn rejects_unaligned_erase() {
        let mut flash = MockFlash::new();

        assert!(flash.erase(0x040100, 4096).is_err());
        assert!(flash.erase(0x040000, 1024).is_err());
    }

    #[test]
    fn write_only_clears_bits() {
        let mut flash = MockFlash::new();

        flash.erase(0x040000, 4096).unwrap();
        flash.write(0x040000, &[0x0F]).unwrap();
        flash.write(0x040000, &[0xFF]).unwrap();

        let mut buf = [0u8; 1];
        flash.read(0x040000, &mut buf).unwrap();
        assert_eq!(buf[0], 0x0F);
    }

    #[test]
    fn injected_write_failure_is_one_shot() {
        let mut flash = MockFlash::new();
        flash.erase(0x040000, 4096).unwrap();

        flash.fail_next_write();
        assert!(flash.write(0x040000, &[0x00]).is_err());
        assert!(flash.write(0x040000, &[0x00]).is_ok());
    }
}
