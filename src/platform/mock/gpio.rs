//! Mock GPIO implementation for testing
//!
//! Simulates a single open-drain pin. Tests script the levels the pin will
//! report when sampled, which is enough to replay a full single-wire
//! transaction against the DS18B20 driver.

use crate::platform::{
    error::GpioError,
    traits::{GpioInterface, GpioMode},
    Result,
};
use core::cell::RefCell;
use heapless::Deque;

/// Maximum number of scripted level samples
const MAX_SAMPLES: usize = 128;

/// Mock GPIO pin
///
/// `read()` pops the next scripted level; once the script is exhausted the
/// pin reads high (bus idle, external pull-up).
#[derive(Debug)]
pub struct MockPin {
    mode: GpioMode,
    /// Level currently driven by the device under test
    driven_high: bool,
    /// Levels returned by successive `read()` calls
    samples: RefCell<Deque<bool, MAX_SAMPLES>>,
    /// Count of low pulses driven (reset/write/read slots)
    low_pulses: u32,
}

impl MockPin {
    /// Create a pin in open-drain mode, released
    pub fn new() -> Self {
        Self {
            mode: GpioMode::OutputOpenDrain,
            driven_high: true,
            samples: RefCell::new(Deque::new()),
            low_pulses: 0,
        }
    }

    /// Queue a level to be returned by the next unsampled `read()`
    pub fn push_sample(&mut self, level: bool) {
        // Test scripts are sized well below MAX_SAMPLES
        let _ = self.samples.borrow_mut().push_back(level);
    }

    /// Queue one scripted byte, LSB first (single-wire bit order)
    pub fn push_byte(&mut self, byte: u8) {
        for bit in 0..8 {
            self.push_sample(byte & (1 << bit) != 0);
        }
    }

    /// Number of low pulses the driver has generated
    pub fn low_pulses(&self) -> u32 {
        self.low_pulses
    }

    /// Number of scripted samples not yet consumed
    pub fn remaining_samples(&self) -> usize {
        self.samples.borrow().len()
    }
}

impl Default for MockPin {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioInterface for MockPin {
    fn set_high(&mut self) -> Result<()> {
        if matches!(self.mode, GpioMode::Input | GpioMode::InputPullUp) {
            return Err(GpioError::InvalidMode.into());
        }
        self.driven_high = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<()> {
        if matches!(self.mode, GpioMode::Input | GpioMode::InputPullUp) {
            return Err(GpioError::InvalidMode.into());
        }
        if self.driven_high {
            self.low_pulses += 1;
        }
        self.driven_high = false;
        Ok(())
    }

    fn read(&self) -> bool {
        match self.samples.borrow_mut().pop_front() {
            Some(level) => level,
            // Script exhausted: bus idles high through the pull-up
            None => self.driven_high,
        }
    }

    fn set_mode(&mut self, mode: GpioMode) -> Result<()> {
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> GpioMode {
        self.mode
    }
}
