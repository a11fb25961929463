//! DS18B20 single-wire temperature sensor driver
//!
//! Bit-banged 1-Wire over one open-drain GPIO pin with a pull-up to 3V3.
//! Timing follows the DS18B20 datasheet; all delays are busy-waits through
//! the platform timer, so a full read blocks the calling task.
//!
//! Only a single sensor on the bus is supported (Skip ROM addressing).

use crate::platform::{
    error::SensorError,
    traits::{GpioInterface, GpioMode, TimerInterface},
    Result,
};

const CMD_SKIP_ROM: u8 = 0xCC;
const CMD_CONVERT_T: u8 = 0x44;
const CMD_READ_SCRATCHPAD: u8 = 0xBE;

/// 12-bit conversion time per the datasheet
const CONVERSION_DELAY_MS: u32 = 750;

/// DS18B20 driver over one open-drain pin
pub struct Ds18b20<G: GpioInterface, T: TimerInterface> {
    pin: G,
    timer: T,
}

impl<G: GpioInterface, T: TimerInterface> Ds18b20<G, T> {
    /// Take ownership of the bus pin and timer. The pin is switched to
    /// open-drain and released.
    pub fn new(mut pin: G, timer: T) -> Result<Self> {
        pin.set_mode(GpioMode::OutputOpenDrain)?;
        pin.set_high()?;
        Ok(Self { pin, timer })
    }

    /// Trigger a conversion and read the result in degrees Celsius.
    ///
    /// Blocks for roughly 750 ms while the sensor converts.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Sensor(SensorError::NoDevice)` if no presence
    /// pulse is seen on either reset.
    pub fn read_temperature(&mut self) -> Result<f32> {
        if !self.reset()? {
            return Err(SensorError::NoDevice.into());
        }
        self.write_byte(CMD_SKIP_ROM)?;
        self.write_byte(CMD_CONVERT_T)?;
        self.timer.delay_ms(CONVERSION_DELAY_MS)?;

        if !self.reset()? {
            return Err(SensorError::NoDevice.into());
        }
        self.write_byte(CMD_SKIP_ROM)?;
        self.write_byte(CMD_READ_SCRATCHPAD)?;
        let lsb = self.read_byte()?;
        let msb = self.read_byte()?;

        let raw = ((msb as u16) << 8) | lsb as u16;
        Ok(raw as i16 as f32 / 16.0)
    }

    /// Issue a bus reset. Returns whether a device answered with a presence
    /// pulse.
    fn reset(&mut self) -> Result<bool> {
        self.pin.set_low()?;
        self.timer.delay_us(480)?;
        self.pin.set_high()?;
        self.timer.delay_us(70)?;
        // Presence pulse: the sensor pulls the released bus low
        let present = !self.pin.read();
        self.timer.delay_us(410)?;
        Ok(present)
    }

    fn write_bit(&mut self, bit: bool) -> Result<()> {
        if bit {
            self.pin.set_low()?;
            self.timer.delay_us(6)?;
            self.pin.set_high()?;
            self.timer.delay_us(64)?;
        } else {
            self.pin.set_low()?;
            self.timer.delay_us(60)?;
            self.pin.set_high()?;
            self.timer.delay_us(10)?;
        }
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool> {
        self.pin.set_low()?;
        self.timer.delay_us(6)?;
        self.pin.set_high()?;
        self.timer.delay_us(9)?;
        let bit = self.pin.read();
        self.timer.delay_us(55)?;
        Ok(bit)
    }

    // LSB first, per the 1-Wire bit order
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        for bit in 0..8 {
            self.write_bit(byte & (1 << bit) != 0)?;
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = 0u8;
        for bit in 0..8 {
            if self.read_bit()? {
                byte |= 1 << bit;
            }
        }
        Ok(byte)
    }
}
