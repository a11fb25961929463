//! RP2350 GPIO implementation
//!
//! One-wire bus pin on top of `embassy_rp::gpio::Flex`. Open-drain is
//! emulated: driving low switches the pin to output-low, releasing switches
//! it back to input and lets the external pull-up raise the bus.

use embassy_rp::gpio::{Flex, Pull};

use crate::platform::{
    error::GpioError,
    traits::{GpioInterface, GpioMode},
    Result,
};

/// Flex-pin backed one-wire bus pin
pub struct OneWirePin<'d> {
    pin: Flex<'d>,
    mode: GpioMode,
}

impl<'d> OneWirePin<'d> {
    /// Wrap a pin, released (input with pull-up as a safety net in case the
    /// external resistor is missing).
    pub fn new(mut pin: Flex<'d>) -> Self {
        pin.set_pull(Pull::Up);
        pin.set_as_input();
        Self {
            pin,
            mode: GpioMode::OutputOpenDrain,
        }
    }
}

impl GpioInterface for OneWirePin<'_> {
    fn set_high(&mut self) -> Result<()> {
        if matches!(self.mode, GpioMode::Input | GpioMode::InputPullUp) {
            return Err(GpioError::InvalidMode.into());
        }
        // Release the bus; the pull-up drives it high
        self.pin.set_as_input();
        Ok(())
    }

    fn set_low(&mut self) -> Result<()> {
        if matches!(self.mode, GpioMode::Input | GpioMode::InputPullUp) {
            return Err(GpioError::InvalidMode.into());
        }
        self.pin.set_low();
        self.pin.set_as_output();
        Ok(())
    }

    fn read(&self) -> bool {
        self.pin.is_high()
    }

    fn set_mode(&mut self, mode: GpioMode) -> Result<()> {
        match mode {
            GpioMode::Input => {
                self.pin.set_pull(Pull::None);
                self.pin.set_as_input();
            }
            GpioMode::InputPullUp => {
                self.pin.set_pull(Pull::Up);
                self.pin.set_as_input();
            }
            GpioMode::OutputOpenDrain => {
                self.pin.set_pull(Pull::Up);
                self.pin.set_as_input();
            }
            GpioMode::OutputPushPull => {
                self.pin.set_as_output();
            }
        }
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> GpioMode {
        self.mode
    }
}
