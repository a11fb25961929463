//! GPIO interface trait
//!
//! Defines the GPIO interface platform implementations must provide. The
//! single-wire sensor bus drives one open-drain pin through this trait.

use crate::platform::Result;

/// GPIO pin mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioMode {
    /// Input mode (high impedance)
    Input,
    /// Input mode with pull-up resistor
    InputPullUp,
    /// Output mode (push-pull)
    OutputPushPull,
    /// Output mode (open-drain)
    OutputOpenDrain,
}

/// GPIO interface trait
///
/// # Safety Invariants
///
/// - Only one owner per GPIO pin instance
/// - No concurrent access to the same pin from multiple contexts
pub trait GpioInterface {
    /// Set the pin high (released, for open-drain).
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio(GpioError::InvalidMode)` if the pin is
    /// not configured as an output.
    fn set_high(&mut self) -> Result<()>;

    /// Set the pin low.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio(GpioError::InvalidMode)` if the pin is
    /// not configured as an output.
    fn set_low(&mut self) -> Result<()>;

    /// Read the pin level; `true` if high.
    ///
    /// Valid in both input and output modes.
    fn read(&self) -> bool;

    /// Set the pin mode.
    fn set_mode(&mut self, mode: GpioMode) -> Result<()>;

    /// Current pin mode.
    fn mode(&self) -> GpioMode;
}
