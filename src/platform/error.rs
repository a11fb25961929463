//! Platform error types
//!
//! This module defines error types for platform operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformError {
    /// Flash operation failed
    Flash(FlashError),
    /// GPIO operation failed
    Gpio(GpioError),
    /// Wi-Fi radio operation failed
    Radio(RadioError),
    /// Sensor operation failed
    Sensor(SensorError),
}

/// Flash-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    /// Write operation failed
    WriteFailed,
    /// Erase operation failed
    EraseFailed,
    /// Invalid address (out of bounds, firmware region, or unaligned)
    InvalidAddress,
}

/// GPIO-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// Invalid mode for operation
    InvalidMode,
}

/// Wi-Fi radio errors
///
/// Radio failures are surfaced to the caller; the reconciler never aborts
/// the process on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// Access point failed to start
    StartFailed,
    /// Access point failed to stop
    StopFailed,
}

/// Sensor-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No device responded to the bus reset (missing presence pulse)
    NoDevice,
}

impl From<FlashError> for PlatformError {
    fn from(error: FlashError) -> Self {
        PlatformError::Flash(error)
    }
}

impl From<GpioError> for PlatformError {
    fn from(error: GpioError) -> Self {
        PlatformError::Gpio(error)
    }
}

impl From<RadioError> for PlatformError {
    fn from(error: RadioError) -> Self {
        PlatformError::Radio(error)
    }
}

impl From<SensorError> for PlatformError {
    fn from(error: SensorError) -> Self {
        PlatformError::Sensor(error)
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Flash(e) => write!(f, "Flash error: {:?}", e),
            PlatformError::Gpio(e) => write!(f, "GPIO error: {:?}", e),
            PlatformError::Radio(e) => write!(f, "Radio error: {:?}", e),
            PlatformError::Sensor(e) => write!(f, "Sensor error: {:?}", e),
        }
    }
}
