//! Timer interface trait
//!
//! Defines the delay interface platform implementations must provide. The
//! single-wire bus timing depends on microsecond-level delays.

use crate::platform::Result;

/// Timer interface trait
///
/// # Safety Invariants
///
/// - Microsecond-level precision required
/// - Monotonic time source (never goes backwards)
pub trait TimerInterface {
    /// Block for at least `us` microseconds.
    fn delay_us(&mut self, us: u32) -> Result<()>;

    /// Block for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        self.delay_us(ms.saturating_mul(1000))
    }
}
