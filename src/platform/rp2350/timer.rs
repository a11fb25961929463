//! RP2350 timer implementation
//!
//! Busy-wait delays against the embassy time driver. The one-wire protocol
//! needs microsecond slots that must not yield to the executor, so these
//! spin instead of awaiting.

use embassy_time::{Duration, Instant};

use crate::platform::{traits::TimerInterface, Result};

/// Busy-wait delay source
pub struct Rp2350Timer;

impl Rp2350Timer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Rp2350Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerInterface for Rp2350Timer {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        let deadline = Instant::now() + Duration::from_micros(u64::from(us));
        while Instant::now() < deadline {}
        Ok(())
    }
}
