//! Mock timer implementation for testing
//!
//! Delays complete instantly; elapsed virtual time is accumulated so tests
//! can assert on protocol timing.

use crate::platform::{traits::TimerInterface, Result};

/// Mock timer with virtual time
#[derive(Debug, Default)]
pub struct MockTimer {
    elapsed_us: u64,
}

impl MockTimer {
    /// Create a new mock timer at t=0
    pub fn new() -> Self {
        Self::default()
    }

    /// Total virtual time spent in delays, in microseconds
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }
}

impl TimerInterface for MockTimer {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        self.elapsed_us += u64::from(us);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_accumulate_virtual_time() {
        let mut timer = MockTimer::new();
        timer.delay_us(480).unwrap();
        timer.delay_ms(2).unwrap();

        assert_eq!(timer.elapsed_us(), 2480);
    }
}
