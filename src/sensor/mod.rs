//! Temperature sampling
//!
//! One task owns the sensor and samples it on a fixed cadence; everyone
//! else reads the cached last value through [`SensorMonitor`]. A failed
//! read keeps the previous temperature but flags the reading as stale.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::devices::Ds18b20;
use crate::platform::traits::{GpioInterface, TimerInterface};
use crate::{log_info, log_warn};

/// Seconds between samples
pub const SAMPLE_PERIOD_SECS: u64 = 2;

struct Reading {
    temperature: f32,
    ok: bool,
}

/// Cached last temperature reading, shared between the sampling task and
/// the API handlers.
pub struct SensorMonitor {
    reading: Mutex<CriticalSectionRawMutex, RefCell<Reading>>,
}

impl SensorMonitor {
    /// Monitor with no reading yet (0.0 C, not ok).
    pub const fn new() -> Self {
        Self {
            reading: Mutex::new(RefCell::new(Reading {
                temperature: 0.0,
                ok: false,
            })),
        }
    }

    /// Last sampled temperature in degrees Celsius. Meaningful only while
    /// [`Self::sensor_ok`] is true.
    pub fn last_temperature(&self) -> f32 {
        self.reading.lock(|cell| cell.borrow().temperature)
    }

    /// Whether the most recent sample succeeded.
    pub fn sensor_ok(&self) -> bool {
        self.reading.lock(|cell| cell.borrow().ok)
    }

    /// Take one sample and update the cache.
    pub fn sample_once<G: GpioInterface, T: TimerInterface>(&self, sensor: &mut Ds18b20<G, T>) {
        match sensor.read_temperature() {
            Ok(temperature) => {
                log_info!("Temperature: {} C", temperature);
                self.reading.lock(|cell| {
                    let mut reading = cell.borrow_mut();
                    reading.temperature = temperature;
                    reading.ok = true;
                });
            }
            Err(_) => {
                log_warn!("Temperature read failed, keeping last value");
                self.reading.lock(|cell| cell.borrow_mut().ok = false);
            }
        }
    }

    /// Sampling loop: one reading every [`SAMPLE_PERIOD_SECS`].
    #[cfg(feature = "pico2_w")]
    pub async fn run<G: GpioInterface, T: TimerInterface>(
        &self,
        mut sensor: Ds18b20<G, T>,
    ) -> ! {
        loop {
            self.sample_once(&mut sensor);
            embassy_time::Timer::after_secs(SAMPLE_PERIOD_SECS).await;
        }
    }
}

impl Default for SensorMonitor {
    fn default() -> Self {
        Self::new()
    }
}
