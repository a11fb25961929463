//! CYW43439 access-point radio
//!
//! Wraps the cyw43 control handle behind [`ApRadio`]. The CYW43 firmware
//! reconfigures the AP in place when `start_ap_*` is issued again, so a
//! stop is a bookkeeping step here and the actual teardown happens on the
//! next start.

use crate::platform::traits::{ApAuthMode, ApProfile, ApRadio};
use crate::platform::Result;

/// 2.4 GHz channel the AP runs on
const AP_CHANNEL: u8 = 6;

/// cyw43-backed AP radio
pub struct Cyw43ApRadio {
    control: cyw43::Control<'static>,
    ip: [u8; 4],
    running: bool,
}

impl Cyw43ApRadio {
    /// Wrap an initialized control handle. `ip` is the address the network
    /// stack binds on the AP interface.
    pub fn new(control: cyw43::Control<'static>, ip: [u8; 4]) -> Self {
        Self {
            control,
            ip,
            running: false,
        }
    }
}

impl ApRadio for Cyw43ApRadio {
    async fn start_ap(&mut self, profile: &ApProfile<'_>) -> Result<()> {
        match profile.auth {
            ApAuthMode::Open => {
                self.control.start_ap_open(profile.ssid, AP_CHANNEL).await;
            }
            ApAuthMode::Wpa2 => {
                self.control
                    .start_ap_wpa2(profile.ssid, profile.password, AP_CHANNEL)
                    .await;
            }
        }
        self.running = true;
        Ok(())
    }

    async fn stop_ap(&mut self) -> Result<()> {
        // The firmware tears the old AP down when the next start arrives
        self.running = false;
        Ok(())
    }

    fn ap_ip(&self) -> Option<[u8; 4]> {
        if self.running {
            Some(self.ip)
        } else {
            None
        }
    }
}
