//! Mock radio implementation for testing
//!
//! Records every start/stop in order and supports failure injection so
//! reconciler error paths can be exercised.

use crate::platform::{
    error::RadioError,
    traits::{ApAuthMode, ApProfile, ApRadio},
    Result,
};
use heapless::{String, Vec};

/// Maximum recorded operations per test
const MAX_OPS: usize = 16;

/// One recorded radio operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioOp {
    /// AP started with (ssid, password, auth, max_connections)
    Start {
        ssid: String<32>,
        password: String<64>,
        auth: ApAuthMode,
        max_connections: u8,
    },
    /// AP stopped
    Stop,
}

/// Mock access-point radio
#[derive(Debug, Default)]
pub struct MockRadio {
    ops: Vec<RadioOp, MAX_OPS>,
    running: bool,
    fail_next_start: bool,
    fail_next_stop: bool,
}

impl MockRadio {
    /// Create a stopped mock radio
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded operations, oldest first
    pub fn ops(&self) -> &[RadioOp] {
        &self.ops
    }

    /// Number of AP starts performed
    pub fn start_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, RadioOp::Start { .. }))
            .count()
    }

    /// Whether the AP is currently up
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Make the next start operation fail
    pub fn fail_next_start(&mut self) {
        self.fail_next_start = true;
    }

    /// Make the next stop operation fail
    pub fn fail_next_stop(&mut self) {
        self.fail_next_stop = true;
    }

    fn record(&mut self, op: RadioOp) {
        // Tests never exceed MAX_OPS; drop silently if one does
        let _ = self.ops.push(op);
    }
}

impl ApRadio for MockRadio {
    async fn start_ap(&mut self, profile: &ApProfile<'_>) -> Result<()> {
        if self.fail_next_start {
            self.fail_next_start = false;
            return Err(RadioError::StartFailed.into());
        }

        let mut ssid = String::new();
        let mut password = String::new();
        ssid.push_str(profile.ssid).ok();
        password.push_str(profile.password).ok();
        self.record(RadioOp::Start {
            ssid,
            password,
            auth: profile.auth,
            max_connections: profile.max_connections,
        });
        self.running = true;
        Ok(())
    }

    async fn stop_ap(&mut self) -> Result<()> {
        if self.fail_next_stop {
            self.fail_next_stop = false;
            return Err(RadioError::StopFailed.into());
        }
        self.record(RadioOp::Stop);
        self.running = false;
        Ok(())
    }

    fn ap_ip(&self) -> Option<[u8; 4]> {
        if self.running {
            Some([192, 168, 4, 1])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn records_start_and_stop_in_order() {
        let mut radio = MockRadio::new();

        block_on(radio.start_ap(&ApProfile {
            ssid: "net",
            password: "secret",
            auth: ApAuthMode::Wpa2,
            max_connections: 4,
        }))
        .unwrap();
        assert!(radio.is_running());
        assert_eq!(radio.ap_ip(), Some([192, 168, 4, 1]));

        block_on(radio.stop_ap()).unwrap();
        assert!(!radio.is_running());
        assert_eq!(radio.ops().len(), 2);
        assert_eq!(radio.ops()[1], RadioOp::Stop);
    }

    #[test]
    fn injected_start_failure_is_one_shot() {
        let mut radio = MockRadio::new();
        radio.fail_next_start();

        let profile = ApProfile {
            ssid: "net",
            password: "",
            auth: ApAuthMode::Open,
            max_connections: 4,
        };
        assert!(block_on(radio.start_ap(&profile)).is_err());
        assert!(!radio.is_running());
        assert!(block_on(radio.start_ap(&profile)).is_ok());
    }
}
