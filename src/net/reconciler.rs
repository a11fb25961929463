//! Access-point reconciler
//!
//! Owns the AP radio and keeps it converged on the persisted network
//! configuration. Configuration changes arrive through [`ApReconciler::notify`],
//! which is synchronous and cheap so it can run inside a store observer
//! callback; the slow radio work happens later in the reconciler task.
//!
//! Notifications coalesce: only the latest pending configuration is kept, so
//! a burst of updates converges directly on the final state without applying
//! the intermediate ones.

use core::cell::RefCell;

use embassy_sync::{
    blocking_mutex::{raw::CriticalSectionRawMutex, Mutex as BlockingMutex},
    mutex::Mutex,
    signal::Signal,
};
use heapless::String;

use crate::config::model::{NetworkConfig, AP_PASSWORD_LEN, AP_SSID_LEN};
use crate::platform::traits::{ApAuthMode, ApProfile, ApRadio};
use crate::platform::Result;
use crate::{log_error, log_info};

/// Station limit advertised by the access point
pub const AP_MAX_CONNECTIONS: u8 = 4;

/// What the radio is currently known to be doing
struct ApState {
    running: bool,
    ssid: String<AP_SSID_LEN>,
    password: String<AP_PASSWORD_LEN>,
}

/// Keeps the AP radio converged on the configured SSID and password.
///
/// The reconciler is the radio's sole owner. It compares each incoming
/// configuration against what it last applied and touches the radio only
/// when the SSID or password actually changed, so redundant store updates
/// never bounce connected stations.
pub struct ApReconciler<R: ApRadio> {
    state: BlockingMutex<CriticalSectionRawMutex, RefCell<ApState>>,
    radio: Mutex<CriticalSectionRawMutex, R>,
    pending: Signal<CriticalSectionRawMutex, NetworkConfig>,
}

impl<R: ApRadio> ApReconciler<R> {
    /// Take ownership of a stopped radio.
    pub fn new(radio: R) -> Self {
        Self {
            state: BlockingMutex::new(RefCell::new(ApState {
                running: false,
                ssid: String::new(),
                password: String::new(),
            })),
            radio: Mutex::new(radio),
            pending: Signal::new(),
        }
    }

    /// Queue a configuration for reconciliation.
    ///
    /// Never blocks and never touches the radio; safe to call from a store
    /// observer. A newer call overwrites any configuration still pending.
    pub fn notify(&self, network: &NetworkConfig) {
        self.pending.signal(network.clone());
    }

    /// Whether the access point is believed to be up.
    pub fn is_running(&self) -> bool {
        self.state.lock(|cell| cell.borrow().running)
    }

    /// Reconciler task body: apply each pending configuration as it arrives.
    pub async fn run(&self) -> ! {
        loop {
            self.process_next().await;
        }
    }

    /// Wait for the next pending configuration and apply it. Errors are
    /// logged, not propagated; the failed target stays un-remembered so a
    /// repeated notification retries it.
    pub async fn process_next(&self) {
        let network = self.pending.wait().await;
        match self.apply(&network).await {
            Ok(true) => {}
            Ok(false) => {
                log_info!("AP config unchanged, radio untouched");
            }
            Err(_) => {
                log_error!("AP reconciliation failed");
            }
        }
    }

    /// Drive the radio to match `network`.
    ///
    /// Returns `Ok(false)` when the AP is already running with the requested
    /// SSID and password. Otherwise stops the AP if it is up, starts it with
    /// the new profile, and returns `Ok(true)`.
    ///
    /// # Errors
    ///
    /// Propagates the radio error from a failed stop or start. The radio is
    /// treated as stopped afterwards and the target is not remembered, so
    /// the next notification with the same configuration tries again.
    pub async fn apply(&self, network: &NetworkConfig) -> Result<bool> {
        let needs_restart = self.state.lock(|cell| {
            let state = cell.borrow();
            !(state.running
                && state.ssid == network.ap_ssid
                && state.password == network.ap_password)
        });
        if !needs_restart {
            return Ok(false);
        }

        let mut radio = self.radio.lock().await;

        let was_running = self.state.lock(|cell| cell.borrow().running);
        if was_running {
            if let Err(err) = radio.stop_ap().await {
                self.mark_stopped();
                return Err(err);
            }
            self.mark_stopped();
        }

        let auth = if network.ap_password.is_empty() {
            ApAuthMode::Open
        } else {
            ApAuthMode::Wpa2
        };
        let profile = ApProfile {
            ssid: &network.ap_ssid,
            password: &network.ap_password,
            auth,
            max_connections: AP_MAX_CONNECTIONS,
        };
        radio.start_ap(&profile).await?;

        self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            state.running = true;
            state.ssid = network.ap_ssid.clone();
            state.password = network.ap_password.clone();
        });

        if let Some(ip) = radio.ap_ip() {
            log_info!(
                "AP up: {} at {}.{}.{}.{}",
                network.ap_ssid.as_str(),
                ip[0],
                ip[1],
                ip[2],
                ip[3]
            );
        }
        Ok(true)
    }

    fn mark_stopped(&self) {
        self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            state.running = false;
            state.ssid.clear();
            state.password.clear();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::clamped;
    use crate::platform::mock::{MockRadio, RadioOp};
    use embassy_futures::block_on;

    fn network(ssid: &str, password: &str) -> NetworkConfig {
        let mut net = NetworkConfig::default();
        net.ap_ssid = clamped(ssid);
        net.ap_password = clamped(password);
        net.ap_enabled = true;
        net
    }

    fn ops(reconciler: &ApReconciler<MockRadio>) -> heapless::Vec<RadioOp, 16> {
        block_on(async {
            let radio = reconciler.radio.lock().await;
            radio.ops().iter().cloned().collect()
        })
    }

    #[test]
    fn first_apply_starts_the_ap() {
        let reconciler = ApReconciler::new(MockRadio::new());

        let changed = block_on(reconciler.apply(&network("Field-AP", "pass1234"))).unwrap();

        assert!(changed);
        assert!(reconciler.is_running());
        assert_eq!(
            ops(&reconciler)[0],
            RadioOp::Start {
                ssid: clamped("Field-AP"),
                password: clamped("pass1234"),
                auth: ApAuthMode::Wpa2,
                max_connections: AP_MAX_CONNECTIONS,
            }
        );
    }

    #[test]
    fn identical_config_is_a_no_op() {
        let reconciler = ApReconciler::new(MockRadio::new());
        let net = network("Field-AP", "pass1234");

        assert!(block_on(reconciler.apply(&net)).unwrap());
        assert!(!block_on(reconciler.apply(&net)).unwrap());

        // One start, no stop: connected stations were never bounced
        assert_eq!(ops(&reconciler).len(), 1);
    }

    #[test]
    fn changed_ssid_stops_then_restarts() {
        let reconciler = ApReconciler::new(MockRadio::new());

        block_on(reconciler.apply(&network("First-AP", "pass1234"))).unwrap();
        block_on(reconciler.apply(&network("Second-AP", "pass1234"))).unwrap();

        let ops = ops(&reconciler);
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[1], RadioOp::Stop);
        assert!(matches!(
            &ops[2],
            RadioOp::Start { ssid, .. } if ssid.as_str() == "Second-AP"
        ));
    }

    #[test]
    fn password_change_alone_restarts() {
        let reconciler = ApReconciler::new(MockRadio::new());

        block_on(reconciler.apply(&network("Field-AP", "oldpass1"))).unwrap();
        assert!(block_on(reconciler.apply(&network("Field-AP", "newpass1"))).unwrap());
    }

    #[test]
    fn empty_password_selects_open_auth() {
        let reconciler = ApReconciler::new(MockRadio::new());

        block_on(reconciler.apply(&network("Open-AP", ""))).unwrap();

        assert!(matches!(
            &ops(&reconciler)[0],
            RadioOp::Start { auth: ApAuthMode::Open, .. }
        ));
    }

    #[test]
    fn unrelated_field_change_does_not_restart() {
        let reconciler = ApReconciler::new(MockRadio::new());
        let mut net = network("Field-AP", "pass1234");

        block_on(reconciler.apply(&net)).unwrap();
        net.sta_enabled = true;
        net.status.ip_address = clamped("192.168.4.1");
        assert!(!block_on(reconciler.apply(&net)).unwrap());
    }

    #[test]
    fn failed_start_is_retried_on_next_apply() {
        let mut radio = MockRadio::new();
        radio.fail_next_start();
        let reconciler = ApReconciler::new(radio);
        let net = network("Flaky-AP", "pass1234");

        assert!(block_on(reconciler.apply(&net)).is_err());
        assert!(!reconciler.is_running());

        // The same target must not be mistaken for already-applied
        assert!(block_on(reconciler.apply(&net)).unwrap());
        assert!(reconciler.is_running());
    }

    #[test]
    fn failed_stop_leaves_state_stopped_and_propagates() {
        let reconciler = ApReconciler::new(MockRadio::new());

        block_on(reconciler.apply(&network("First-AP", "pass1234"))).unwrap();
        block_on(async {
            reconciler.radio.lock().await.fail_next_stop();
        });

        assert!(block_on(reconciler.apply(&network("Second-AP", "pass1234"))).is_err());
        assert!(!reconciler.is_running());
    }

    #[test]
    fn notify_coalesces_to_latest_pending() {
        let reconciler = ApReconciler::new(MockRadio::new());

        reconciler.notify(&network("Stale-AP", "pass1234"));
        reconciler.notify(&network("Fresh-AP", "pass1234"));
        block_on(reconciler.process_next());

        let ops = ops(&reconciler);
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RadioOp::Start { ssid, .. } if ssid.as_str() == "Fresh-AP"
        ));
    }
}
