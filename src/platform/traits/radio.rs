//! Wi-Fi access-point radio trait
//!
//! Defines the control surface the network reconciler uses to drive the
//! radio. Start/stop are slow blocking hardware operations, so the trait is
//! async and implementations are expected to be driven from a task, never
//! from inside a lock.

use crate::platform::Result;

/// Access-point authentication mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApAuthMode {
    /// Open network (no password)
    Open,
    /// WPA2-PSK
    Wpa2,
}

/// Parameters for one access-point start
#[derive(Debug, Clone, Copy)]
pub struct ApProfile<'a> {
    /// Network name
    pub ssid: &'a str,
    /// WPA2 passphrase; ignored for open networks
    pub password: &'a str,
    /// Derived from whether the password is empty
    pub auth: ApAuthMode,
    /// Maximum number of simultaneous stations
    pub max_connections: u8,
}

/// Access-point radio control
///
/// The radio is exclusively owned by the network reconciler; no other
/// component may start, stop, or configure it.
#[allow(async_fn_in_trait)]
pub trait ApRadio {
    /// Configure and start the access point.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Radio(RadioError::StartFailed)` if the radio
    /// rejects the configuration or fails to come up. The radio is left
    /// stopped on failure.
    async fn start_ap(&mut self, profile: &ApProfile<'_>) -> Result<()>;

    /// Stop the access point.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Radio(RadioError::StopFailed)` if the radio
    /// fails to shut down.
    async fn stop_ap(&mut self) -> Result<()>;

    /// IP address of the running access point interface, if any.
    fn ap_ip(&self) -> Option<[u8; 4]>;
}
