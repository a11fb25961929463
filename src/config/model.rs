//! Configuration data model
//!
//! Fixed-capacity settings structures. [`DeviceConfig`] is the unit of
//! persistence: it is always loaded, saved, and defaulted as one aggregate,
//! so one section can never be committed without the other.

use heapless::String;

/// Maximum device name length
pub const DEVICE_NAME_LEN: usize = 32;

/// Maximum firmware version string length
pub const FIRMWARE_VERSION_LEN: usize = 16;

/// Maximum AP SSID length (IEEE 802.11)
pub const AP_SSID_LEN: usize = 32;

/// Maximum AP password length (WPA2)
pub const AP_PASSWORD_LEN: usize = 64;

/// Maximum station SSID length
pub const STA_SSID_LEN: usize = 32;

/// BSSID text form ("aa:bb:cc:dd:ee:ff")
pub const BSSID_LEN: usize = 17;

/// IPv4 text form ("255.255.255.255")
pub const IP_ADDR_LEN: usize = 15;

/// MAC address text form
pub const MAC_ADDR_LEN: usize = 17;

/// Default device name used when flash holds no valid config
pub const DEFAULT_DEVICE_NAME: &str = "pico-therm";

/// Default AP SSID (overridable at build time via AP_SSID)
pub const DEFAULT_AP_SSID: &str = env!("AP_SSID");

/// Default AP password (overridable at build time via AP_PASSWORD; empty
/// means open network)
pub const DEFAULT_AP_PASSWORD: &str = env!("AP_PASSWORD");

/// Copy `s` into a fixed-capacity string, truncating on a character
/// boundary if it does not fit.
pub(crate) fn clamped<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Device identity: mutated only through the store's update entry points,
/// never partially written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceInfo {
    /// Human-readable device name
    pub device_name: String<DEVICE_NAME_LEN>,
    /// Firmware version string
    pub firmware_version: String<FIRMWARE_VERSION_LEN>,
}

/// Live radio state as last reported by the network layer.
///
/// These fields are sensor-like outputs, not user configuration: they are
/// never validated and defaulting simply zeroes them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeNetworkStatus {
    /// SSID the station interface is associated with
    pub sta_ssid: String<STA_SSID_LEN>,
    /// BSSID of the associated AP
    pub sta_bssid: String<BSSID_LEN>,
    /// Currently assigned IP address
    pub ip_address: String<IP_ADDR_LEN>,
    /// Device MAC address
    pub mac_address: String<MAC_ADDR_LEN>,
}

/// Network section: user intent for the access point plus runtime status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkConfig {
    /// Access-point SSID
    pub ap_ssid: String<AP_SSID_LEN>,
    /// Access-point password; empty means open network
    pub ap_password: String<AP_PASSWORD_LEN>,
    /// Whether the AP should be up
    pub ap_enabled: bool,
    /// Whether the station interface should be up
    pub sta_enabled: bool,
    /// Live radio state (read-only)
    pub status: RuntimeNetworkStatus,
}

/// Aggregate configuration: the unit of persistence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceConfig {
    /// Device identity section
    pub info: DeviceInfo,
    /// Network section
    pub network: NetworkConfig,
}

impl DeviceConfig {
    /// Built-in defaults: valid by construction, runtime status zeroed.
    pub fn defaults() -> Self {
        Self {
            info: DeviceInfo {
                device_name: clamped(DEFAULT_DEVICE_NAME),
                firmware_version: clamped(env!("CARGO_PKG_VERSION")),
            },
            network: NetworkConfig {
                ap_ssid: clamped(DEFAULT_AP_SSID),
                ap_password: clamped(DEFAULT_AP_PASSWORD),
                ap_enabled: true,
                sta_enabled: false,
                status: RuntimeNetworkStatus::default(),
            },
        }
    }

    /// A config is valid iff device name, firmware version, and AP SSID are
    /// all non-empty. Runtime status fields are never validated.
    pub fn is_valid(&self) -> bool {
        !self.info.device_name.is_empty()
            && !self.info.firmware_version.is_empty()
            && !self.network.ap_ssid.is_empty()
    }
}
