//! API request handlers
//!
//! Pure functions over the store and sensor cache, kept free of socket I/O
//! so they are exercised directly in host tests. Renderers write flat JSON
//! objects; mutating handlers validate, read-modify-write the store, and
//! rely on the store's own persist-then-notify contract.

use core::fmt::{self, Write};

use crate::config::model::{clamped, AP_PASSWORD_LEN, AP_SSID_LEN, DEVICE_NAME_LEN};
use crate::config::{ConfigStore, DeviceInfo};
use crate::platform::traits::FlashInterface;
use crate::sensor::SensorMonitor;

use super::json::{field, write_json_string, FieldValue};

/// Handler-level failure, mapped to an HTTP status by the socket loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// Request body failed validation (400)
    BadRequest(&'static str),
    /// The store accepted the update but could not persist it (500)
    Internal,
}

/// `GET /` body: current temperature and sensor health.
pub fn render_root<W: Write>(buf: &mut W, monitor: &SensorMonitor) -> fmt::Result {
    write!(
        buf,
        r#"{{"temperature":{},"sensor_ok":{}}}"#,
        monitor.last_temperature(),
        monitor.sensor_ok()
    )
}

/// `GET /api/device/info` body.
pub fn render_device_info<W: Write, F: FlashInterface>(
    buf: &mut W,
    store: &ConfigStore<F>,
) -> fmt::Result {
    let info = store.device_info();
    buf.write_str("{\"device_name\":")?;
    write_json_string(buf, &info.device_name)?;
    buf.write_str(",\"firmware_version\":")?;
    write_json_string(buf, &info.firmware_version)?;
    buf.write_char('}')
}

/// `GET /api/network/status` body: AP settings plus station-side runtime
/// status. The AP password is never reported.
pub fn render_network_status<W: Write, F: FlashInterface>(
    buf: &mut W,
    store: &ConfigStore<F>,
) -> fmt::Result {
    let network = store.network_config();
    buf.write_str("{\"ap_ssid\":")?;
    write_json_string(buf, &network.ap_ssid)?;
    write!(
        buf,
        ",\"ap_enabled\":{},\"sta_enabled\":{}",
        network.ap_enabled, network.sta_enabled
    )?;
    buf.write_str(",\"sta_ssid\":")?;
    write_json_string(buf, &network.status.sta_ssid)?;
    buf.write_str(",\"sta_bssid\":")?;
    write_json_string(buf, &network.status.sta_bssid)?;
    buf.write_str(",\"ip_address\":")?;
    write_json_string(buf, &network.status.ip_address)?;
    buf.write_str(",\"mac_address\":")?;
    write_json_string(buf, &network.status.mac_address)?;
    buf.write_char('}')
}

/// `PATCH /api/device/info`: rename the device.
///
/// `device_name` is required, must be a non-empty string, and must fit the
/// stored field. `firmware_version` is read-only and silently ignored.
pub fn handle_patch_device_info<F: FlashInterface>(
    body: &str,
    store: &ConfigStore<F>,
) -> Result<(), ApiError> {
    let name = match field(body, "device_name") {
        FieldValue::Str(name) => name,
        FieldValue::Absent => return Err(ApiError::BadRequest("missing field device_name")),
        _ => return Err(ApiError::BadRequest("device_name must be a string")),
    };
    if name.is_empty() {
        return Err(ApiError::BadRequest("device_name must not be empty"));
    }
    if name.len() > DEVICE_NAME_LEN {
        return Err(ApiError::BadRequest("device_name too long"));
    }

    let info = DeviceInfo {
        device_name: clamped(name),
        ..store.device_info()
    };
    store.update_device_info(&info).map_err(|_| ApiError::Internal)
}

/// `POST /api/network/ap/set`: reconfigure the access point.
///
/// All fields are optional but at least one must be present. `ap_password`
/// accepts `null` to clear the password (open network). Changes land in the
/// store; the reconciler picks them up through its observer.
pub fn handle_post_ap_config<F: FlashInterface>(
    body: &str,
    store: &ConfigStore<F>,
) -> Result<(), ApiError> {
    let mut network = store.network_config();
    let mut touched = false;

    match field(body, "ap_ssid") {
        FieldValue::Str(ssid) => {
            if ssid.is_empty() {
                return Err(ApiError::BadRequest("ap_ssid must not be empty"));
            }
            if ssid.len() > AP_SSID_LEN {
                return Err(ApiError::BadRequest("ap_ssid too long"));
            }
            network.ap_ssid = clamped(ssid);
            touched = true;
        }
        FieldValue::Absent => {}
        _ => return Err(ApiError::BadRequest("ap_ssid must be a string")),
    }

    match field(body, "ap_password") {
        FieldValue::Str(password) => {
            if password.len() > AP_PASSWORD_LEN {
                return Err(ApiError::BadRequest("ap_password too long"));
            }
            network.ap_password = clamped(password);
            touched = true;
        }
        FieldValue::Null => {
            network.ap_password.clear();
            touched = true;
        }
        FieldValue::Absent => {}
        _ => return Err(ApiError::BadRequest("ap_password must be a string or null")),
    }

    match field(body, "ap_enabled") {
        FieldValue::Bool(enabled) => {
            network.ap_enabled = enabled;
            touched = true;
        }
        FieldValue::Absent => {}
        _ => return Err(ApiError::BadRequest("ap_enabled must be a boolean")),
    }

    if !touched {
        return Err(ApiError::BadRequest("no recognized fields"));
    }

    store
        .update_network_config(&network)
        .map_err(|_| ApiError::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::blob;
    use crate::config::model::DeviceConfig;
    use crate::platform::mock::MockFlash;
    use heapless::String;

    fn store() -> ConfigStore<MockFlash> {
        ConfigStore::load_or_default(MockFlash::new())
    }

    #[test]
    fn root_reports_temperature_and_health() {
        let monitor = SensorMonitor::new();
        let mut buf: String<128> = String::new();
        render_root(&mut buf, &monitor).unwrap();
        assert_eq!(buf.as_str(), r#"{"temperature":0,"sensor_ok":false}"#);
    }

    #[test]
    fn device_info_renders_name_and_version() {
        let store = store();
        let mut buf: String<128> = String::new();
        render_device_info(&mut buf, &store).unwrap();

        assert!(buf.contains(r#""device_name":"pico-therm""#));
        assert!(buf.contains(r#""firmware_version":""#));
    }

    #[test]
    fn network_status_never_contains_the_password() {
        let store = store();
        let mut network = store.network_config();
        network.ap_password = clamped("topsecret");
        store.update_network_config(&network).unwrap();

        let mut buf: String<512> = String::new();
        render_network_status(&mut buf, &store).unwrap();

        assert!(buf.contains(r#""ap_ssid":"#));
        assert!(buf.contains(r#""ip_address":"#));
        assert!(!buf.contains("topsecret"));
        assert!(!buf.contains("ap_password"));
    }

    #[test]
    fn patch_device_info_renames_and_persists() {
        let store = store();
        handle_patch_device_info(r#"{"device_name": "bench-probe"}"#, &store).unwrap();
        assert_eq!(store.device_info().device_name.as_str(), "bench-probe");
    }

    #[test]
    fn patch_device_info_validates_the_name() {
        let store = store();

        assert_eq!(
            handle_patch_device_info("{}", &store),
            Err(ApiError::BadRequest("missing field device_name"))
        );
        assert_eq!(
            handle_patch_device_info(r#"{"device_name": ""}"#, &store),
            Err(ApiError::BadRequest("device_name must not be empty"))
        );
        assert_eq!(
            handle_patch_device_info(r#"{"device_name": 7}"#, &store),
            Err(ApiError::BadRequest("device_name must be a string"))
        );

        let long = r#"{"device_name": "abcdefghijabcdefghijabcdefghijabc"}"#;
        assert_eq!(
            handle_patch_device_info(long, &store),
            Err(ApiError::BadRequest("device_name too long"))
        );
        // Rejected updates leave the store untouched
        assert_eq!(store.device_info().device_name.as_str(), "pico-therm");
    }

    #[test]
    fn patch_ignores_firmware_version() {
        let store = store();
        let before = store.device_info().firmware_version.clone();
        handle_patch_device_info(
            r#"{"device_name": "x", "firmware_version": "9.9.9"}"#,
            &store,
        )
        .unwrap();
        assert_eq!(store.device_info().firmware_version, before);
    }

    #[test]
    fn ap_set_updates_only_named_fields() {
        let store = store();
        let password_before = store.network_config().ap_password.clone();

        handle_post_ap_config(r#"{"ap_ssid": "Shed-AP"}"#, &store).unwrap();

        let network = store.network_config();
        assert_eq!(network.ap_ssid.as_str(), "Shed-AP");
        assert_eq!(network.ap_password, password_before);
    }

    #[test]
    fn ap_set_null_password_clears_it() {
        let store = store();
        handle_post_ap_config(r#"{"ap_password": "initialpw"}"#, &store).unwrap();
        handle_post_ap_config(r#"{"ap_password": null}"#, &store).unwrap();
        assert!(store.network_config().ap_password.is_empty());
    }

    #[test]
    fn ap_set_toggles_enabled() {
        let store = store();
        handle_post_ap_config(r#"{"ap_enabled": false}"#, &store).unwrap();
        assert!(!store.network_config().ap_enabled);
    }

    #[test]
    fn ap_set_rejects_bad_shapes() {
        let store = store();

        assert_eq!(
            handle_post_ap_config(r#"{"ap_ssid": ""}"#, &store),
            Err(ApiError::BadRequest("ap_ssid must not be empty"))
        );
        assert_eq!(
            handle_post_ap_config(r#"{"ap_ssid": null}"#, &store),
            Err(ApiError::BadRequest("ap_ssid must be a string"))
        );
        assert_eq!(
            handle_post_ap_config(r#"{"ap_enabled": "yes"}"#, &store),
            Err(ApiError::BadRequest("ap_enabled must be a boolean"))
        );
        assert_eq!(
            handle_post_ap_config(r#"{"unrelated": 1}"#, &store),
            Err(ApiError::BadRequest("no recognized fields"))
        );
    }

    #[test]
    fn ap_set_persistence_failure_is_internal() {
        let mut flash = MockFlash::new();
        blob::save(&mut flash, &DeviceConfig::defaults()).unwrap();
        let store = ConfigStore::load_or_default(flash);
        store.fail_next_persist();

        assert_eq!(
            handle_post_ap_config(r#"{"ap_ssid": "Doomed"}"#, &store),
            Err(ApiError::Internal)
        );
    }
}
