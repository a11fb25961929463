//! Flash blob codec for the device configuration
//!
//! The whole [`DeviceConfig`] aggregate is stored in a single 4 KB flash
//! block as one fixed-size image. Each string field occupies a fixed slot
//! (length byte + capacity), so the encoded size depends only on the
//! structure definition; any stored image whose recorded payload length
//! differs from the current structure is treated as corrupt, never as a
//! partial load.
//!
//! # Blob Format
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ Magic: [u8; 4] = b"DCFG"                      │  Offset: 0
//! ├───────────────────────────────────────────────┤
//! │ Version: u32 = 1                              │  Offset: 4
//! ├───────────────────────────────────────────────┤
//! │ Payload length: u32                           │  Offset: 8
//! ├───────────────────────────────────────────────┤
//! │ Payload: fixed string slots + flags           │  Offset: 12
//! ├───────────────────────────────────────────────┤
//! │ CRC32 (ISO-HDLC) over bytes [0, payload end)  │
//! └───────────────────────────────────────────────┘
//! ```

use super::model::{
    DeviceConfig, DeviceInfo, NetworkConfig, RuntimeNetworkStatus, AP_PASSWORD_LEN, AP_SSID_LEN,
    BSSID_LEN, DEVICE_NAME_LEN, FIRMWARE_VERSION_LEN, IP_ADDR_LEN, MAC_ADDR_LEN, STA_SSID_LEN,
};
use super::store::ConfigError;
use crate::platform::traits::FlashInterface;
use heapless::String;

/// Flash address of the configuration block
pub const CONFIG_BLOCK_ADDR: u32 = 0x040000;

/// Size of the configuration block (one erase unit)
pub const CONFIG_BLOCK_SIZE: u32 = 4096;

/// Magic number identifying a configuration blob
const CONFIG_MAGIC: [u8; 4] = *b"DCFG";

/// Blob format version. Unknown versions are rejected as corrupt; the
/// version match in `decode` is where future migrations slot in.
const CONFIG_VERSION: u32 = 1;

/// Bytes occupied by one string field: length byte + capacity
const fn slot(cap: usize) -> usize {
    1 + cap
}

/// Encoded payload size, fixed by the structure definition
pub const PAYLOAD_LEN: usize = slot(DEVICE_NAME_LEN)
    + slot(FIRMWARE_VERSION_LEN)
    + slot(AP_SSID_LEN)
    + slot(AP_PASSWORD_LEN)
    + 2 // ap_enabled + sta_enabled
    + slot(STA_SSID_LEN)
    + slot(BSSID_LEN)
    + slot(IP_ADDR_LEN)
    + slot(MAC_ADDR_LEN);

/// Header size: magic + version + payload length
const HEADER_LEN: usize = 12;

/// Total encoded blob size
pub const BLOB_LEN: usize = HEADER_LEN + PAYLOAD_LEN + 4;

fn crc32(bytes: &[u8]) -> u32 {
    crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC).checksum(bytes)
}

fn put_str<const N: usize>(buf: &mut [u8], offset: &mut usize, s: &String<N>) {
    buf[*offset] = s.len() as u8;
    buf[*offset + 1..*offset + 1 + s.len()].copy_from_slice(s.as_bytes());
    *offset += slot(N);
}

fn take_str<const N: usize>(buf: &[u8], offset: &mut usize) -> Result<String<N>, ConfigError> {
    let len = buf[*offset] as usize;
    if len > N {
        return Err(ConfigError::Corrupt);
    }
    let bytes = &buf[*offset + 1..*offset + 1 + len];
    let text = core::str::from_utf8(bytes).map_err(|_| ConfigError::Corrupt)?;
    *offset += slot(N);

    let mut out = String::new();
    out.push_str(text).map_err(|_| ConfigError::Corrupt)?;
    Ok(out)
}

/// Encode a configuration into its fixed-size blob image.
pub fn encode(config: &DeviceConfig, buf: &mut [u8; BLOB_LEN]) {
    buf[0..4].copy_from_slice(&CONFIG_MAGIC);
    buf[4..8].copy_from_slice(&CONFIG_VERSION.to_le_bytes());
    buf[8..12].copy_from_slice(&(PAYLOAD_LEN as u32).to_le_bytes());

    let mut offset = HEADER_LEN;
    put_str(buf, &mut offset, &config.info.device_name);
    put_str(buf, &mut offset, &config.info.firmware_version);
    put_str(buf, &mut offset, &config.network.ap_ssid);
    put_str(buf, &mut offset, &config.network.ap_password);
    buf[offset] = config.network.ap_enabled as u8;
    buf[offset + 1] = config.network.sta_enabled as u8;
    offset += 2;
    put_str(buf, &mut offset, &config.network.status.sta_ssid);
    put_str(buf, &mut offset, &config.network.status.sta_bssid);
    put_str(buf, &mut offset, &config.network.status.ip_address);
    put_str(buf, &mut offset, &config.network.status.mac_address);
    debug_assert_eq!(offset, HEADER_LEN + PAYLOAD_LEN);

    let crc = crc32(&buf[..HEADER_LEN + PAYLOAD_LEN]);
    buf[HEADER_LEN + PAYLOAD_LEN..].copy_from_slice(&crc.to_le_bytes());
}

/// Decode a blob image back into a configuration.
///
/// # Errors
///
/// - `ConfigError::NotFound` when the block is erased (no blob was ever
///   written)
/// - `ConfigError::Corrupt` on any magic, version, length, CRC, or field
///   mismatch
pub fn decode(buf: &[u8; BLOB_LEN]) -> Result<DeviceConfig, ConfigError> {
    if buf[0..4] != CONFIG_MAGIC {
        if buf[0..4].iter().all(|&b| b == 0xFF) {
            return Err(ConfigError::NotFound);
        }
        return Err(ConfigError::Corrupt);
    }

    let version = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let config = match version {
        CONFIG_VERSION => decode_v1(buf)?,
        // Future format versions migrate here
        _ => return Err(ConfigError::Corrupt),
    };
    Ok(config)
}

fn decode_v1(buf: &[u8; BLOB_LEN]) -> Result<DeviceConfig, ConfigError> {
    let payload_len = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]) as usize;
    if payload_len != PAYLOAD_LEN {
        return Err(ConfigError::Corrupt);
    }

    let stored_crc = u32::from_le_bytes([
        buf[HEADER_LEN + PAYLOAD_LEN],
        buf[HEADER_LEN + PAYLOAD_LEN + 1],
        buf[HEADER_LEN + PAYLOAD_LEN + 2],
        buf[HEADER_LEN + PAYLOAD_LEN + 3],
    ]);
    if stored_crc != crc32(&buf[..HEADER_LEN + PAYLOAD_LEN]) {
        return Err(ConfigError::Corrupt);
    }

    let mut offset = HEADER_LEN;
    let device_name = take_str(buf, &mut offset)?;
    let firmware_version = take_str(buf, &mut offset)?;
    let ap_ssid = take_str(buf, &mut offset)?;
    let ap_password = take_str(buf, &mut offset)?;
    let ap_enabled = buf[offset] != 0;
    let sta_enabled = buf[offset + 1] != 0;
    offset += 2;
    let sta_ssid = take_str(buf, &mut offset)?;
    let sta_bssid = take_str(buf, &mut offset)?;
    let ip_address = take_str(buf, &mut offset)?;
    let mac_address = take_str(buf, &mut offset)?;

    Ok(DeviceConfig {
        info: DeviceInfo {
            device_name,
            firmware_version,
        },
        network: NetworkConfig {
            ap_ssid,
            ap_password,
            ap_enabled,
            sta_enabled,
            status: RuntimeNetworkStatus {
                sta_ssid,
                sta_bssid,
                ip_address,
                mac_address,
            },
        },
    })
}

/// Read and decode the configuration blob from flash.
pub fn load<F: FlashInterface>(flash: &mut F) -> Result<DeviceConfig, ConfigError> {
    let mut buf = [0u8; BLOB_LEN];
    flash
        .read(CONFIG_BLOCK_ADDR, &mut buf)
        .map_err(ConfigError::Persistence)?;
    decode(&buf)
}

/// Encode and write the configuration blob to flash.
///
/// The block is erased and rewritten in place; any failure at either step is
/// reported without retry.
pub fn save<F: FlashInterface>(flash: &mut F, config: &DeviceConfig) -> Result<(), ConfigError> {
    let mut buf = [0u8; BLOB_LEN];
    encode(config, &mut buf);

    flash
        .erase(CONFIG_BLOCK_ADDR, CONFIG_BLOCK_SIZE)
        .map_err(ConfigError::Persistence)?;
    flash
        .write(CONFIG_BLOCK_ADDR, &buf)
        .map_err(ConfigError::Persistence)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::clamped;
    use crate::platform::mock::MockFlash;

    fn sample_config() -> DeviceConfig {
        let mut config = DeviceConfig::defaults();
        config.info.device_name = clamped("bench-node");
        config.network.ap_ssid = clamped("Bench-AP");
        config.network.ap_password = clamped("hunter22");
        config.network.sta_enabled = true;
        config.network.status.ip_address = clamped("192.168.4.1");
        config.network.status.mac_address = clamped("28:cd:c1:0a:0b:0c");
        config
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let config = sample_config();
        let mut flash = MockFlash::new();

        save(&mut flash, &config).unwrap();
        let loaded = load(&mut flash).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn erased_flash_reports_not_found() {
        let mut flash = MockFlash::new();
        assert_eq!(load(&mut flash), Err(ConfigError::NotFound));
    }

    #[test]
    fn corrupted_blob_reports_corrupt() {
        let mut flash = MockFlash::new();
        save(&mut flash, &sample_config()).unwrap();

        flash.inject_corruption(CONFIG_BLOCK_ADDR + 20, 4);
        assert_eq!(load(&mut flash), Err(ConfigError::Corrupt));
    }

    #[test]
    fn wrong_version_reports_corrupt() {
        let mut flash = MockFlash::new();
        save(&mut flash, &sample_config()).unwrap();

        let mut buf = [0u8; BLOB_LEN];
        flash.read(CONFIG_BLOCK_ADDR, &mut buf).unwrap();
        buf[4..8].copy_from_slice(&99u32.to_le_bytes());
        flash.erase(CONFIG_BLOCK_ADDR, CONFIG_BLOCK_SIZE).unwrap();
        flash.write(CONFIG_BLOCK_ADDR, &buf).unwrap();

        assert_eq!(load(&mut flash), Err(ConfigError::Corrupt));
    }

    #[test]
    fn wrong_payload_length_reports_corrupt() {
        let mut flash = MockFlash::new();
        save(&mut flash, &sample_config()).unwrap();

        let mut buf = [0u8; BLOB_LEN];
        flash.read(CONFIG_BLOCK_ADDR, &mut buf).unwrap();
        buf[8..12].copy_from_slice(&((PAYLOAD_LEN as u32) - 1).to_le_bytes());
        // Recompute the CRC so only the size check can object
        let crc = crc32(&buf[..HEADER_LEN + PAYLOAD_LEN]);
        buf[HEADER_LEN + PAYLOAD_LEN..].copy_from_slice(&crc.to_le_bytes());
        flash.erase(CONFIG_BLOCK_ADDR, CONFIG_BLOCK_SIZE).unwrap();
        flash.write(CONFIG_BLOCK_ADDR, &buf).unwrap();

        assert_eq!(load(&mut flash), Err(ConfigError::Corrupt));
    }

    #[test]
    fn save_surfaces_erase_failure() {
        let mut flash = MockFlash::new();
        flash.fail_next_erase();

        assert!(matches!(
            save(&mut flash, &sample_config()),
            Err(ConfigError::Persistence(_))
        ));
    }
}
