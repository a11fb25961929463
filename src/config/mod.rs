//! Device configuration system
//!
//! This module owns the canonical device/network settings. The aggregate
//! [`DeviceConfig`] is persisted in flash as one atomic, versioned,
//! CRC-protected blob and served to the rest of the firmware through the
//! [`ConfigStore`], which serializes access, falls back to defaults on
//! corruption, and fans out change notifications to registered observers.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │  HTTP handlers / reconciler startup    │
//! └──────────────┬─────────────────────────┘
//!                │ copies in, copies out
//!                ▼
//! ┌────────────────────────────────────────┐
//! │            ConfigStore                 │
//! │  - single internal lock                │
//! │  - persist-then-notify update path     │
//! │  - defaults on missing/corrupt blob    │
//! └──────────────┬─────────────────────────┘
//!                │ one fixed-size blob
//!                ▼
//! ┌────────────────────────────────────────┐
//! │        Flash Interface                 │
//! │  (config block at 0x040000)            │
//! └────────────────────────────────────────┘
//! ```

pub mod blob;
pub mod model;
pub mod store;

pub use model::{DeviceConfig, DeviceInfo, NetworkConfig, RuntimeNetworkStatus};
pub use store::{ConfigError, ConfigStore, DeviceInfoObserver, NetworkObserver};
