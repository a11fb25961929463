//! Network reconciliation
//!
//! Drives the Wi-Fi access point toward whatever the configuration store
//! currently says, reacting to change notifications instead of polling.

pub mod reconciler;

pub use reconciler::{ApReconciler, AP_MAX_CONNECTIONS};
