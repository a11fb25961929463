#![cfg_attr(not(test), no_std)]

//! pico_therm - Temperature node firmware for Raspberry Pi Pico 2 W
//!
//! This library provides the configuration store, network reconciler, sensor
//! sampling, and HTTP API for a small Wi-Fi temperature node. Device and
//! network settings are persisted in flash as one atomic blob and pushed to
//! dependent subsystems (notably the access-point manager) whenever they
//! change.

// Critical-section implementation for host unit tests
#[cfg(test)]
use critical_section as _;

// Platform abstraction layer (traits, mocks, RP2350 hardware)
pub mod platform;

// Core support (logging)
pub mod core;

// Configuration store: persisted settings + change notification
pub mod config;

// Network reconciler: keeps the access point in sync with the store
pub mod net;

// Device drivers using platform abstraction
pub mod devices;

// Periodic temperature sampling and cached readings
pub mod sensor;

// HTTP API surface (JSON marshalling to/from the store)
pub mod api;
