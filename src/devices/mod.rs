//! Device drivers
//!
//! Drivers are generic over the platform traits so they run unchanged
//! against hardware pins and mock pins.

pub mod ds18b20;

pub use ds18b20::Ds18b20;
