//! Platform abstraction layer
//!
//! Hardware access goes through the traits in [`traits`]; host tests use the
//! in-memory implementations in [`mock`], the Pico 2 W target uses
//! [`rp2350`].

pub mod error;
pub mod traits;

#[cfg(any(test, not(feature = "pico2_w")))]
pub mod mock;

#[cfg(feature = "pico2_w")]
pub mod rp2350;

pub use error::{PlatformError, Result};
