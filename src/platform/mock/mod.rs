//! Mock platform implementations for host testing
//!
//! In-memory stand-ins for flash, GPIO, timer, and radio. They record enough
//! state for tests to assert on and support fault injection where the real
//! hardware can fail.

pub mod flash;
pub mod gpio;
pub mod radio;
pub mod timer;

pub use flash::MockFlash;
pub use gpio::MockPin;
pub use radio::{MockRadio, RadioOp};
pub use timer::MockTimer;
