//! RP2350 (Pico 2 W) platform implementations

pub mod flash;
pub mod gpio;
pub mod network;
pub mod radio;
pub mod timer;

pub use flash::Rp2350Flash;
pub use gpio::OneWirePin;
pub use radio::Cyw43ApRadio;
pub use timer::Rp2350Timer;
