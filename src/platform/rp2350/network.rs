//! Pico 2 W Wi-Fi bring-up
//!
//! Initializes the CYW43439 over PIO SPI, spawns the driver and network
//! stack tasks, and hands back the stack plus an [`Cyw43ApRadio`] for the
//! reconciler. The AP interface runs a static IPv4 configuration; clients
//! are expected to self-assign (no DHCP server on board).
//!
//! The CYW43 firmware blobs are not checked in; fetch them from the
//! `embassy-rs/embassy` repository (`cyw43-firmware/`) into `cyw43-firmware/`
//! at the crate root.

use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Ipv4Address, Ipv4Cidr, Stack, StackResources};
use embassy_rp::clocks::RoscRng;
use embassy_rp::{
    bind_interrupts,
    gpio::{Level, Output},
    peripherals::{DMA_CH0, PIN_23, PIN_24, PIN_25, PIN_29, PIO0},
    pio::{InterruptHandler as PioInterruptHandler, Pio},
    Peri,
};
use embassy_time::Timer;
use rand_core::RngCore;
use static_cell::StaticCell;

use crate::{log_debug, log_info};
use crate::platform::rp2350::radio::Cyw43ApRadio;

/// Address the AP interface binds on
pub const AP_ADDRESS: [u8; 4] = [192, 168, 4, 1];

bind_interrupts!(struct PioIrqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

#[embassy_executor::task]
async fn wifi_task(
    runner: cyw43::Runner<'static, Output<'static>, cyw43_pio::PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Bring up the radio and network stack for AP operation.
///
/// The returned radio is stopped; the reconciler starts the AP once the
/// stored network configuration reaches it.
pub async fn initialize_wifi(
    spawner: Spawner,
    pin_23: Peri<'static, PIN_23>,
    pin_24: Peri<'static, PIN_24>,
    pin_25: Peri<'static, PIN_25>,
    pin_29: Peri<'static, PIN_29>,
    pio0: Peri<'static, PIO0>,
    dma_ch0: Peri<'static, DMA_CH0>,
) -> (Stack<'static>, Cyw43ApRadio) {
    let mut rng = RoscRng;

    let fw = cyw43::aligned_bytes!("../../../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../../../cyw43-firmware/43439A0_clm.bin");
    let nvram = cyw43::aligned_bytes!("../../../cyw43-firmware/nvram_rp2040.bin");

    let pwr = Output::new(pin_23, Level::Low);
    let cs = Output::new(pin_25, Level::High);
    let mut pio = Pio::new(pio0, PioIrqs);
    let spi = cyw43_pio::PioSpi::new(
        &mut pio.common,
        pio.sm0,
        cyw43_pio::DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        pin_24,
        pin_29,
        dma_ch0,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw, nvram).await;

    spawner.spawn(wifi_task(runner)).unwrap();
    Timer::after_millis(100).await;

    // CLM must load before any network operation
    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::None)
        .await;

    let mac = control.address().await;
    log_debug!(
        "WiFi MAC: {:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        mac[0],
        mac[1],
        mac[2],
        mac[3],
        mac[4],
        mac[5]
    );

    let net_config = NetConfig::ipv4_static(embassy_net::StaticConfigV4 {
        address: Ipv4Cidr::new(
            Ipv4Address::new(AP_ADDRESS[0], AP_ADDRESS[1], AP_ADDRESS[2], AP_ADDRESS[3]),
            24,
        ),
        gateway: None,
        dns_servers: Default::default(),
    });

    static STACK_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        net_device,
        net_config,
        STACK_RESOURCES.init(StackResources::new()),
        rng.next_u64(),
    );

    spawner.spawn(net_task(runner)).unwrap();
    Timer::after_millis(100).await;

    log_info!(
        "Network stack up at {}.{}.{}.{}",
        AP_ADDRESS[0],
        AP_ADDRESS[1],
        AP_ADDRESS[2],
        AP_ADDRESS[3]
    );
    (stack, Cyw43ApRadio::new(control, AP_ADDRESS))
}
