//! Pico 2 W temperature node firmware
//!
//! Brings up flash-backed configuration, the Wi-Fi access point, the
//! DS18B20 sampling task, and the HTTP API, then parks the main task.
//!
//! ```bash
//! cargo build --release --features pico2_w --target thumbv8m.main-none-eabihf
//! probe-rs run --chip RP2350 target/thumbv8m.main-none-eabihf/release/pico_therm
//! ```

#![cfg_attr(feature = "pico2_w", no_std)]
#![cfg_attr(feature = "pico2_w", no_main)]

#[cfg(feature = "pico2_w")]
mod firmware {
    use core::ptr;
    use core::sync::atomic::{AtomicPtr, Ordering};

    use embassy_executor::Spawner;
    use embassy_net::Stack;
    use embassy_rp::gpio::Flex;
    use embassy_time::Timer;
    use static_cell::StaticCell;
    use {defmt_rtt as _, panic_probe as _};

    use pico_therm::api::http::serve;
    use pico_therm::config::{ConfigStore, NetworkConfig};
    use pico_therm::devices::Ds18b20;
    use pico_therm::net::ApReconciler;
    use pico_therm::platform::rp2350::{
        network::initialize_wifi, Cyw43ApRadio, OneWirePin, Rp2350Flash, Rp2350Timer,
    };
    use pico_therm::sensor::SensorMonitor;
    use pico_therm::{log_info, log_warn};

    static STORE: StaticCell<ConfigStore<Rp2350Flash>> = StaticCell::new();
    static RECONCILER: StaticCell<ApReconciler<Cyw43ApRadio>> = StaticCell::new();
    static MONITOR: SensorMonitor = SensorMonitor::new();

    /// Set once during init, before the observer can fire
    static RECONCILER_PTR: AtomicPtr<ApReconciler<Cyw43ApRadio>> =
        AtomicPtr::new(ptr::null_mut());

    fn notify_reconciler(network: &NetworkConfig) {
        let reconciler = RECONCILER_PTR.load(Ordering::Acquire);
        if !reconciler.is_null() {
            // SAFETY: points into a StaticCell allocation that lives forever
            unsafe { (*reconciler).notify(network) };
        }
    }

    #[embassy_executor::task]
    async fn reconciler_task(reconciler: &'static ApReconciler<Cyw43ApRadio>) -> ! {
        reconciler.run().await
    }

    #[embassy_executor::task]
    async fn sensor_task(sensor: Ds18b20<OneWirePin<'static>, Rp2350Timer>) -> ! {
        MONITOR.run(sensor).await
    }

    #[embassy_executor::task]
    async fn http_task(
        stack: Stack<'static>,
        store: &'static ConfigStore<Rp2350Flash>,
    ) -> ! {
        serve(stack, store, &MONITOR).await
    }

    #[embassy_executor::main]
    async fn main(spawner: Spawner) {
        let p = embassy_rp::init(Default::default());

        log_info!("pico_therm starting");

        let store = STORE.init(ConfigStore::load_or_default(Rp2350Flash::new()));

        let (stack, radio) = initialize_wifi(
            spawner, p.PIN_23, p.PIN_24, p.PIN_25, p.PIN_29, p.PIO0, p.DMA_CH0,
        )
        .await;

        let reconciler: &'static ApReconciler<Cyw43ApRadio> =
            RECONCILER.init(ApReconciler::new(radio));
        RECONCILER_PTR.store(
            reconciler as *const _ as *mut ApReconciler<Cyw43ApRadio>,
            Ordering::Release,
        );

        // Future config changes reach the radio through the store
        if store.register_network_observer(&notify_reconciler).is_err() {
            log_warn!("Network observer list full");
        }
        spawner.spawn(reconciler_task(reconciler)).unwrap();
        // Kick the first reconciliation from the persisted configuration
        reconciler.notify(&store.network_config());

        match Ds18b20::new(OneWirePin::new(Flex::new(p.PIN_16)), Rp2350Timer::new()) {
            Ok(sensor) => spawner.spawn(sensor_task(sensor)).unwrap(),
            Err(_) => log_warn!("Sensor pin init failed, running without sensor"),
        }

        spawner.spawn(http_task(stack, store)).unwrap();

        log_info!("pico_therm up");
        loop {
            Timer::after_secs(60).await;
        }
    }
}

#[cfg(not(feature = "pico2_w"))]
fn main() {}
