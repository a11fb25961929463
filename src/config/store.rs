//! Configuration store
//!
//! Single authoritative, thread-safe holder of the [`DeviceConfig`]
//! aggregate, with durable flash persistence and change notification.
//!
//! # Access contract
//!
//! Every operation serializes on one internal lock; nothing is observable
//! half-applied. Reads hand out independent copies, never live references.
//! Updates replace the section in memory and persist the full blob under
//! the same critical section, then notify observers strictly outside the
//! lock: the new section value and the current observer list are snapshotted
//! while still locked, the lock is released, and each observer runs with the
//! snapshot in registration order. Observers may therefore re-enter the
//! store freely without deadlocking.
//!
//! On persistence failure the in-memory state still reflects the update
//! (last write wins in memory) but no notification fires; callers relying on
//! durability must check the returned status.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use heapless::Vec;

use super::blob;
use super::model::{DeviceConfig, DeviceInfo, NetworkConfig};
use crate::platform::{traits::FlashInterface, PlatformError};
use crate::{log_error, log_info, log_warn};

/// Maximum observers per section list
pub const MAX_OBSERVERS: usize = 4;

/// Callback invoked with a snapshot of the network section after it changes
/// and is durably persisted
pub type NetworkObserver = &'static (dyn Fn(&NetworkConfig) + Sync);

/// Callback invoked with a snapshot of the device-info section after it
/// changes and is durably persisted
pub type DeviceInfoObserver = &'static (dyn Fn(&DeviceInfo) + Sync);

/// Configuration store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No persisted blob exists yet
    NotFound,
    /// A blob exists but does not match the expected shape
    Corrupt,
    /// The underlying flash write/erase/read failed
    Persistence(PlatformError),
    /// The observer list for the section is full
    ObserverLimit,
}

struct StoreInner<F: FlashInterface> {
    config: DeviceConfig,
    flash: F,
    network_observers: Vec<NetworkObserver, MAX_OBSERVERS>,
    info_observers: Vec<DeviceInfoObserver, MAX_OBSERVERS>,
}

/// Authoritative, concurrency-safe, persisted holder of device/network
/// settings.
///
/// Exactly one store exists per process; it is constructed at startup by
/// [`ConfigStore::load_or_default`] and passed by shared reference to every
/// subsystem that needs it.
pub struct ConfigStore<F: FlashInterface> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<StoreInner<F>>>,
}

impl<F: FlashInterface> ConfigStore<F> {
    /// Construct the store by loading the persisted blob.
    ///
    /// If the blob is absent, corrupt, or fails validation, the store falls
    /// back to built-in defaults and immediately attempts to persist them.
    /// A failure to persist the defaults is logged, not propagated: the
    /// process proceeds with in-memory defaults regardless. This fallback
    /// is the store's only recovery strategy.
    pub fn load_or_default(mut flash: F) -> Self {
        let config = match blob::load(&mut flash) {
            Ok(loaded) if loaded.is_valid() => {
                log_info!("Loaded valid config from flash");
                loaded
            }
            Ok(_) => {
                log_warn!("Persisted config failed validation, using defaults");
                Self::persisted_defaults(&mut flash)
            }
            Err(_) => {
                log_warn!("Invalid or missing config, using defaults");
                Self::persisted_defaults(&mut flash)
            }
        };

        Self {
            inner: Mutex::new(RefCell::new(StoreInner {
                config,
                flash,
                network_observers: Vec::new(),
                info_observers: Vec::new(),
            })),
        }
    }

    fn persisted_defaults(flash: &mut F) -> DeviceConfig {
        let defaults = DeviceConfig::defaults();
        if blob::save(flash, &defaults).is_err() {
            log_error!("Failed to persist default config, continuing in memory");
        }
        defaults
    }

    /// Copy of the device-info section.
    pub fn device_info(&self) -> DeviceInfo {
        self.inner.lock(|cell| cell.borrow().config.info.clone())
    }

    /// Copy of the network section.
    pub fn network_config(&self) -> NetworkConfig {
        self.inner.lock(|cell| cell.borrow().config.network.clone())
    }

    /// Copy of the full configuration aggregate.
    pub fn config(&self) -> DeviceConfig {
        self.inner.lock(|cell| cell.borrow().config.clone())
    }

    /// Replace the device-info section, persist, and notify device-info
    /// observers.
    pub fn update_device_info(&self, info: &DeviceInfo) -> Result<(), ConfigError> {
        let (snapshot, observers) = self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            inner.config.info = info.clone();
            let saved = Self::save_locked(&mut inner);
            saved.map(|()| (inner.config.info.clone(), inner.info_observers.clone()))
        })?;

        for observer in &observers {
            observer(&snapshot);
        }
        Ok(())
    }

    /// Replace the network section, persist, and notify network observers.
    pub fn update_network_config(&self, network: &NetworkConfig) -> Result<(), ConfigError> {
        let (snapshot, observers) = self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            inner.config.network = network.clone();
            let saved = Self::save_locked(&mut inner);
            saved.map(|()| (inner.config.network.clone(), inner.network_observers.clone()))
        })?;

        for observer in &observers {
            observer(&snapshot);
        }
        Ok(())
    }

    /// Replace the full aggregate, persist, and notify both observer lists
    /// (device info first).
    pub fn update_config(&self, config: &DeviceConfig) -> Result<(), ConfigError> {
        let (info, network, info_observers, network_observers) = self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            inner.config = config.clone();
            let saved = Self::save_locked(&mut inner);
            saved.map(|()| {
                (
                    inner.config.info.clone(),
                    inner.config.network.clone(),
                    inner.info_observers.clone(),
                    inner.network_observers.clone(),
                )
            })
        })?;

        for observer in &info_observers {
            observer(&info);
        }
        for observer in &network_observers {
            observer(&network);
        }
        Ok(())
    }

    /// Reset the in-memory configuration to built-in defaults (runtime
    /// status zeroed). Does not persist and does not notify.
    pub fn set_defaults(&self) {
        self.inner.lock(|cell| {
            cell.borrow_mut().config = DeviceConfig::defaults();
        });
    }

    /// Whether the current configuration satisfies the validity invariant.
    ///
    /// The lock is held only long enough to snapshot the inspected fields.
    pub fn is_valid(&self) -> bool {
        let (name_empty, version_empty, ssid_empty) = self.inner.lock(|cell| {
            let inner = cell.borrow();
            (
                inner.config.info.device_name.is_empty(),
                inner.config.info.firmware_version.is_empty(),
                inner.config.network.ap_ssid.is_empty(),
            )
        });
        !name_empty && !version_empty && !ssid_empty
    }

    /// Persist the current in-memory configuration.
    ///
    /// Normally updates persist themselves; this exists for callers that
    /// mutated runtime status through [`Self::update_network_config`]
    /// equivalents and for startup code.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            Self::save_locked(&mut inner)
        })
    }

    /// Register a network-section observer. Observers live for the process
    /// lifetime; there is no de-registration.
    pub fn register_network_observer(&self, observer: NetworkObserver) -> Result<(), ConfigError> {
        self.inner.lock(|cell| {
            cell.borrow_mut()
                .network_observers
                .push(observer)
                .map_err(|_| ConfigError::ObserverLimit)
        })
    }

    /// Register a device-info observer. Observers live for the process
    /// lifetime; there is no de-registration.
    pub fn register_device_info_observer(
        &self,
        observer: DeviceInfoObserver,
    ) -> Result<(), ConfigError> {
        self.inner.lock(|cell| {
            cell.borrow_mut()
                .info_observers
                .push(observer)
                .map_err(|_| ConfigError::ObserverLimit)
        })
    }

    fn save_locked(inner: &mut StoreInner<F>) -> Result<(), ConfigError> {
        // Split borrow: blob::save needs the flash while the config is read
        let StoreInner { config, flash, .. } = inner;
        match blob::save(flash, config) {
            Ok(()) => Ok(()),
            Err(err) => {
                log_error!("Failed to persist config");
                Err(err)
            }
        }
    }
}

#[cfg(any(test, not(feature = "pico2_w")))]
impl ConfigStore<crate::platform::mock::MockFlash> {
    /// Test hook: make the next persist attempt fail.
    pub fn fail_next_persist(&self) {
        self.inner
            .lock(|cell| cell.borrow_mut().flash.fail_next_erase());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::blob::{CONFIG_BLOCK_ADDR, CONFIG_BLOCK_SIZE};
    use crate::config::model::{clamped, DEFAULT_DEVICE_NAME};
    use crate::platform::mock::MockFlash;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};
    // The glob above brings in heapless::Vec; tests want the std one
    use std::vec::Vec;

    fn store_with_flash(flash: MockFlash) -> ConfigStore<MockFlash> {
        ConfigStore::load_or_default(flash)
    }

    #[test]
    fn first_access_on_empty_flash_yields_persisted_defaults() {
        let store = store_with_flash(MockFlash::new());

        assert!(store.is_valid());
        assert_eq!(store.device_info().device_name.as_str(), DEFAULT_DEVICE_NAME);

        // The defaults were written back, so a second store sees them too
        // without needing the fallback path. Exercised via round-trip below.
    }

    #[test]
    fn corrupt_blob_falls_back_to_defaults() {
        let mut flash = MockFlash::new();
        let mut custom = DeviceConfig::defaults();
        custom.info.device_name = clamped("customized");
        blob::save(&mut flash, &custom).unwrap();
        flash.inject_corruption(CONFIG_BLOCK_ADDR + 16, 8);

        let store = store_with_flash(flash);
        assert_eq!(store.device_info().device_name.as_str(), DEFAULT_DEVICE_NAME);
        assert!(store.is_valid());
    }

    #[test]
    fn invalid_persisted_config_falls_back_to_defaults() {
        let mut flash = MockFlash::new();
        let mut invalid = DeviceConfig::defaults();
        invalid.network.ap_ssid.clear();
        blob::save(&mut flash, &invalid).unwrap();

        let store = store_with_flash(flash);
        assert!(store.is_valid());
        assert!(!store.network_config().ap_ssid.is_empty());
    }

    #[test]
    fn stray_partial_write_falls_back_to_defaults() {
        let mut flash = MockFlash::new();
        // A short stray write that is not a valid blob
        flash.erase(CONFIG_BLOCK_ADDR, CONFIG_BLOCK_SIZE).unwrap();
        flash.write(CONFIG_BLOCK_ADDR, b"DCFGxx").unwrap();

        let store = store_with_flash(flash);
        assert_eq!(store.device_info().device_name.as_str(), DEFAULT_DEVICE_NAME);
    }

    #[test]
    fn update_round_trips_through_flash() {
        let store = store_with_flash(MockFlash::new());
        let mut network = store.network_config();
        network.ap_ssid = clamped("Lab-AP");
        network.ap_password = clamped("labpass1");
        store.update_network_config(&network).unwrap();
        let committed = store.config();

        // Simulate reboot: pull the block device back out of the store and
        // load a fresh store over the same persisted bytes.
        let flash = store
            .inner
            .lock(|cell| core::mem::take(&mut cell.borrow_mut().flash));
        let rebooted = store_with_flash(flash);

        assert_eq!(rebooted.config(), committed);
        assert_eq!(rebooted.network_config().ap_ssid.as_str(), "Lab-AP");
    }

    #[test]
    fn observer_fires_once_with_committed_value() {
        let store = store_with_flash(MockFlash::new());

        let seen: Arc<StdMutex<Vec<NetworkConfig>>> = Arc::new(StdMutex::new(Vec::new()));
        let seen_in_observer = Arc::clone(&seen);
        let observer: NetworkObserver = Box::leak(Box::new(move |net: &NetworkConfig| {
            seen_in_observer.lock().unwrap().push(net.clone());
        }));
        store.register_network_observer(observer).unwrap();

        let mut network = store.network_config();
        network.ap_ssid = clamped("Notify-AP");
        store.update_network_config(&network).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], network);
    }

    #[test]
    fn observer_does_not_fire_on_persistence_failure() {
        let mut flash = MockFlash::new();
        // Prime the block so load_or_default succeeds cleanly
        blob::save(&mut flash, &DeviceConfig::defaults()).unwrap();
        let store = store_with_flash(flash);

        static FIRED: AtomicUsize = AtomicUsize::new(0);
        store
            .register_network_observer(&|_net| {
                FIRED.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        store.fail_next_persist();

        let mut network = store.network_config();
        network.ap_ssid = clamped("Doomed-AP");
        let result = store.update_network_config(&network);

        assert!(matches!(result, Err(ConfigError::Persistence(_))));
        assert_eq!(FIRED.load(Ordering::SeqCst), 0);
        // Memory keeps the update: last write wins in memory
        assert_eq!(store.network_config().ap_ssid.as_str(), "Doomed-AP");
    }

    #[test]
    fn observers_run_in_registration_order() {
        let store = store_with_flash(MockFlash::new());

        let order: Arc<StdMutex<Vec<u8>>> = Arc::new(StdMutex::new(Vec::new()));
        for tag in [1u8, 2, 3] {
            let order = Arc::clone(&order);
            let observer: NetworkObserver = Box::leak(Box::new(move |_: &NetworkConfig| {
                order.lock().unwrap().push(tag);
            }));
            store.register_network_observer(observer).unwrap();
        }

        let mut network = store.network_config();
        network.ap_ssid = clamped("Ordered-AP");
        store.update_network_config(&network).unwrap();

        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn observer_may_reenter_the_store() {
        let store: &'static ConfigStore<MockFlash> =
            Box::leak(Box::new(store_with_flash(MockFlash::new())));

        static REENTERED: AtomicUsize = AtomicUsize::new(0);
        let observer: NetworkObserver = Box::leak(Box::new(move |_: &NetworkConfig| {
            // A read back into the store from inside the callback must not
            // deadlock: notification runs outside the lock.
            let _ = store.network_config();
            REENTERED.fetch_add(1, Ordering::SeqCst);
        }));
        store.register_network_observer(observer).unwrap();

        let mut network = store.network_config();
        network.ap_ssid = clamped("Reentrant-AP");
        store.update_network_config(&network).unwrap();
        assert_eq!(REENTERED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn observer_limit_is_enforced() {
        let store = store_with_flash(MockFlash::new());
        for _ in 0..MAX_OBSERVERS {
            store.register_network_observer(&|_| {}).unwrap();
        }
        assert_eq!(
            store.register_network_observer(&|_| {}),
            Err(ConfigError::ObserverLimit)
        );
    }

    #[test]
    fn update_config_notifies_both_sections() {
        let store = store_with_flash(MockFlash::new());

        static INFO_SEEN: AtomicUsize = AtomicUsize::new(0);
        static NET_SEEN: AtomicUsize = AtomicUsize::new(0);
        store
            .register_device_info_observer(&|_| {
                INFO_SEEN.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        store
            .register_network_observer(&|_| {
                NET_SEEN.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        let mut config = store.config();
        config.info.device_name = clamped("both");
        config.network.ap_ssid = clamped("Both-AP");
        store.update_config(&config).unwrap();

        assert_eq!(INFO_SEEN.load(Ordering::SeqCst), 1);
        assert_eq!(NET_SEEN.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn set_defaults_restores_validity_without_persisting() {
        let store = store_with_flash(MockFlash::new());

        let mut info = store.device_info();
        info.device_name.clear();
        // Invalid update still lands in memory (validation is not an update
        // gate), then defaults recover it.
        let _ = store.update_device_info(&info);
        assert!(!store.is_valid());

        store.set_defaults();
        assert!(store.is_valid());
        assert_eq!(store.device_info().device_name.as_str(), DEFAULT_DEVICE_NAME);
    }

    #[test]
    fn concurrent_updates_serialize_and_notify_per_call() {
        let store: Arc<ConfigStore<MockFlash>> = Arc::new(store_with_flash(MockFlash::new()));

        let seen: Arc<StdMutex<Vec<String>>> = Arc::new(StdMutex::new(Vec::new()));
        let seen_in_observer = Arc::clone(&seen);
        let observer: DeviceInfoObserver = Box::leak(Box::new(move |info: &DeviceInfo| {
            seen_in_observer
                .lock()
                .unwrap()
                .push(info.device_name.as_str().to_owned());
        }));
        store.register_device_info_observer(observer).unwrap();

        const THREADS: usize = 8;
        let mut handles = Vec::new();
        for i in 0..THREADS {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                let mut info = store.device_info();
                info.device_name = clamped(&format!("node-{i}"));
                store.update_device_info(&info).unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Exactly one notification per call, each carrying that call's value
        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        let mut expected: Vec<String> = (0..THREADS).map(|i| format!("node-{i}")).collect();
        expected.sort();
        assert_eq!(seen, expected);

        // Exactly one final value, and it is one of the submitted ones
        let final_name = store.device_info().device_name;
        assert!(expected.iter().any(|name| name == final_name.as_str()));
    }
}
