//! Device and action registry
//!
//! The [`Manager`] owns at most one device per [`DeviceType`] and any
//! number of named actions, and drives the per-tick update. It is a plain
//! value: build isolated instances where needed, or use the process-wide
//! one through [`global`].

use std::collections::HashMap;
use std::sync::LazyLock;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::action::{Action, EvalContext};
use crate::adapter::AdapterRegistry;
use crate::device::{Device, DeviceMap, DeviceSnapshot, DeviceType};
use crate::error::{InputError, Result};

static GLOBAL: LazyLock<Mutex<Manager>> = LazyLock::new(|| Mutex::new(Manager::new()));

/// Process-wide default manager
pub fn global() -> &'static Mutex<Manager> {
    &GLOBAL
}

#[derive(Debug, Default)]
pub struct Manager {
    devices: DeviceMap,
    actions: HashMap<String, Action>,
    adapters: AdapterRegistry,
}

impl Manager {
    /// Empty manager with the built-in adapters
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adapters(adapters: AdapterRegistry) -> Self {
        Self {
            adapters,
            ..Self::default()
        }
    }

    /// Connects `device` and stores it; fails if its type is taken
    pub fn register_device(&mut self, device: impl Device + 'static) -> Result<()> {
        self.register_boxed_device(Box::new(device))
    }

    pub fn register_boxed_device(&mut self, mut device: Box<dyn Device>) -> Result<()> {
        let device_type = device.device_type();
        if self.devices.contains_key(&device_type) {
            warn!("Rejected second {} device", device_type);
            return Err(InputError::DuplicateRegistration(format!(
                "device {device_type}"
            )));
        }

        device.connect();
        self.devices.insert(device_type, device);
        info!("Registered {} device", device_type);
        Ok(())
    }

    /// Disconnects and removes the device of `device_type`
    pub fn unregister_device(&mut self, device_type: DeviceType) -> Result<Box<dyn Device>> {
        let mut device = self
            .devices
            .remove(&device_type)
            .ok_or_else(|| InputError::NotFound(format!("device {device_type}")))?;
        device.disconnect();
        info!("Unregistered {} device", device_type);
        Ok(device)
    }

    pub fn unregister_all_devices(&mut self) {
        for (device_type, mut device) in self.devices.drain() {
            device.disconnect();
            debug!("Unregistered {} device", device_type);
        }
        info!("All devices unregistered");
    }

    pub fn device(&self, device_type: DeviceType) -> Option<&dyn Device> {
        self.devices.get(&device_type).map(|device| device.as_ref())
    }

    pub fn has_device(&self, device_type: DeviceType) -> bool {
        self.devices.contains_key(&device_type)
    }

    /// Stores `action` under its name.
    ///
    /// An action already registered under that name is replaced without
    /// error and handed back.
    pub fn add_action(&mut self, action: Action) -> Option<Action> {
        let name = action.name().to_string();
        let replaced = self.actions.insert(name.clone(), action);
        if replaced.is_some() {
            warn!("Action {} replaced an existing action of the same name", name);
        } else {
            debug!("Added action {}", name);
        }
        replaced
    }

    pub fn remove_action(&mut self, name: &str) -> Option<Action> {
        let removed = self.actions.remove(name);
        if removed.is_some() {
            debug!("Removed action {}", name);
        }
        removed
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    pub fn action_mut(&mut self, name: &str) -> Option<&mut Action> {
        self.actions.get_mut(name)
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.values()
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    pub fn adapters_mut(&mut self) -> &mut AdapterRegistry {
        &mut self.adapters
    }

    /// Re-evaluates every action against one snapshot of the devices.
    ///
    /// Events captured while the pass runs show up on the next update.
    pub fn update(&mut self) {
        let snapshot = DeviceSnapshot::capture(&self.devices);
        let ctx = EvalContext::new(&snapshot, &self.adapters);
        for action in self.actions.values_mut() {
            action.update(&ctx);
        }
    }
}
