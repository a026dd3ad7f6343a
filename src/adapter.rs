//! Device event adapters
//!
//! An adapter turns one raw event into the four canonical signal shapes the
//! evaluators consume. Adapters are stateless and never touch device or
//! action state. [`AdapterRegistry::default`] comes with the built-in
//! adapters for every [`DeviceType`]; gamepad and gyroscope are still stubs
//! that report neutral signals.

use std::collections::HashMap;
use std::fmt;

use glam::Vec3;
use tracing::{debug, info};

use crate::device::{DeviceType, RawEvent};
use crate::error::{InputError, Result};

/// Normalizes raw events of one device type into signals
pub trait EventAdapter: Send + Sync {
    /// 0/1 style pressed state
    fn discrete(&self, event: &RawEvent) -> u32;

    /// Analog magnitude
    fn continuous(&self, event: &RawEvent) -> f32;

    /// Relative movement
    fn delta(&self, event: &RawEvent) -> Vec3;

    /// Absolute position
    fn position(&self, event: &RawEvent) -> Vec3;
}

/// Any key that has an event at all is pressed
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyboardAdapter;

impl EventAdapter for KeyboardAdapter {
    fn discrete(&self, event: &RawEvent) -> u32 {
        match event {
            RawEvent::Keyboard(_) => 1,
            _ => 0,
        }
    }

    fn continuous(&self, event: &RawEvent) -> f32 {
        match event {
            RawEvent::Keyboard(_) => 1.0,
            _ => 0.0,
        }
    }

    fn delta(&self, _event: &RawEvent) -> Vec3 {
        Vec3::ZERO
    }

    fn position(&self, _event: &RawEvent) -> Vec3 {
        Vec3::ZERO
    }
}

/// Mouse and touch samples
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerAdapter;

impl EventAdapter for PointerAdapter {
    /// Sign of the pressed-buttons mask; which button is pressed is not kept
    fn discrete(&self, event: &RawEvent) -> u32 {
        match event {
            RawEvent::Pointer(pointer) => u32::from(pointer.buttons != 0),
            _ => 0,
        }
    }

    fn continuous(&self, event: &RawEvent) -> f32 {
        match event {
            RawEvent::Pointer(pointer) => pointer.pressure.clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    fn delta(&self, event: &RawEvent) -> Vec3 {
        match event {
            RawEvent::Pointer(pointer) => pointer.movement.extend(0.0),
            _ => Vec3::ZERO,
        }
    }

    fn position(&self, event: &RawEvent) -> Vec3 {
        match event {
            RawEvent::Pointer(pointer) => pointer.client.extend(0.0),
            _ => Vec3::ZERO,
        }
    }
}

/// Reports neutral signals for every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NeutralAdapter;

impl EventAdapter for NeutralAdapter {
    fn discrete(&self, _event: &RawEvent) -> u32 {
        0
    }

    fn continuous(&self, _event: &RawEvent) -> f32 {
        0.0
    }

    fn delta(&self, _event: &RawEvent) -> Vec3 {
        Vec3::ZERO
    }

    fn position(&self, _event: &RawEvent) -> Vec3 {
        Vec3::ZERO
    }
}

/// Device type to adapter mapping
pub struct AdapterRegistry {
    adapters: HashMap<DeviceType, Box<dyn EventAdapter>>,
}

impl AdapterRegistry {
    /// Registry without any adapter
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Adds `adapter` for `device_type`; fails if one is already registered
    pub fn register(
        &mut self,
        device_type: DeviceType,
        adapter: impl EventAdapter + 'static,
    ) -> Result<()> {
        if self.adapters.contains_key(&device_type) {
            return Err(InputError::DuplicateRegistration(format!(
                "adapter for {device_type}"
            )));
        }
        self.adapters.insert(device_type, Box::new(adapter));
        debug!("Registered adapter for {}", device_type);
        Ok(())
    }

    /// Removes and returns the adapter for `device_type`
    pub fn unregister(&mut self, device_type: DeviceType) -> Result<Box<dyn EventAdapter>> {
        let adapter = self
            .adapters
            .remove(&device_type)
            .ok_or_else(|| InputError::NotFound(format!("adapter for {device_type}")))?;
        info!("Unregistered adapter for {}", device_type);
        Ok(adapter)
    }

    pub fn get(&self, device_type: DeviceType) -> Option<&dyn EventAdapter> {
        self.adapters.get(&device_type).map(|adapter| adapter.as_ref())
    }

    pub fn contains(&self, device_type: DeviceType) -> bool {
        self.adapters.contains_key(&device_type)
    }
}

impl Default for AdapterRegistry {
    /// Built-in adapters for all device types
    fn default() -> Self {
        let mut adapters: HashMap<DeviceType, Box<dyn EventAdapter>> = HashMap::new();
        adapters.insert(DeviceType::Keyboard, Box::new(KeyboardAdapter));
        adapters.insert(DeviceType::Pointer, Box::new(PointerAdapter));
        adapters.insert(DeviceType::Gamepad, Box::new(NeutralAdapter));
        adapters.insert(DeviceType::Gyroscope, Box::new(NeutralAdapter));
        Self { adapters }
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("device_types", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{GamepadEvent, GamepadPhase, KeyboardEvent, PointerEvent, PointerPhase};
    use glam::Vec2;

    #[test]
    fn builtins_cover_every_device_type() {
        let registry = AdapterRegistry::default();
        for device_type in DeviceType::ALL {
            assert!(registry.contains(device_type));
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = AdapterRegistry::default();
        assert_eq!(
            registry.register(DeviceType::Keyboard, KeyboardAdapter),
            Err(InputError::DuplicateRegistration(
                "adapter for keyboard".to_string()
            ))
        );
        assert!(registry.contains(DeviceType::Keyboard));
    }

    #[test]
    fn unregister_then_replace() {
        let mut registry = AdapterRegistry::default();
        assert!(registry.unregister(DeviceType::Gamepad).is_ok());
        assert!(matches!(
            registry.unregister(DeviceType::Gamepad),
            Err(InputError::NotFound(_))
        ));
        assert!(registry.get(DeviceType::Gamepad).is_none());

        registry
            .register(DeviceType::Gamepad, KeyboardAdapter)
            .unwrap();
        let event = RawEvent::Gamepad(GamepadEvent::new("South", 1.0, GamepadPhase::Pressed));
        let adapter = registry.get(DeviceType::Gamepad).unwrap();
        assert_eq!(adapter.discrete(&event), 0);
    }

    #[test]
    fn keyboard_signals() {
        let event = RawEvent::Keyboard(KeyboardEvent::down("KeyW"));
        assert_eq!(KeyboardAdapter.discrete(&event), 1);
        assert_eq!(KeyboardAdapter.continuous(&event), 1.0);
        assert_eq!(KeyboardAdapter.delta(&event), Vec3::ZERO);
        assert_eq!(KeyboardAdapter.position(&event), Vec3::ZERO);
    }

    #[test]
    fn pointer_signals() {
        let pressed = RawEvent::Pointer(
            PointerEvent::new(1, "mouse", PointerPhase::Move)
                .with_buttons(0b110)
                .with_pressure(1.4)
                .with_movement(Vec2::new(3.0, -2.0))
                .with_client(Vec2::new(100.0, 50.0)),
        );
        assert_eq!(PointerAdapter.discrete(&pressed), 1);
        assert_eq!(PointerAdapter.continuous(&pressed), 1.0);
        assert_eq!(PointerAdapter.delta(&pressed), Vec3::new(3.0, -2.0, 0.0));
        assert_eq!(PointerAdapter.position(&pressed), Vec3::new(100.0, 50.0, 0.0));

        let released = RawEvent::Pointer(PointerEvent::new(1, "mouse", PointerPhase::Up));
        assert_eq!(PointerAdapter.discrete(&released), 0);
    }

    #[test]
    fn stubs_stay_neutral() {
        let registry = AdapterRegistry::default();
        let event = RawEvent::Gamepad(GamepadEvent::new("LeftStickX", 0.8, GamepadPhase::Changed));
        let adapter = registry.get(DeviceType::Gamepad).unwrap();
        assert_eq!(adapter.discrete(&event), 0);
        assert_eq!(adapter.continuous(&event), 0.0);
        assert_eq!(adapter.delta(&event), Vec3::ZERO);
    }
}
