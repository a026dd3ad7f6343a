//! Device subsystem
//!
//! A device is the live capture surface for one [`DeviceType`]. It owns the
//! latest raw event per control key and exposes it read-only through the
//! [`Device`] trait:
//!
//! 1. [`events`] - raw event shapes the host delivers
//! 2. [`capture`] - event targets and the cancellable capture state
//! 3. [`keyboard`], [`pointer`], [`gamepad`], [`gyroscope`] - concrete devices
//!
//! # Architecture
//!
//! ```text
//! Host events ──► EventTarget ──► Device (latest event per key) ──► Evaluators
//!   (async)                         (written only by its handlers)    (per tick)
//! ```

pub mod capture;
pub mod events;
#[cfg(feature = "gamepad")]
pub mod gamepad_collector;
pub mod gamepad;
pub mod gyroscope;
pub mod keyboard;
pub mod pointer;

pub use capture::{EventMap, EventTarget};
pub use events::{
    GamepadEvent, GamepadPhase, KeyAction, KeyboardEvent, KeyboardInput, MotionEvent,
    PointerEvent, PointerPhase, RawEvent,
};
pub use gamepad::GamepadDevice;
pub use gyroscope::GyroscopeDevice;
pub use keyboard::KeyboardDevice;
pub use pointer::{PointerDevice, PointerKind};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::InputError;

/// Closed set of device types; at most one device per type is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Keyboard,
    Pointer,
    Gamepad,
    Gyroscope,
}

impl DeviceType {
    pub const ALL: [DeviceType; 4] = [
        DeviceType::Keyboard,
        DeviceType::Pointer,
        DeviceType::Gamepad,
        DeviceType::Gyroscope,
    ];
}

impl Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::Keyboard => write!(f, "keyboard"),
            DeviceType::Pointer => write!(f, "pointer"),
            DeviceType::Gamepad => write!(f, "gamepad"),
            DeviceType::Gyroscope => write!(f, "gyroscope"),
        }
    }
}

impl FromStr for DeviceType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keyboard" => Ok(DeviceType::Keyboard),
            "pointer" => Ok(DeviceType::Pointer),
            "gamepad" => Ok(DeviceType::Gamepad),
            "gyroscope" => Ok(DeviceType::Gyroscope),
            _ => Err(InputError::UnsupportedInputKind(s.to_string())),
        }
    }
}

/// Capture surface for one device type.
///
/// The latest-event map is written only by the device's own capture
/// handlers; everything else reads it through [`event`](Device::event) and
/// [`has_event`](Device::has_event).
pub trait Device: Send + Sync {
    fn device_type(&self) -> DeviceType;

    /// (Re)subscribes to host events, dropping any previous subscription and
    /// all captured events first
    fn connect(&mut self);

    /// Releases the subscription and clears captured events; no-op when
    /// already disconnected
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Latest event for `key`, or `None` while that input is inactive
    fn event(&self, key: &str) -> Option<RawEvent>;

    fn has_event(&self, key: &str) -> bool {
        self.event(key).is_some()
    }

    /// Every captured event, copied in one step so no handler runs midway
    fn snapshot(&self) -> EventMap;
}

impl fmt::Debug for dyn Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("type", &self.device_type())
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Registered devices, one per type
pub type DeviceMap = HashMap<DeviceType, Box<dyn Device>>;

/// Frozen view of every registered device for one evaluation pass.
///
/// Capture handlers may keep running on other threads; reads through a
/// snapshot never observe their writes.
#[derive(Debug, Clone, Default)]
pub struct DeviceSnapshot {
    events: HashMap<DeviceType, EventMap>,
}

impl DeviceSnapshot {
    pub fn capture(devices: &DeviceMap) -> Self {
        let events = devices
            .iter()
            .map(|(device_type, device)| (*device_type, device.snapshot()))
            .collect();
        Self { events }
    }

    pub fn event(&self, device_type: DeviceType, key: &str) -> Option<&RawEvent> {
        self.events.get(&device_type)?.get(key)
    }

    pub fn has_device(&self, device_type: DeviceType) -> bool {
        self.events.contains_key(&device_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_names_round_trip() {
        for device_type in DeviceType::ALL {
            let parsed: DeviceType = device_type.to_string().parse().unwrap();
            assert_eq!(parsed, device_type);
        }
        assert_eq!("Pointer".parse::<DeviceType>(), Ok(DeviceType::Pointer));
    }

    #[test]
    fn snapshot_ignores_later_capture() {
        let target = EventTarget::new();
        let mut keyboard = KeyboardDevice::new(target.clone());
        keyboard.connect();
        target.dispatch(&KeyboardEvent::down("KeyW").into());

        let mut devices = DeviceMap::new();
        devices.insert(DeviceType::Keyboard, Box::new(keyboard));
        let snapshot = DeviceSnapshot::capture(&devices);

        target.dispatch(&KeyboardEvent::up("KeyW").into());
        target.dispatch(&KeyboardEvent::down("KeyS").into());
        assert!(snapshot.event(DeviceType::Keyboard, "KeyW").is_some());
        assert!(snapshot.event(DeviceType::Keyboard, "KeyS").is_none());
        assert!(snapshot.has_device(DeviceType::Keyboard));
        assert!(!snapshot.has_device(DeviceType::Pointer));
    }

    #[test]
    fn unknown_device_type_is_unsupported() {
        assert_eq!(
            "joystick".parse::<DeviceType>(),
            Err(InputError::UnsupportedInputKind("joystick".to_string()))
        );
    }
}
