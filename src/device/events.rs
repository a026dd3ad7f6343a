//! Raw host events
//!
//! These are the shapes the host (window system, browser shim, gilrs poller,
//! stdin console of the binary) hands to the devices. Every event carries a
//! chrono capture timestamp.

use chrono::{DateTime, Local};
use glam::{Vec2, Vec3};

use super::DeviceType;

/// Key transition reported by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

/// One physical key transition
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// Physical key code, e.g. `"KeyW"` or `"Space"`
    pub code: String,
    pub action: KeyAction,
    /// Host auto-repeat while the key is held
    pub repeat: bool,
    pub timestamp: DateTime<Local>,
}

impl KeyboardEvent {
    pub fn down(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            action: KeyAction::Down,
            repeat: false,
            timestamp: Local::now(),
        }
    }

    pub fn up(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            action: KeyAction::Up,
            repeat: false,
            timestamp: Local::now(),
        }
    }
}

/// What the keyboard surface delivers: key transitions, or the window losing
/// focus (every held key is released without an `Up`).
#[derive(Clone, Debug, PartialEq)]
pub enum KeyboardInput {
    Key(KeyboardEvent),
    FocusLost,
}

impl From<KeyboardEvent> for KeyboardInput {
    fn from(event: KeyboardEvent) -> Self {
        KeyboardInput::Key(event)
    }
}

/// Pointer lifecycle phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
    /// Pointer left the capture surface
    Leave,
}

/// One pointer sample (mouse, touch contact, ...)
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// Host identifier; stable for the lifetime of a touch contact
    pub pointer_id: u32,
    /// Host pointer subtype string: `"mouse"`, `"touch"`, `"pen"`, ...
    pub pointer_type: String,
    pub phase: PointerPhase,
    /// Pressed buttons bitmask (bit 0 primary, bit 1 secondary, ...)
    pub buttons: u32,
    /// Normalized pressure in `[0, 1]`
    pub pressure: f32,
    /// Movement since the previous sample of this pointer
    pub movement: Vec2,
    /// Position in surface coordinates
    pub client: Vec2,
    pub timestamp: DateTime<Local>,
}

impl PointerEvent {
    pub fn new(pointer_id: u32, pointer_type: impl Into<String>, phase: PointerPhase) -> Self {
        Self {
            pointer_id,
            pointer_type: pointer_type.into(),
            phase,
            buttons: 0,
            pressure: 0.0,
            movement: Vec2::ZERO,
            client: Vec2::ZERO,
            timestamp: Local::now(),
        }
    }

    pub fn with_buttons(mut self, buttons: u32) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn with_movement(mut self, movement: Vec2) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_client(mut self, client: Vec2) -> Self {
        self.client = client;
        self
    }
}

/// Gamepad control transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamepadPhase {
    Pressed,
    Changed,
    Released,
}

/// One gamepad button or axis sample
#[derive(Clone, Debug, PartialEq)]
pub struct GamepadEvent {
    /// Control name, e.g. `"South"` or `"LeftStickX"`
    pub control: String,
    pub value: f32,
    pub phase: GamepadPhase,
    pub timestamp: DateTime<Local>,
}

impl GamepadEvent {
    pub fn new(control: impl Into<String>, value: f32, phase: GamepadPhase) -> Self {
        Self {
            control: control.into(),
            value,
            phase,
            timestamp: Local::now(),
        }
    }
}

/// Device motion sample from a gyroscope/accelerometer
#[derive(Clone, Debug, PartialEq)]
pub struct MotionEvent {
    /// Angular velocity in degrees per second
    pub rotation_rate: Vec3,
    pub acceleration: Vec3,
    pub timestamp: DateTime<Local>,
}

impl MotionEvent {
    pub fn new(rotation_rate: Vec3, acceleration: Vec3) -> Self {
        Self {
            rotation_rate,
            acceleration,
            timestamp: Local::now(),
        }
    }
}

/// Latest captured event for one control, as returned by [`Device::event`](super::Device::event)
#[derive(Clone, Debug, PartialEq)]
pub enum RawEvent {
    Keyboard(KeyboardEvent),
    Pointer(PointerEvent),
    Gamepad(GamepadEvent),
    Motion(MotionEvent),
}

impl RawEvent {
    /// Device type the event was captured from
    pub fn device_type(&self) -> DeviceType {
        match self {
            RawEvent::Keyboard(_) => DeviceType::Keyboard,
            RawEvent::Pointer(_) => DeviceType::Pointer,
            RawEvent::Gamepad(_) => DeviceType::Gamepad,
            RawEvent::Motion(_) => DeviceType::Gyroscope,
        }
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        match self {
            RawEvent::Keyboard(e) => e.timestamp,
            RawEvent::Pointer(e) => e.timestamp,
            RawEvent::Gamepad(e) => e.timestamp,
            RawEvent::Motion(e) => e.timestamp,
        }
    }
}
