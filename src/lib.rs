//! Device-agnostic input mapping
//!
//! Raw input from keyboards, pointers, gamepads and motion sensors is
//! captured by [`device`]s, normalized by [`adapter`]s and folded into typed
//! [`action`] values once per tick by the [`manager`].
//!
//! ```text
//! Host ──► Device ──► Adapter ──► Evaluator ──► Processors ──► Action value
//!   capture        evaluation, once per Manager::update
//! ```
//!
//! ```
//! use inputmap::prelude::*;
//!
//! let keys = EventTarget::new();
//! let mut manager = Manager::new();
//! manager.register_device(KeyboardDevice::new(keys.clone())).unwrap();
//! manager.add_action(
//!     Action::new("jump", ControlType::Discrete).with_binding(Control::keyboard("Space")),
//! );
//!
//! keys.dispatch(&KeyboardEvent::down("Space").into());
//! manager.update();
//! assert!(manager.action("jump").unwrap().value().as_bool());
//! ```

pub mod action;
pub mod adapter;
pub mod binding;
pub mod config;
pub mod console;
pub mod device;
pub mod error;
pub mod manager;
pub mod processor;

pub use error::{InputError, Result};

pub mod prelude {
    pub use crate::action::{Action, ActionValue, BindingId, ControlType};
    pub use crate::adapter::{AdapterRegistry, EventAdapter};
    pub use crate::binding::{
        Binding, CompositeBinding, CompositeKind, Control, Direction, SingleBinding,
    };
    pub use crate::device::{
        Device, DeviceSnapshot, DeviceType, EventTarget, GamepadDevice, GamepadEvent,
        GyroscopeDevice, KeyboardDevice, KeyboardEvent, KeyboardInput, MotionEvent, PointerDevice,
        PointerEvent, PointerPhase, RawEvent,
    };
    pub use crate::error::InputError;
    pub use crate::manager::Manager;
    pub use crate::processor::Processor;
}
