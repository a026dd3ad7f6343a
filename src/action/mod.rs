//! Actions
//!
//! An [`Action`] is a named, typed aggregation of bindings and processors.
//! Its value is recomputed from scratch on every [`Action::update`]:
//!
//! 1. every binding is evaluated against the current device snapshot and run
//!    through its own processors
//! 2. the results are folded with the control type's combination law, which
//!    does not depend on binding order
//! 3. the folded value runs through the action's processors
//!
//! The control type selects one of the [`evaluator`]s through a single
//! exhaustive match in [`ActionState::for_control_type`].

pub mod evaluator;
pub mod state;

pub use evaluator::{EvalContext, Evaluator};
pub use state::{ActionState, EvaluatorState};

use std::fmt::{self, Display};
use std::str::FromStr;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::binding::Binding;
use crate::error::{InputError, Result};
use crate::processor::Processor;

/// Closed set of value shapes an action can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlType {
    Discrete,
    Continuous,
    Axis,
    Vector2,
    Vector3,
}

impl ControlType {
    pub const ALL: [ControlType; 5] = [
        ControlType::Discrete,
        ControlType::Continuous,
        ControlType::Axis,
        ControlType::Vector2,
        ControlType::Vector3,
    ];
}

impl Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlType::Discrete => "Discrete",
            ControlType::Continuous => "Continuous",
            ControlType::Axis => "Axis",
            ControlType::Vector2 => "Vector2",
            ControlType::Vector3 => "Vector3",
        };
        f.write_str(name)
    }
}

impl FromStr for ControlType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "discrete" => Ok(ControlType::Discrete),
            "continuous" => Ok(ControlType::Continuous),
            "axis" => Ok(ControlType::Axis),
            "vector2" => Ok(ControlType::Vector2),
            "vector3" => Ok(ControlType::Vector3),
            _ => Err(InputError::UnsupportedControlType(s.to_string())),
        }
    }
}

/// Resolved value of an action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionValue {
    Discrete(u32),
    Continuous(f32),
    Axis(f32),
    Vector2(Vec2),
    Vector3(Vec3),
}

impl ActionValue {
    pub fn control_type(&self) -> ControlType {
        match self {
            ActionValue::Discrete(_) => ControlType::Discrete,
            ActionValue::Continuous(_) => ControlType::Continuous,
            ActionValue::Axis(_) => ControlType::Axis,
            ActionValue::Vector2(_) => ControlType::Vector2,
            ActionValue::Vector3(_) => ControlType::Vector3,
        }
    }

    /// Whether the value is off its neutral state
    pub fn as_bool(&self) -> bool {
        match *self {
            ActionValue::Discrete(value) => value != 0,
            ActionValue::Continuous(value) | ActionValue::Axis(value) => value != 0.0,
            ActionValue::Vector2(value) => value != Vec2::ZERO,
            ActionValue::Vector3(value) => value != Vec3::ZERO,
        }
    }

    /// Scalar view; vectors report their length
    pub fn as_f32(&self) -> f32 {
        match *self {
            ActionValue::Discrete(value) => value as f32,
            ActionValue::Continuous(value) | ActionValue::Axis(value) => value,
            ActionValue::Vector2(value) => value.length(),
            ActionValue::Vector3(value) => value.length(),
        }
    }

    pub fn as_vec2(&self) -> Vec2 {
        match *self {
            ActionValue::Vector2(value) => value,
            ActionValue::Vector3(value) => value.truncate(),
            _ => Vec2::new(self.as_f32(), 0.0),
        }
    }

    pub fn as_vec3(&self) -> Vec3 {
        match *self {
            ActionValue::Vector3(value) => value,
            ActionValue::Vector2(value) => value.extend(0.0),
            _ => Vec3::new(self.as_f32(), 0.0, 0.0),
        }
    }
}

/// Handle returned by [`Action::add_binding`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

#[derive(Debug)]
pub struct Action {
    name: String,
    bindings: Vec<(BindingId, Binding)>,
    next_binding: u64,
    processors: Vec<Processor>,
    state: ActionState,
}

impl Action {
    pub fn new(name: impl Into<String>, control_type: ControlType) -> Self {
        Self {
            name: name.into(),
            bindings: Vec::new(),
            next_binding: 0,
            processors: Vec::new(),
            state: ActionState::for_control_type(control_type),
        }
    }

    /// Builds an action from a control type name, e.g. `"Vector2"`
    pub fn from_type_name(name: impl Into<String>, control_type: &str) -> Result<Self> {
        let control_type = control_type.parse()?;
        Ok(Self::new(name, control_type))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn control_type(&self) -> ControlType {
        self.state.control_type()
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().map(|(_, binding)| binding)
    }

    pub fn add_binding(&mut self, binding: impl Into<Binding>) -> BindingId {
        let id = BindingId(self.next_binding);
        self.next_binding += 1;
        self.bindings.push((id, binding.into()));
        id
    }

    pub fn with_binding(mut self, binding: impl Into<Binding>) -> Self {
        self.add_binding(binding);
        self
    }

    pub fn remove_binding(&mut self, id: BindingId) -> Option<Binding> {
        let index = self.bindings.iter().position(|(bound, _)| *bound == id)?;
        Some(self.bindings.remove(index).1)
    }

    pub fn clear_bindings(&mut self) {
        self.bindings.clear();
    }

    /// Appends to the action-level chain; runs after all bindings are folded
    pub fn add_processor(&mut self, processor: Processor) {
        self.processors.push(processor);
    }

    pub fn with_processor(mut self, processor: Processor) -> Self {
        self.add_processor(processor);
        self
    }

    pub fn remove_processor(&mut self, index: usize) -> Option<Processor> {
        (index < self.processors.len()).then(|| self.processors.remove(index))
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    pub fn value(&self) -> ActionValue {
        self.state.value()
    }

    /// Became active on the last update
    pub fn just_pressed(&self) -> bool {
        self.state.value().as_bool() && !self.state.previous().as_bool()
    }

    /// Became neutral on the last update
    pub fn just_released(&self) -> bool {
        !self.state.value().as_bool() && self.state.previous().as_bool()
    }

    /// Re-evaluates against the snapshot in `ctx`
    pub fn update(&mut self, ctx: &EvalContext<'_>) {
        self.state.update(
            ctx,
            self.bindings.iter().map(|(_, binding)| binding),
            &self.processors,
        );
        trace!("Action {} = {:?}", self.name, self.state.value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdapterRegistry;
    use crate::binding::{CompositeBinding, Control, SingleBinding};
    use crate::device::{
        Device, DeviceMap, DeviceSnapshot, DeviceType, EventTarget, KeyboardDevice, KeyboardEvent,
        KeyboardInput, PointerDevice, PointerEvent, PointerPhase,
    };

    const ORDERS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    struct Rig {
        devices: DeviceMap,
        adapters: AdapterRegistry,
        keyboard: EventTarget<KeyboardInput>,
        pointer: EventTarget<PointerEvent>,
    }

    impl Rig {
        fn new() -> Self {
            let keyboard = EventTarget::new();
            let pointer = EventTarget::new();
            let mut devices = DeviceMap::new();
            let mut keyboard_device = KeyboardDevice::new(keyboard.clone());
            keyboard_device.connect();
            let mut pointer_device = PointerDevice::new(pointer.clone());
            pointer_device.connect();
            devices.insert(DeviceType::Keyboard, Box::new(keyboard_device));
            devices.insert(DeviceType::Pointer, Box::new(pointer_device));
            Self {
                devices,
                adapters: AdapterRegistry::default(),
                keyboard,
                pointer,
            }
        }

        /// Touch contact `id` landing in the next free slot
        fn touch(&self, id: u32, buttons: u32, pressure: f32, movement: Vec2) {
            self.pointer.dispatch(
                &PointerEvent::new(id, "touch", PointerPhase::Down)
                    .with_buttons(buttons)
                    .with_pressure(pressure)
                    .with_movement(movement),
            );
        }

        fn press(&self, code: &str) {
            self.keyboard.dispatch(&KeyboardEvent::down(code).into());
        }

        fn run(&self, action: &mut Action) -> ActionValue {
            let snapshot = DeviceSnapshot::capture(&self.devices);
            action.update(&EvalContext::new(&snapshot, &self.adapters));
            action.value()
        }
    }

    fn touch_slots() -> [Binding; 3] {
        [
            Control::pointer("Touch0").into(),
            Control::pointer("Touch1").into(),
            Control::pointer("Touch2").into(),
        ]
    }

    fn every_order(rig: &Rig, control_type: ControlType, bindings: &[Binding; 3]) -> ActionValue {
        let mut results = ORDERS.iter().map(|order| {
            let mut action = Action::new("permuted", control_type);
            for &index in order {
                action.add_binding(bindings[index].clone());
            }
            rig.run(&mut action)
        });

        let first = results.next().unwrap();
        for result in results {
            assert_eq!(result, first);
        }
        first
    }

    #[test]
    fn discrete_is_order_invariant() {
        let rig = Rig::new();
        rig.touch(1, 0, 0.1, Vec2::ZERO);
        rig.touch(2, 1, 0.5, Vec2::ZERO);
        rig.touch(3, 0, 0.2, Vec2::ZERO);

        let value = every_order(&rig, ControlType::Discrete, &touch_slots());
        assert_eq!(value, ActionValue::Discrete(1));
    }

    #[test]
    fn continuous_is_order_invariant() {
        let rig = Rig::new();
        rig.touch(1, 1, 0.2, Vec2::ZERO);
        rig.touch(2, 1, 0.9, Vec2::ZERO);
        rig.touch(3, 1, 0.5, Vec2::ZERO);

        let value = every_order(&rig, ControlType::Continuous, &touch_slots());
        assert_eq!(value, ActionValue::Continuous(0.9));
    }

    #[test]
    fn axis_is_order_invariant() {
        let rig = Rig::new();
        rig.touch(1, 1, 0.2, Vec2::ZERO);
        rig.touch(2, 1, 0.9, Vec2::ZERO);
        rig.touch(3, 1, 0.5, Vec2::ZERO);

        let bindings: [Binding; 3] = [
            Control::pointer("Touch0").into(),
            SingleBinding::new(Control::pointer("Touch1"))
                .with_processor(Processor::Invert)
                .into(),
            Control::pointer("Touch2").into(),
        ];
        let value = every_order(&rig, ControlType::Axis, &bindings);
        assert_eq!(value, ActionValue::Axis(-0.9));
    }

    #[test]
    fn vectors_are_order_invariant() {
        let rig = Rig::new();
        rig.touch(1, 1, 1.0, Vec2::new(1.0, 0.0));
        rig.touch(2, 1, 1.0, Vec2::new(0.0, -3.0));
        rig.touch(3, 1, 1.0, Vec2::new(2.0, 2.0));

        let value = every_order(&rig, ControlType::Vector2, &touch_slots());
        assert_eq!(value, ActionValue::Vector2(Vec2::new(0.0, -3.0)));

        let value = every_order(&rig, ControlType::Vector3, &touch_slots());
        assert_eq!(value, ActionValue::Vector3(Vec3::new(0.0, -3.0, 0.0)));
    }

    #[test]
    fn composite_axis_arithmetic() {
        let rig = Rig::new();
        let mut action = Action::new("throttle", ControlType::Axis).with_binding(
            CompositeBinding::axis_1d(
                vec![Control::pointer("Touch0")],
                vec![Control::pointer("Touch1")],
            ),
        );

        rig.touch(1, 1, 0.7, Vec2::ZERO);
        assert_eq!(rig.run(&mut action), ActionValue::Axis(0.7));

        rig.pointer
            .dispatch(&PointerEvent::new(1, "touch", PointerPhase::Move).with_pressure(0.4));
        rig.touch(2, 1, 0.9, Vec2::ZERO);
        assert!((rig.run(&mut action).as_f32() - -0.5).abs() < 1e-6);
    }

    #[test]
    fn composite_2d_projects_onto_vector() {
        let rig = Rig::new();
        let mut action = Action::new("move", ControlType::Vector2).with_binding(
            CompositeBinding::axis_2d(
                vec![Control::keyboard("KeyA")],
                vec![Control::keyboard("KeyD")],
                vec![Control::keyboard("KeyW"), Control::keyboard("ArrowUp")],
                vec![Control::keyboard("KeyS")],
            ),
        );

        rig.press("ArrowUp");
        rig.press("KeyA");
        assert_eq!(rig.run(&mut action), ActionValue::Vector2(Vec2::new(-1.0, 1.0)));

        rig.press("KeyD");
        rig.press("KeyS");
        assert_eq!(rig.run(&mut action), ActionValue::Vector2(Vec2::ZERO));
    }

    #[test]
    fn composite_3d_fills_every_axis() {
        let rig = Rig::new();
        let key = |code: &str| vec![Control::keyboard(code)];
        let mut action = Action::new("fly", ControlType::Vector3).with_binding(
            CompositeBinding::axis_3d(
                key("KeyA"),
                key("KeyD"),
                key("Space"),
                key("ShiftLeft"),
                key("KeyW"),
                key("KeyS"),
            ),
        );

        rig.press("KeyD");
        rig.press("ShiftLeft");
        rig.press("KeyW");
        assert_eq!(
            rig.run(&mut action),
            ActionValue::Vector3(Vec3::new(1.0, -1.0, 1.0))
        );

        rig.press("KeyS");
        assert_eq!(
            rig.run(&mut action),
            ActionValue::Vector3(Vec3::new(1.0, -1.0, 0.0))
        );
    }

    #[test]
    fn position_binding_reads_client_coordinates() {
        let rig = Rig::new();
        let mut action = Action::new("cursor", ControlType::Vector2)
            .with_binding(SingleBinding::new(Control::pointer("Mouse")).with_position());
        let mut delta = Action::new("look", ControlType::Vector2)
            .with_binding(Control::pointer("Mouse"));

        rig.pointer.dispatch(
            &PointerEvent::new(1, "mouse", PointerPhase::Move)
                .with_movement(Vec2::new(2.0, -1.0))
                .with_client(Vec2::new(320.0, 240.0)),
        );
        assert_eq!(
            rig.run(&mut action),
            ActionValue::Vector2(Vec2::new(320.0, 240.0))
        );
        assert_eq!(rig.run(&mut delta), ActionValue::Vector2(Vec2::new(2.0, -1.0)));
    }

    #[test]
    fn discrete_or_of_pressed_and_released() {
        let rig = Rig::new();
        let mut action = Action::new("jump", ControlType::Discrete)
            .with_binding(Control::keyboard("Space"))
            .with_binding(Control::keyboard("KeyJ"));

        rig.press("KeyJ");
        assert_eq!(rig.run(&mut action), ActionValue::Discrete(1));
        assert!(action.just_pressed());
    }

    #[test]
    fn update_is_idempotent() {
        let rig = Rig::new();
        rig.touch(1, 1, 0.6, Vec2::new(4.0, 1.0));
        let mut action = Action::new("look", ControlType::Vector2)
            .with_binding(Control::pointer("Touch0"))
            .with_processor(Processor::Scale(0.5));

        let first = rig.run(&mut action);
        let second = rig.run(&mut action);
        assert_eq!(first, ActionValue::Vector2(Vec2::new(2.0, 0.5)));
        assert_eq!(first, second);
        assert!(!action.just_pressed());
    }

    #[test]
    fn binding_processor_chain_order() {
        let rig = Rig::new();
        rig.touch(1, 1, 0.6, Vec2::ZERO);

        let mut scale_first = Action::new("a", ControlType::Continuous).with_binding(
            SingleBinding::new(Control::pointer("Touch0"))
                .with_processor(Processor::Scale(2.0))
                .with_processor(Processor::Clamp { min: 0.0, max: 1.0 }),
        );
        let mut clamp_first = Action::new("b", ControlType::Continuous).with_binding(
            SingleBinding::new(Control::pointer("Touch0"))
                .with_processor(Processor::Clamp { min: 0.0, max: 1.0 })
                .with_processor(Processor::Scale(2.0)),
        );

        assert_eq!(rig.run(&mut scale_first), ActionValue::Continuous(1.0));
        assert!((rig.run(&mut clamp_first).as_f32() - 1.2).abs() < 1e-6);
    }

    #[test]
    fn edges_follow_key_state() {
        let rig = Rig::new();
        let mut action =
            Action::new("jump", ControlType::Discrete).with_binding(Control::keyboard("Space"));

        rig.run(&mut action);
        assert!(!action.just_pressed() && !action.just_released());

        rig.press("Space");
        rig.run(&mut action);
        assert!(action.just_pressed());

        rig.keyboard.dispatch(&KeyboardEvent::up("Space").into());
        rig.run(&mut action);
        assert!(action.just_released());
    }

    #[test]
    fn bindings_and_processors_are_removable() {
        let mut action = Action::new("look", ControlType::Vector2);
        let mouse =
            action.add_binding(SingleBinding::new(Control::pointer("Mouse")).with_position());
        let touch = action.add_binding(Control::pointer("Touch0"));
        action.add_processor(Processor::NormalizeVector);

        assert!(action.remove_binding(mouse).is_some());
        assert!(action.remove_binding(mouse).is_none());
        assert_eq!(action.bindings().count(), 1);
        assert!(action.remove_binding(touch).is_some());

        assert_eq!(action.remove_processor(1), None);
        assert_eq!(action.remove_processor(0), Some(Processor::NormalizeVector));
        assert!(action.processors().is_empty());

        action.add_binding(Control::pointer("Touch1"));
        action.clear_bindings();
        assert_eq!(action.bindings().count(), 0);
    }

    #[test]
    fn control_type_names() {
        let action = Action::from_type_name("look", "vector2").unwrap();
        assert_eq!(action.control_type(), ControlType::Vector2);
        assert_eq!(action.name(), "look");

        assert_eq!(
            Action::from_type_name("broken", "Quaternion").unwrap_err(),
            InputError::UnsupportedControlType("Quaternion".to_string())
        );
        for control_type in ControlType::ALL {
            assert_eq!(control_type.to_string().parse::<ControlType>(), Ok(control_type));
        }
    }

    #[test]
    fn value_views() {
        assert!(ActionValue::Discrete(1).as_bool());
        assert_eq!(ActionValue::Axis(-0.5).as_vec2(), Vec2::new(-0.5, 0.0));
        assert_eq!(ActionValue::Vector2(Vec2::new(3.0, 4.0)).as_f32(), 5.0);
        assert_eq!(
            ActionValue::Vector2(Vec2::new(1.0, 2.0)).as_vec3(),
            Vec3::new(1.0, 2.0, 0.0)
        );
        assert!(!ActionValue::Vector3(Vec3::ZERO).as_bool());
    }
}
