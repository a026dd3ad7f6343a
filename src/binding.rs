//! Bindings between controls and actions
//!
//! A [`Binding`] says which controls feed an action: one control
//! ([`SingleBinding`]) or named direction groups folded into an axis value
//! ([`CompositeBinding`]). Both carry their own ordered processor chain.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::device::DeviceType;
use crate::processor::Processor;

/// One raw input source, compared by value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Control {
    pub device: DeviceType,
    pub key: String,
}

impl Control {
    pub fn new(device: DeviceType, key: impl Into<String>) -> Self {
        Self {
            device,
            key: key.into(),
        }
    }

    pub fn keyboard(key: impl Into<String>) -> Self {
        Self::new(DeviceType::Keyboard, key)
    }

    pub fn pointer(key: impl Into<String>) -> Self {
        Self::new(DeviceType::Pointer, key)
    }

    pub fn gamepad(key: impl Into<String>) -> Self {
        Self::new(DeviceType::Gamepad, key)
    }

    pub fn gyroscope(key: impl Into<String>) -> Self {
        Self::new(DeviceType::Gyroscope, key)
    }
}

impl Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device, self.key)
    }
}

/// Which vector capability a single binding reads for vector actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorSource {
    #[default]
    Delta,
    Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleBinding {
    pub control: Control,
    #[serde(default)]
    pub source: VectorSource,
    #[serde(default)]
    pub processors: Vec<Processor>,
}

impl SingleBinding {
    pub fn new(control: Control) -> Self {
        Self {
            control,
            source: VectorSource::Delta,
            processors: Vec::new(),
        }
    }

    pub fn with_processor(mut self, processor: Processor) -> Self {
        self.processors.push(processor);
        self
    }

    /// Reads absolute position instead of movement on vector actions
    pub fn with_position(mut self) -> Self {
        self.source = VectorSource::Position;
        self
    }
}

/// Direction names of composite bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
    Left,
    Right,
    Up,
    Down,
    Forward,
    Backward,
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Positive => "positive",
            Direction::Negative => "negative",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        };
        f.write_str(name)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "positive" => Ok(Direction::Positive),
            "negative" => Ok(Direction::Negative),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "forward" => Ok(Direction::Forward),
            "backward" => Ok(Direction::Backward),
            _ => Err(format!("Unknown direction: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositeKind {
    Axis1D,
    Axis2D,
    Axis3D,
}

impl CompositeKind {
    pub fn directions(self) -> &'static [Direction] {
        match self {
            CompositeKind::Axis1D => &[Direction::Positive, Direction::Negative],
            CompositeKind::Axis2D => &[
                Direction::Left,
                Direction::Right,
                Direction::Up,
                Direction::Down,
            ],
            CompositeKind::Axis3D => &[
                Direction::Left,
                Direction::Right,
                Direction::Up,
                Direction::Down,
                Direction::Forward,
                Direction::Backward,
            ],
        }
    }
}

/// Controls grouped per direction. Any control in a group satisfies that
/// direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Composite {
    Axis1D {
        positive: Vec<Control>,
        negative: Vec<Control>,
    },
    Axis2D {
        left: Vec<Control>,
        right: Vec<Control>,
        up: Vec<Control>,
        down: Vec<Control>,
    },
    Axis3D {
        left: Vec<Control>,
        right: Vec<Control>,
        up: Vec<Control>,
        down: Vec<Control>,
        forward: Vec<Control>,
        backward: Vec<Control>,
    },
}

impl Composite {
    pub fn kind(&self) -> CompositeKind {
        match self {
            Composite::Axis1D { .. } => CompositeKind::Axis1D,
            Composite::Axis2D { .. } => CompositeKind::Axis2D,
            Composite::Axis3D { .. } => CompositeKind::Axis3D,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeBinding {
    pub composite: Composite,
    #[serde(default)]
    pub processors: Vec<Processor>,
}

impl CompositeBinding {
    pub fn axis_1d(positive: Vec<Control>, negative: Vec<Control>) -> Self {
        Composite::Axis1D { positive, negative }.into()
    }

    pub fn axis_2d(
        left: Vec<Control>,
        right: Vec<Control>,
        up: Vec<Control>,
        down: Vec<Control>,
    ) -> Self {
        Composite::Axis2D {
            left,
            right,
            up,
            down,
        }
        .into()
    }

    pub fn axis_3d(
        left: Vec<Control>,
        right: Vec<Control>,
        up: Vec<Control>,
        down: Vec<Control>,
        forward: Vec<Control>,
        backward: Vec<Control>,
    ) -> Self {
        Composite::Axis3D {
            left,
            right,
            up,
            down,
            forward,
            backward,
        }
        .into()
    }

    /// Builds a composite from loose direction groups; missing directions
    /// stay empty.
    ///
    /// # Panics
    ///
    /// Panics if `groups` names a direction `kind` does not have.
    pub fn from_groups(kind: CompositeKind, mut groups: HashMap<Direction, Vec<Control>>) -> Self {
        let allowed = kind.directions();
        if let Some(direction) = groups.keys().find(|d| !allowed.contains(d)) {
            panic!("direction {direction} is not part of a {kind:?} composite");
        }

        let mut take = |direction: Direction| groups.remove(&direction).unwrap_or_default();
        match kind {
            CompositeKind::Axis1D => {
                Self::axis_1d(take(Direction::Positive), take(Direction::Negative))
            }
            CompositeKind::Axis2D => Self::axis_2d(
                take(Direction::Left),
                take(Direction::Right),
                take(Direction::Up),
                take(Direction::Down),
            ),
            CompositeKind::Axis3D => Self::axis_3d(
                take(Direction::Left),
                take(Direction::Right),
                take(Direction::Up),
                take(Direction::Down),
                take(Direction::Forward),
                take(Direction::Backward),
            ),
        }
    }

    pub fn with_processor(mut self, processor: Processor) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn kind(&self) -> CompositeKind {
        self.composite.kind()
    }

    /// Controls bound to `direction`; empty for directions the composite lacks
    pub fn controls(&self, direction: Direction) -> &[Control] {
        match (&self.composite, direction) {
            (Composite::Axis1D { positive, .. }, Direction::Positive) => positive,
            (Composite::Axis1D { negative, .. }, Direction::Negative) => negative,
            (Composite::Axis2D { left, .. }, Direction::Left)
            | (Composite::Axis3D { left, .. }, Direction::Left) => left,
            (Composite::Axis2D { right, .. }, Direction::Right)
            | (Composite::Axis3D { right, .. }, Direction::Right) => right,
            (Composite::Axis2D { up, .. }, Direction::Up)
            | (Composite::Axis3D { up, .. }, Direction::Up) => up,
            (Composite::Axis2D { down, .. }, Direction::Down)
            | (Composite::Axis3D { down, .. }, Direction::Down) => down,
            (Composite::Axis3D { forward, .. }, Direction::Forward) => forward,
            (Composite::Axis3D { backward, .. }, Direction::Backward) => backward,
            _ => &[],
        }
    }
}

impl From<Composite> for CompositeBinding {
    fn from(composite: Composite) -> Self {
        Self {
            composite,
            processors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Binding {
    Single(SingleBinding),
    Composite(CompositeBinding),
}

impl Binding {
    pub fn processors(&self) -> &[Processor] {
        match self {
            Binding::Single(single) => &single.processors,
            Binding::Composite(composite) => &composite.processors,
        }
    }
}

impl From<SingleBinding> for Binding {
    fn from(binding: SingleBinding) -> Self {
        Binding::Single(binding)
    }
}

impl From<CompositeBinding> for Binding {
    fn from(binding: CompositeBinding) -> Self {
        Binding::Composite(binding)
    }
}

impl From<Control> for Binding {
    fn from(control: Control) -> Self {
        Binding::Single(SingleBinding::new(control))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<Control> {
        names.iter().map(|name| Control::keyboard(*name)).collect()
    }

    #[test]
    fn bindings_survive_a_toml_round_trip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Layout {
            bindings: Vec<Binding>,
        }

        let layout = Layout {
            bindings: vec![
                SingleBinding::new(Control::pointer("Mouse"))
                    .with_position()
                    .with_processor(Processor::Clamp { min: 0.0, max: 1.0 })
                    .into(),
                CompositeBinding::axis_1d(keys(&["KeyE"]), keys(&["KeyQ", "ArrowDown"])).into(),
            ],
        };

        let text = toml::to_string(&layout).unwrap();
        let parsed: Layout = toml::from_str(&text).unwrap();
        assert_eq!(parsed, layout);
    }

    #[test]
    fn controls_compare_by_value() {
        assert_eq!(Control::keyboard("KeyW"), Control::new(DeviceType::Keyboard, "KeyW"));
        assert_ne!(Control::keyboard("KeyW"), Control::gamepad("KeyW"));
        assert_eq!(Control::pointer("Mouse").to_string(), "pointer/Mouse");
    }

    #[test]
    fn from_groups_fills_missing_directions() {
        let mut groups = HashMap::new();
        groups.insert(Direction::Up, keys(&["KeyW", "ArrowUp"]));
        groups.insert(Direction::Left, keys(&["KeyA"]));

        let composite = CompositeBinding::from_groups(CompositeKind::Axis2D, groups);
        assert_eq!(composite.kind(), CompositeKind::Axis2D);
        assert_eq!(composite.controls(Direction::Up).len(), 2);
        assert_eq!(composite.controls(Direction::Left), keys(&["KeyA"]).as_slice());
        assert!(composite.controls(Direction::Down).is_empty());
        assert!(composite.controls(Direction::Forward).is_empty());
    }

    #[test]
    #[should_panic(expected = "not part of a Axis1D composite")]
    fn from_groups_rejects_foreign_direction() {
        let mut groups = HashMap::new();
        groups.insert(Direction::Forward, keys(&["KeyE"]));
        CompositeBinding::from_groups(CompositeKind::Axis1D, groups);
    }

    #[test]
    fn direction_names_parse() {
        assert_eq!("Backward".parse::<Direction>(), Ok(Direction::Backward));
        assert!("sideways".parse::<Direction>().is_err());
        for direction in CompositeKind::Axis3D.directions() {
            assert_eq!(direction.to_string().parse::<Direction>(), Ok(*direction));
        }
    }

    #[test]
    fn binding_processors_follow_variant() {
        let single: Binding = SingleBinding::new(Control::keyboard("Space"))
            .with_processor(Processor::Invert)
            .into();
        assert_eq!(single.processors(), &[Processor::Invert]);

        let composite: Binding = CompositeBinding::axis_1d(keys(&["KeyD"]), keys(&["KeyA"]))
            .with_processor(Processor::Scale(0.5))
            .into();
        assert_eq!(composite.processors(), &[Processor::Scale(0.5)]);
    }
}
