//! Per-control-type evaluation strategies
//!
//! Each evaluator turns one binding into a raw value and folds raw values
//! into the action's accumulator. `resolve` is commutative, associative and
//! idempotent for every evaluator, so binding order never changes the
//! result.

use std::fmt::Debug;

use glam::{Vec2, Vec3};

use crate::adapter::{AdapterRegistry, EventAdapter};
use crate::binding::{
    Binding, CompositeBinding, CompositeKind, Control, Direction, SingleBinding, VectorSource,
};
use crate::device::{DeviceSnapshot, RawEvent};
use crate::processor::Processable;

/// Read-only view of one device snapshot and the adapters for one
/// evaluation pass
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    snapshot: &'a DeviceSnapshot,
    adapters: &'a AdapterRegistry,
}

impl<'a> EvalContext<'a> {
    pub fn new(snapshot: &'a DeviceSnapshot, adapters: &'a AdapterRegistry) -> Self {
        Self { snapshot, adapters }
    }

    /// Latest event of `control` with the adapter for its device type.
    ///
    /// `None` when the device, the event or the adapter is missing.
    pub fn lookup(&self, control: &Control) -> Option<(&'a RawEvent, &'a dyn EventAdapter)> {
        let event = self.snapshot.event(control.device, &control.key)?;
        let adapter = self.adapters.get(control.device)?;
        Some((event, adapter))
    }

    /// Strongest continuous signal among `controls`, 0 when none is active
    pub fn signal(&self, controls: &[Control]) -> f32 {
        controls
            .iter()
            .filter_map(|control| self.lookup(control))
            .map(|(event, adapter)| adapter.continuous(event))
            .fold(0.0, f32::max)
    }

    /// Positive-minus-negative arithmetic over all three axes; axes the
    /// composite does not have come out as 0
    pub fn composite(&self, binding: &CompositeBinding) -> Vec3 {
        let axis = |positive, negative| {
            self.signal(binding.controls(positive)) - self.signal(binding.controls(negative))
        };
        match binding.kind() {
            CompositeKind::Axis1D => {
                Vec3::new(axis(Direction::Positive, Direction::Negative), 0.0, 0.0)
            }
            _ => Vec3::new(
                axis(Direction::Right, Direction::Left),
                axis(Direction::Up, Direction::Down),
                axis(Direction::Forward, Direction::Backward),
            ),
        }
    }

    fn vector(&self, binding: &SingleBinding) -> Vec3 {
        match self.lookup(&binding.control) {
            Some((event, adapter)) => match binding.source {
                VectorSource::Delta => adapter.delta(event),
                VectorSource::Position => adapter.position(event),
            },
            None => Vec3::ZERO,
        }
    }
}

pub trait Evaluator: Default + Debug {
    type Value: Processable + PartialEq + Debug;

    /// Neutral value; identity of [`resolve`](Evaluator::resolve)
    fn reset(&self) -> Self::Value;

    /// Writes the raw value of `binding` into `scratch`
    fn evaluate(&self, ctx: &EvalContext<'_>, binding: &Binding, scratch: &mut Self::Value);

    fn resolve(&self, accumulated: Self::Value, value: Self::Value) -> Self::Value;
}

/// Pressed state, combined with bitwise OR
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscreteEvaluator;

impl Evaluator for DiscreteEvaluator {
    type Value = u32;

    fn reset(&self) -> u32 {
        0
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, binding: &Binding, scratch: &mut u32) {
        *scratch = match binding {
            Binding::Single(single) => ctx
                .lookup(&single.control)
                .map_or(0, |(event, adapter)| adapter.discrete(event)),
            Binding::Composite(composite) => u32::from(ctx.composite(composite) != Vec3::ZERO),
        };
    }

    fn resolve(&self, accumulated: u32, value: u32) -> u32 {
        accumulated | value
    }
}

fn scalar(ctx: &EvalContext<'_>, binding: &Binding) -> f32 {
    match binding {
        Binding::Single(single) => ctx
            .lookup(&single.control)
            .map_or(0.0, |(event, adapter)| adapter.continuous(event)),
        Binding::Composite(composite) => ctx.composite(composite).x,
    }
}

/// Analog magnitude, strongest binding wins
#[derive(Debug, Default, Clone, Copy)]
pub struct ContinuousEvaluator;

impl Evaluator for ContinuousEvaluator {
    type Value = f32;

    fn reset(&self) -> f32 {
        0.0
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, binding: &Binding, scratch: &mut f32) {
        *scratch = scalar(ctx, binding);
    }

    fn resolve(&self, accumulated: f32, value: f32) -> f32 {
        accumulated.max(value)
    }
}

/// Signed axis; the value farthest from center wins
#[derive(Debug, Default, Clone, Copy)]
pub struct AxisEvaluator;

impl Evaluator for AxisEvaluator {
    type Value = f32;

    fn reset(&self) -> f32 {
        0.0
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, binding: &Binding, scratch: &mut f32) {
        *scratch = scalar(ctx, binding);
    }

    /// Larger magnitude wins; equal magnitudes keep the larger signed value
    fn resolve(&self, accumulated: f32, value: f32) -> f32 {
        let (a, b) = (accumulated.abs(), value.abs());
        if a > b {
            accumulated
        } else if b > a {
            value
        } else {
            accumulated.max(value)
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Vector2Evaluator;

impl Evaluator for Vector2Evaluator {
    type Value = Vec2;

    fn reset(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, binding: &Binding, scratch: &mut Vec2) {
        *scratch = match binding {
            Binding::Single(single) => ctx.vector(single).truncate(),
            Binding::Composite(composite) => ctx.composite(composite).truncate(),
        };
    }

    fn resolve(&self, accumulated: Vec2, value: Vec2) -> Vec2 {
        if value.length_squared() > accumulated.length_squared() {
            value
        } else {
            accumulated
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Vector3Evaluator;

impl Evaluator for Vector3Evaluator {
    type Value = Vec3;

    fn reset(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, binding: &Binding, scratch: &mut Vec3) {
        *scratch = match binding {
            Binding::Single(single) => ctx.vector(single),
            Binding::Composite(composite) => ctx.composite(composite),
        };
    }

    fn resolve(&self, accumulated: Vec3, value: Vec3) -> Vec3 {
        if value.length_squared() > accumulated.length_squared() {
            value
        } else {
            accumulated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.4, -0.9, -0.9)]
    #[case(-0.2, 0.7, 0.7)]
    #[case(0.5, -0.5, 0.5)]
    #[case(0.0, -0.3, -0.3)]
    fn axis_resolve_is_symmetric(#[case] a: f32, #[case] b: f32, #[case] expected: f32) {
        let evaluator = AxisEvaluator;
        assert_eq!(evaluator.resolve(a, b), expected);
        assert_eq!(evaluator.resolve(b, a), expected);
        assert_eq!(evaluator.resolve(expected, expected), expected);
    }

    #[test]
    fn discrete_resolve_is_or() {
        let evaluator = DiscreteEvaluator;
        assert_eq!(evaluator.resolve(evaluator.reset(), 0), 0);
        assert_eq!(evaluator.resolve(1, 0), 1);
        assert_eq!(evaluator.resolve(1, 1), 1);
    }

    #[test]
    fn continuous_resolve_is_max() {
        let evaluator = ContinuousEvaluator;
        assert_eq!(evaluator.resolve(0.3, 0.8), 0.8);
        assert_eq!(evaluator.resolve(0.8, 0.3), 0.8);
    }

    #[test]
    fn vector_ties_keep_accumulator() {
        let evaluator = Vector2Evaluator;
        let kept = evaluator.resolve(Vec2::X, Vec2::Y);
        assert_eq!(kept, Vec2::X);
        assert_eq!(evaluator.resolve(Vec2::X, Vec2::new(0.0, 2.0)), Vec2::new(0.0, 2.0));

        let evaluator = Vector3Evaluator;
        assert_eq!(evaluator.resolve(Vec3::Z * 3.0, Vec3::X), Vec3::Z * 3.0);
    }
}
