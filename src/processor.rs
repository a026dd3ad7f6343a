//! Value processors
//!
//! A [`Processor`] is a pure transform applied after evaluation, either to
//! one binding's raw value or to an action's resolved value. Chains run in
//! insertion order and order matters:
//!
//! ```
//! use inputmap::processor::{apply_processors, Processor};
//!
//! let clamp_last = [Processor::Scale(2.0), Processor::Clamp { min: 0.0, max: 1.0 }];
//! let scale_last = [Processor::Clamp { min: 0.0, max: 1.0 }, Processor::Scale(2.0)];
//!
//! assert_eq!(apply_processors(0.6_f32, &clamp_last), 1.0);
//! assert_eq!(apply_processors(0.6_f32, &scale_last), 1.2);
//! ```
//!
//! Scalar parameters apply per component to vectors, except for
//! [`Processor::NormalizeVector`] and [`Processor::DeadZone`], which work on
//! the vector's length.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Built-in value transforms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Processor {
    /// Clamps into `[min, max]`
    Clamp { min: f32, max: f32 },
    /// Maps `[min, max]` linearly onto `[0, 1]`; a degenerate range yields 0
    Normalize { min: f32, max: f32 },
    /// Scales to unit length (sign for scalars); zero stays zero
    NormalizeVector,
    /// Multiplies by a factor
    Scale(f32),
    /// Negates; on discrete values this flips pressed/released
    Invert,
    /// Maps `[from_min, from_max]` linearly onto `[to_min, to_max]`
    Remap {
        from_min: f32,
        from_max: f32,
        to_min: f32,
        to_max: f32,
    },
    /// Zeroes magnitudes below the threshold and rescales the rest to `[0, 1]`
    DeadZone(f32),
}

/// Rescales `value` to the range outside the dead zone
pub fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone {
        0.0
    } else if deadzone >= 1.0 {
        value.signum()
    } else {
        let sign = if value < 0.0 { -1.0 } else { 1.0 };
        sign * (value.abs() - deadzone) / (1.0 - deadzone)
    }
}

fn remap(value: f32, from_min: f32, from_max: f32, to_min: f32, to_max: f32) -> f32 {
    let span = from_max - from_min;
    if span == 0.0 {
        return to_min;
    }
    to_min + (value - from_min) / span * (to_max - to_min)
}

impl Processor {
    fn scalar(&self, value: f32) -> f32 {
        match *self {
            Processor::Clamp { min, max } => value.clamp(min.min(max), max.max(min)),
            Processor::Normalize { min, max } => remap(value, min, max, 0.0, 1.0),
            Processor::NormalizeVector => {
                if value == 0.0 {
                    0.0
                } else {
                    value.signum()
                }
            }
            Processor::Scale(factor) => value * factor,
            Processor::Invert => -value,
            Processor::Remap {
                from_min,
                from_max,
                to_min,
                to_max,
            } => remap(value, from_min, from_max, to_min, to_max),
            Processor::DeadZone(threshold) => apply_deadzone(value, threshold),
        }
    }

    fn radial(&self, length: f32) -> Option<f32> {
        match *self {
            Processor::NormalizeVector => Some(if length == 0.0 { 0.0 } else { 1.0 }),
            Processor::DeadZone(threshold) => Some(apply_deadzone(length, threshold)),
            _ => None,
        }
    }
}

/// Value shapes a [`Processor`] can transform
pub trait Processable: Copy {
    fn process(self, processor: &Processor) -> Self;
}

impl Processable for f32 {
    fn process(self, processor: &Processor) -> Self {
        processor.scalar(self)
    }
}

impl Processable for u32 {
    fn process(self, processor: &Processor) -> Self {
        match processor {
            Processor::Invert => u32::from(self == 0),
            _ => processor.scalar(self as f32).round().max(0.0) as u32,
        }
    }
}

impl Processable for Vec2 {
    fn process(self, processor: &Processor) -> Self {
        match processor.radial(self.length()) {
            Some(length) => self.normalize_or_zero() * length,
            None => Vec2::new(processor.scalar(self.x), processor.scalar(self.y)),
        }
    }
}

impl Processable for Vec3 {
    fn process(self, processor: &Processor) -> Self {
        match processor.radial(self.length()) {
            Some(length) => self.normalize_or_zero() * length,
            None => Vec3::new(
                processor.scalar(self.x),
                processor.scalar(self.y),
                processor.scalar(self.z),
            ),
        }
    }
}

/// Runs `value` through `processors` in order
pub fn apply_processors<V: Processable>(value: V, processors: &[Processor]) -> V {
    processors
        .iter()
        .fold(value, |value, processor| value.process(processor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Processor::Clamp { min: -1.0, max: 1.0 }, 3.0, 1.0)]
    #[case(Processor::Clamp { min: -1.0, max: 1.0 }, -3.0, -1.0)]
    #[case(Processor::Normalize { min: 0.0, max: 200.0 }, 50.0, 0.25)]
    #[case(Processor::Normalize { min: 5.0, max: 5.0 }, 7.0, 0.0)]
    #[case(Processor::NormalizeVector, -0.3, -1.0)]
    #[case(Processor::NormalizeVector, 0.0, 0.0)]
    #[case(Processor::Scale(2.5), 2.0, 5.0)]
    #[case(Processor::Invert, 0.75, -0.75)]
    #[case(Processor::Remap { from_min: -1.0, from_max: 1.0, to_min: 0.0, to_max: 10.0 }, 0.0, 5.0)]
    #[case(Processor::DeadZone(0.2), 0.1, 0.0)]
    #[case(Processor::DeadZone(0.2), -0.6, -0.5)]
    fn scalar_processors(#[case] processor: Processor, #[case] input: f32, #[case] expected: f32) {
        assert!((input.process(&processor) - expected).abs() < 1e-6);
    }

    #[test]
    fn chain_order_matters() {
        let scale_then_clamp = [Processor::Scale(2.0), Processor::Clamp { min: 0.0, max: 1.0 }];
        let clamp_then_scale = [Processor::Clamp { min: 0.0, max: 1.0 }, Processor::Scale(2.0)];

        assert_eq!(apply_processors(0.6_f32, &scale_then_clamp), 1.0);
        assert_eq!(apply_processors(0.6_f32, &clamp_then_scale), 1.2);
    }

    #[test]
    fn empty_chain_is_identity() {
        assert_eq!(apply_processors(Vec2::new(0.3, -0.2), &[]), Vec2::new(0.3, -0.2));
        assert_eq!(apply_processors(1_u32, &[]), 1);
    }

    #[test]
    fn vector_normalization_keeps_direction() {
        let diagonal = Vec2::new(1.0, 1.0).process(&Processor::NormalizeVector);
        assert!((diagonal.length() - 1.0).abs() < 1e-6);
        assert!((diagonal.x - diagonal.y).abs() < 1e-6);

        assert_eq!(Vec3::ZERO.process(&Processor::NormalizeVector), Vec3::ZERO);
    }

    #[test]
    fn vector_deadzone_is_radial() {
        let small = Vec2::new(0.1, 0.1).process(&Processor::DeadZone(0.2));
        assert_eq!(small, Vec2::ZERO);

        let full = Vec2::new(1.0, 0.0).process(&Processor::DeadZone(0.2));
        assert!((full.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn vector_scalars_apply_per_component() {
        let v = Vec3::new(2.0, -2.0, 0.5).process(&Processor::Clamp { min: -1.0, max: 1.0 });
        assert_eq!(v, Vec3::new(1.0, -1.0, 0.5));
    }

    #[test]
    fn discrete_invert_flips_state() {
        assert_eq!(1_u32.process(&Processor::Invert), 0);
        assert_eq!(0_u32.process(&Processor::Invert), 1);
        assert_eq!(1_u32.process(&Processor::Scale(3.0)), 3);
    }
}
