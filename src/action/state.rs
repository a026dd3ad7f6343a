use super::evaluator::{
    AxisEvaluator, ContinuousEvaluator, DiscreteEvaluator, EvalContext, Evaluator,
    Vector2Evaluator, Vector3Evaluator,
};
use super::{ActionValue, ControlType};
use crate::binding::Binding;
use crate::processor::{apply_processors, Processor};

/// Accumulated value of one action, typed by its evaluator
#[derive(Debug)]
pub struct EvaluatorState<E: Evaluator> {
    evaluator: E,
    value: E::Value,
    previous: E::Value,
    scratch: E::Value,
}

impl<E: Evaluator> EvaluatorState<E> {
    pub fn new() -> Self {
        let evaluator = E::default();
        let neutral = evaluator.reset();
        Self {
            evaluator,
            value: neutral,
            previous: neutral,
            scratch: neutral,
        }
    }

    /// One evaluation pass over `bindings`; the previous value is kept for
    /// edge detection
    pub fn update<'b>(
        &mut self,
        ctx: &EvalContext<'_>,
        bindings: impl IntoIterator<Item = &'b Binding>,
        processors: &[Processor],
    ) {
        self.previous = self.value;

        let mut value = self.evaluator.reset();
        for binding in bindings {
            self.scratch = self.evaluator.reset();
            self.evaluator.evaluate(ctx, binding, &mut self.scratch);
            let raw = apply_processors(self.scratch, binding.processors());
            value = self.evaluator.resolve(value, raw);
        }

        self.value = apply_processors(value, processors);
    }

    pub fn value(&self) -> E::Value {
        self.value
    }

    pub fn previous(&self) -> E::Value {
        self.previous
    }
}

impl<E: Evaluator> Default for EvaluatorState<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Action state for each control type
#[derive(Debug)]
pub enum ActionState {
    Discrete(EvaluatorState<DiscreteEvaluator>),
    Continuous(EvaluatorState<ContinuousEvaluator>),
    Axis(EvaluatorState<AxisEvaluator>),
    Vector2(EvaluatorState<Vector2Evaluator>),
    Vector3(EvaluatorState<Vector3Evaluator>),
}

impl ActionState {
    pub fn for_control_type(control_type: ControlType) -> Self {
        match control_type {
            ControlType::Discrete => ActionState::Discrete(EvaluatorState::new()),
            ControlType::Continuous => ActionState::Continuous(EvaluatorState::new()),
            ControlType::Axis => ActionState::Axis(EvaluatorState::new()),
            ControlType::Vector2 => ActionState::Vector2(EvaluatorState::new()),
            ControlType::Vector3 => ActionState::Vector3(EvaluatorState::new()),
        }
    }

    pub fn control_type(&self) -> ControlType {
        match self {
            ActionState::Discrete(_) => ControlType::Discrete,
            ActionState::Continuous(_) => ControlType::Continuous,
            ActionState::Axis(_) => ControlType::Axis,
            ActionState::Vector2(_) => ControlType::Vector2,
            ActionState::Vector3(_) => ControlType::Vector3,
        }
    }

    pub fn update<'b>(
        &mut self,
        ctx: &EvalContext<'_>,
        bindings: impl IntoIterator<Item = &'b Binding>,
        processors: &[Processor],
    ) {
        match self {
            ActionState::Discrete(state) => state.update(ctx, bindings, processors),
            ActionState::Continuous(state) => state.update(ctx, bindings, processors),
            ActionState::Axis(state) => state.update(ctx, bindings, processors),
            ActionState::Vector2(state) => state.update(ctx, bindings, processors),
            ActionState::Vector3(state) => state.update(ctx, bindings, processors),
        }
    }

    pub fn value(&self) -> ActionValue {
        match self {
            ActionState::Discrete(state) => ActionValue::Discrete(state.value()),
            ActionState::Continuous(state) => ActionValue::Continuous(state.value()),
            ActionState::Axis(state) => ActionValue::Axis(state.value()),
            ActionState::Vector2(state) => ActionValue::Vector2(state.value()),
            ActionState::Vector3(state) => ActionValue::Vector3(state.value()),
        }
    }

    /// Value before the last update
    pub fn previous(&self) -> ActionValue {
        match self {
            ActionState::Discrete(state) => ActionValue::Discrete(state.previous()),
            ActionState::Continuous(state) => ActionValue::Continuous(state.previous()),
            ActionState::Axis(state) => ActionValue::Axis(state.previous()),
            ActionState::Vector2(state) => ActionValue::Vector2(state.previous()),
            ActionState::Vector3(state) => ActionValue::Vector3(state.previous()),
        }
    }
}
