//! Hardware gamepad capture through gilrs
//!
//! The collector polls gilrs on a blocking tokio task and dispatches every
//! button/axis change of the active gamepad into the gamepad event target,
//! until its cancellation token fires.

use chrono::Local;
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use statum::{machine, state};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{EventTarget, GamepadEvent, GamepadPhase};
use crate::config::GamepadSettings;
use crate::processor::apply_deadzone;

#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Failed to initialize collector: {0}")]
    InitializationError(String),

    #[error("Collector task failed: {0}")]
    TaskError(String),
}

#[state]
#[derive(Debug, Clone)]
pub enum CollectionState {
    Initializing,
    Collecting,
}

#[machine]
#[derive(Debug)]
pub struct GamepadCollector<S: CollectionState> {
    gilrs: Gilrs,

    active_gamepad: Option<GamepadId>,

    settings: GamepadSettings,

    target: EventTarget<GamepadEvent>,
}

impl<S: CollectionState> GamepadCollector<S> {
    pub fn settings(&self) -> &GamepadSettings {
        &self.settings
    }
}

impl GamepadCollector<Initializing> {
    pub fn create(
        settings: GamepadSettings,
        target: EventTarget<GamepadEvent>,
    ) -> Result<Self, CollectorError> {
        info!("Initializing gilrs gamepad interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => g,
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(CollectorError::InitializationError(e.to_string()));
            }
        };

        Ok(Self::new(gilrs, None, settings, target))
    }

    /// Picks the first connected gamepad and starts collecting
    pub fn initialize(mut self) -> GamepadCollector<Collecting> {
        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = self.gilrs.gamepads().collect();

        if gamepads.is_empty() {
            warn!("No gamepad connected, collecting from the first one that appears");
        } else {
            for (idx, (id, gamepad)) in gamepads.iter().enumerate() {
                info!("  [{}] ID: {}, Name: {}", idx, id, gamepad.name());
            }
            let (id, gamepad) = &gamepads[0];
            self.active_gamepad = Some(*id);
            info!("Selected gamepad: {} ({})", gamepad.name(), id);
        }

        self.transition()
    }
}

impl GamepadCollector<Collecting> {
    /// Drains pending gilrs events into the target
    pub fn collect_pending(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match self.active_gamepad {
                Some(active_id) if id != active_id => {
                    debug!("Skipping event from non-active gamepad: {:?}", id);
                    continue;
                }
                None => {
                    info!("Adopting gamepad {} as active", id);
                    self.active_gamepad = Some(id);
                }
                _ => {}
            }

            if let Some(converted) = self.convert(event) {
                self.target.dispatch(&converted);
            }
        }
    }

    pub fn run(&mut self, token: &CancellationToken) {
        info!("Starting gamepad collection loop");
        while !token.is_cancelled() {
            self.collect_pending();
            // keeps the blocking thread from spinning at 100% CPU
            std::thread::sleep(std::time::Duration::from_micros(500));
        }
        info!("Gamepad collection loop stopped");
    }

    fn convert(&self, event: EventType) -> Option<GamepadEvent> {
        let timestamp = Local::now();
        let (control, value, phase) = match event {
            EventType::AxisChanged(axis, value, _) => {
                let name = axis_name(axis)?;
                let value = apply_deadzone(value, self.settings.deadzone);
                (name, value, GamepadPhase::Changed)
            }
            EventType::ButtonChanged(button, value, _) => {
                (button_name(button)?, value, GamepadPhase::Changed)
            }
            EventType::ButtonPressed(button, _) => {
                (button_name(button)?, 1.0, GamepadPhase::Pressed)
            }
            EventType::ButtonReleased(button, _) => {
                (button_name(button)?, 0.0, GamepadPhase::Released)
            }
            EventType::Disconnected => {
                warn!("Active gamepad disconnected");
                return None;
            }
            _ => return None,
        };

        Some(GamepadEvent {
            control: control.to_string(),
            value,
            phase,
            timestamp,
        })
    }
}

/// Spawns a collector on a blocking task; stops when `token` is cancelled
pub fn spawn(
    settings: GamepadSettings,
    target: EventTarget<GamepadEvent>,
    token: CancellationToken,
) -> JoinHandle<Result<(), CollectorError>> {
    info!("Spawning gamepad collector with settings: {:?}", settings);
    tokio::task::spawn_blocking(move || -> Result<(), CollectorError> {
        let mut collector = GamepadCollector::create(settings, target)?.initialize();
        collector.run(&token);
        Ok(())
    })
}

fn button_name(button: Button) -> Option<&'static str> {
    let name = match button {
        Button::South => "South",
        Button::East => "East",
        Button::North => "North",
        Button::West => "West",
        Button::LeftTrigger => "LeftBumper",
        Button::RightTrigger => "RightBumper",
        Button::LeftTrigger2 => "LeftTrigger",
        Button::RightTrigger2 => "RightTrigger",
        Button::Select => "Select",
        Button::Start => "Start",
        Button::Mode => "Guide",
        Button::LeftThumb => "LeftStick",
        Button::RightThumb => "RightStick",
        Button::DPadUp => "DPadUp",
        Button::DPadDown => "DPadDown",
        Button::DPadLeft => "DPadLeft",
        Button::DPadRight => "DPadRight",
        _ => return None,
    };
    Some(name)
}

fn axis_name(axis: Axis) -> Option<&'static str> {
    let name = match axis {
        Axis::LeftStickX => "LeftStickX",
        Axis::LeftStickY => "LeftStickY",
        Axis::RightStickX => "RightStickX",
        Axis::RightStickY => "RightStickY",
        Axis::LeftZ => "LeftZ",
        Axis::RightZ => "RightZ",
        _ => {
            debug!("Ignoring unsupported axis: {:?}", axis);
            return None;
        }
    };
    Some(name)
}
