//! Line-based host for the binary
//!
//! Stands in for a window system: every stdin line is one host event, parsed
//! by [`parse_line`] and pushed into the matching event target.
//!
//! ```text
//! down KeyW | repeat KeyW | up KeyW | blur
//! move <dx> <dy> | click | release | leave
//! touch <id> <down|move|up> [pressure]
//! pad <control> <value>
//! tilt <x> <y> <z>
//! ```

use glam::{Vec2, Vec3};
use thiserror::Error;
use tracing::trace;

use crate::device::{
    EventTarget, GamepadEvent, GamepadPhase, KeyboardEvent, KeyboardInput, MotionEvent,
    PointerEvent, PointerPhase,
};

/// Pointer id the console uses for its mouse
const MOUSE_ID: u32 = 1;

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Keyboard(KeyboardInput),
    Pointer(PointerEvent),
    Gamepad(GamepadEvent),
    Motion(MotionEvent),
}

/// Event targets the console feeds, one per device type
#[derive(Debug, Clone, Default)]
pub struct HostTargets {
    pub keyboard: EventTarget<KeyboardInput>,
    pub pointer: EventTarget<PointerEvent>,
    pub gamepad: EventTarget<GamepadEvent>,
    pub motion: EventTarget<MotionEvent>,
}

impl HostTargets {
    pub fn deliver(&self, event: &HostEvent) {
        trace!("Delivering {:?}", event);
        match event {
            HostEvent::Keyboard(input) => self.keyboard.dispatch(input),
            HostEvent::Pointer(pointer) => self.pointer.dispatch(pointer),
            HostEvent::Gamepad(gamepad) => self.gamepad.dispatch(gamepad),
            HostEvent::Motion(motion) => self.motion.dispatch(motion),
        }
    }
}

fn number<T: std::str::FromStr>(
    arg: Option<&str>,
    name: &'static str,
) -> Result<T, CommandError> {
    let raw = arg.ok_or(CommandError::MissingArgument(name))?;
    raw.parse()
        .map_err(|_| CommandError::InvalidArgument(format!("{name} = {raw}")))
}

/// Parses one console line; blank lines and `#` comments yield `None`
pub fn parse_line(line: &str) -> Result<Option<HostEvent>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    if command.starts_with('#') {
        return Ok(None);
    }

    let event = match command {
        "down" | "repeat" | "up" => {
            let code = words.next().ok_or(CommandError::MissingArgument("key"))?;
            let mut event = if command == "up" {
                KeyboardEvent::up(code)
            } else {
                KeyboardEvent::down(code)
            };
            event.repeat = command == "repeat";
            HostEvent::Keyboard(event.into())
        }
        "blur" => HostEvent::Keyboard(KeyboardInput::FocusLost),
        "move" => {
            let dx = number(words.next(), "dx")?;
            let dy = number(words.next(), "dy")?;
            HostEvent::Pointer(
                PointerEvent::new(MOUSE_ID, "mouse", PointerPhase::Move)
                    .with_movement(Vec2::new(dx, dy)),
            )
        }
        "click" => HostEvent::Pointer(
            PointerEvent::new(MOUSE_ID, "mouse", PointerPhase::Down)
                .with_buttons(1)
                .with_pressure(0.5),
        ),
        "release" => HostEvent::Pointer(PointerEvent::new(MOUSE_ID, "mouse", PointerPhase::Up)),
        "leave" => HostEvent::Pointer(PointerEvent::new(MOUSE_ID, "mouse", PointerPhase::Leave)),
        "touch" => {
            let id = number(words.next(), "id")?;
            let phase = match words.next() {
                Some("down") => PointerPhase::Down,
                Some("move") => PointerPhase::Move,
                Some("up") => PointerPhase::Up,
                Some(other) => {
                    return Err(CommandError::InvalidArgument(format!("phase = {other}")));
                }
                None => return Err(CommandError::MissingArgument("phase")),
            };
            let pressure = match words.next() {
                Some(raw) => number(Some(raw), "pressure")?,
                None => 1.0,
            };
            let buttons = u32::from(phase != PointerPhase::Up);
            HostEvent::Pointer(
                PointerEvent::new(id, "touch", phase)
                    .with_buttons(buttons)
                    .with_pressure(pressure),
            )
        }
        "pad" => {
            let control = words.next().ok_or(CommandError::MissingArgument("control"))?;
            let value: f32 = number(words.next(), "value")?;
            HostEvent::Gamepad(GamepadEvent::new(control, value, GamepadPhase::Changed))
        }
        "tilt" => {
            let x = number(words.next(), "x")?;
            let y = number(words.next(), "y")?;
            let z = number(words.next(), "z")?;
            HostEvent::Motion(MotionEvent::new(Vec3::new(x, y, z), Vec3::ZERO))
        }
        other => return Err(CommandError::UnknownCommand(other.to_string())),
    };
    Ok(Some(event))
}
