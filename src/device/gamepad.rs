use tracing::{debug, info};

use super::capture::{CaptureState, EventMap, EventTarget};
use super::{Device, DeviceType, GamepadEvent, GamepadPhase, RawEvent};

/// Gamepad capture surface.
///
/// Keys are control names (`"South"`, `"LeftStickX"`, ...). A button is
/// present while held; an axis while it reports a non-zero value. Events come
/// from whatever feeds the target: the gilrs collector (feature `gamepad`)
/// or the embedding application.
#[derive(Debug)]
pub struct GamepadDevice {
    target: EventTarget<GamepadEvent>,
    capture: CaptureState,
}

impl GamepadDevice {
    pub fn new(target: EventTarget<GamepadEvent>) -> Self {
        Self {
            target,
            capture: CaptureState::default(),
        }
    }
}

impl Device for GamepadDevice {
    fn device_type(&self) -> DeviceType {
        DeviceType::Gamepad
    }

    fn connect(&mut self) {
        let token = self.capture.begin();
        let writer = self.capture.writer(&token);

        self.target.listen(&token, move |event| {
            writer.update(|events| match event.phase {
                GamepadPhase::Pressed => {
                    debug!("Gamepad {} pressed", event.control);
                    events.insert(event.control.clone(), RawEvent::Gamepad(event.clone()));
                }
                GamepadPhase::Changed if event.value != 0.0 => {
                    events.insert(event.control.clone(), RawEvent::Gamepad(event.clone()));
                }
                GamepadPhase::Changed | GamepadPhase::Released => {
                    events.remove(&event.control);
                }
            })
        });
        info!("Gamepad connected");
    }

    fn disconnect(&mut self) {
        if self.capture.end() {
            info!("Gamepad disconnected");
        }
    }

    fn is_connected(&self) -> bool {
        self.capture.is_active()
    }

    fn event(&self, key: &str) -> Option<RawEvent> {
        self.capture.get(key)
    }

    fn has_event(&self, key: &str) -> bool {
        self.capture.contains(key)
    }

    fn snapshot(&self) -> EventMap {
        self.capture.snapshot()
    }
}
