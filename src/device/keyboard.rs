use tracing::{debug, info};

use super::capture::{CaptureState, EventMap, EventTarget};
use super::{Device, DeviceType, KeyAction, KeyboardInput, RawEvent};
use crate::config::KeyboardSettings;

/// Keyboard capture surface.
///
/// A key is present (and thus "pressed") from its `Down` event until the
/// matching `Up` or until the host reports that focus was lost.
#[derive(Debug)]
pub struct KeyboardDevice {
    target: EventTarget<KeyboardInput>,
    settings: KeyboardSettings,
    capture: CaptureState,
}

impl KeyboardDevice {
    pub fn new(target: EventTarget<KeyboardInput>) -> Self {
        Self::with_settings(target, KeyboardSettings::default())
    }

    pub fn with_settings(target: EventTarget<KeyboardInput>, settings: KeyboardSettings) -> Self {
        Self {
            target,
            settings,
            capture: CaptureState::default(),
        }
    }

    /// Number of keys currently held
    pub fn held_keys(&self) -> usize {
        self.capture.len()
    }
}

impl Device for KeyboardDevice {
    fn device_type(&self) -> DeviceType {
        DeviceType::Keyboard
    }

    fn connect(&mut self) {
        let token = self.capture.begin();
        let writer = self.capture.writer(&token);
        let ignore_repeat = self.settings.ignore_repeat;

        self.target.listen(&token, move |input| match input {
            KeyboardInput::Key(event) => writer.update(|events| match event.action {
                KeyAction::Down => {
                    if event.repeat && ignore_repeat && events.contains_key(&event.code) {
                        return;
                    }
                    debug!("Key down: {}", event.code);
                    events.insert(event.code.clone(), RawEvent::Keyboard(event.clone()));
                }
                KeyAction::Up => {
                    debug!("Key up: {}", event.code);
                    events.remove(&event.code);
                }
            }),
            KeyboardInput::FocusLost => writer.update(|events| {
                debug!("Focus lost, releasing {} key(s)", events.len());
                events.clear();
            }),
        });
        info!("Keyboard connected");
    }

    fn disconnect(&mut self) {
        if self.capture.end() {
            info!("Keyboard disconnected");
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
