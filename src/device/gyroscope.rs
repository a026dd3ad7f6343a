use tracing::{info, trace};

use super::capture::{CaptureState, EventMap, EventTarget};
use super::{Device, DeviceType, MotionEvent, RawEvent};

pub const MOTION_KEY: &str = "Motion";

/// Motion sensor capture surface; keeps the latest sample under [`MOTION_KEY`]
#[derive(Debug)]
pub struct GyroscopeDevice {
    target: EventTarget<MotionEvent>,
    capture: CaptureState,
}

impl GyroscopeDevice {
    pub fn new(target: EventTarget<MotionEvent>) -> Self {
        Self {
            target,
            capture: CaptureState::default(),
        }
    }
}

impl Device for GyroscopeDevice {
    fn device_type(&self) -> DeviceType {
        DeviceType::Gyroscope
    }

    fn connect(&mut self) {
        let token = self.capture.begin();
        let writer = self.capture.writer(&token);

        self.target.listen(&token, move |event| {
            trace!("Motion sample: {:?}", event.rotation_rate);
            writer.update(|events| {
                events.insert(MOTION_KEY.to_string(), RawEvent::Motion(event.clone()));
            })
        });
        info!("Gyroscope connected");
    }

    fn disconnect(&mut self) {
        if self.capture.end() {
            info!("Gyroscope disconnected");
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
