//! Pointer capture (mouse and touch)
//!
//! The mouse is stored under [`MOUSE_KEY`] while it is over the capture
//! surface. Touch contacts are multiplexed into stable slot keys
//! (`Touch0`, `Touch1`, ...): a new contact takes the lowest free slot and
//! keeps it until it is released, so concurrent touches always land in the
//! same small key space regardless of the host's pointer ids.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::capture::{CaptureState, EventMap, EventTarget};
use super::{Device, DeviceType, PointerEvent, PointerPhase, RawEvent};
use crate::config::PointerSettings;
use crate::error::{InputError, Result};

pub const MOUSE_KEY: &str = "Mouse";

/// Key of a touch slot, e.g. `Touch0`
pub fn touch_key(slot: usize) -> String {
    format!("Touch{slot}")
}

/// Pointer subtypes the device knows how to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

impl PointerKind {
    /// Classifies the host's pointer type string.
    ///
    /// Anything other than `mouse`/`touch` (pens included) is rejected.
    pub fn classify(pointer_type: &str) -> Result<Self> {
        match pointer_type {
            "mouse" => Ok(PointerKind::Mouse),
            "touch" => Ok(PointerKind::Touch),
            other => Err(InputError::UnsupportedInputKind(other.to_string())),
        }
    }
}

/// Touch id to slot assignment; index = slot
#[derive(Debug, Default)]
struct TouchSlots {
    slots: Vec<Option<u32>>,
    max: usize,
}

impl TouchSlots {
    fn new(max: usize) -> Self {
        Self {
            slots: Vec::new(),
            max,
        }
    }

    fn slot_of(&self, pointer_id: u32) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Some(pointer_id))
    }

    /// Existing slot of `pointer_id`, or the lowest free one
    fn acquire(&mut self, pointer_id: u32) -> Option<usize> {
        if let Some(slot) = self.slot_of(pointer_id) {
            return Some(slot);
        }
        if let Some(free) = self.slots.iter().position(Option::is_none) {
            self.slots[free] = Some(pointer_id);
            return Some(free);
        }
        if self.slots.len() < self.max {
            self.slots.push(Some(pointer_id));
            return Some(self.slots.len() - 1);
        }
        None
    }

    fn release(&mut self, pointer_id: u32) -> Option<usize> {
        let slot = self.slot_of(pointer_id)?;
        self.slots[slot] = None;
        Some(slot)
    }

    fn clear(&mut self) {
        self.slots.clear();
    }
}

#[derive(Debug)]
pub struct PointerDevice {
    target: EventTarget<PointerEvent>,
    capture: CaptureState,
    slots: Arc<Mutex<TouchSlots>>,
}

impl PointerDevice {
    pub fn new(target: EventTarget<PointerEvent>) -> Self {
        Self::with_settings(target, PointerSettings::default())
    }

    pub fn with_settings(target: EventTarget<PointerEvent>, settings: PointerSettings) -> Self {
        Self {
            target,
            capture: CaptureState::default(),
            slots: Arc::new(Mutex::new(TouchSlots::new(settings.max_touch_slots))),
        }
    }

    /// Slot currently held by a touch contact
    pub fn touch_slot(&self, pointer_id: u32) -> Option<usize> {
        self.slots.lock().slot_of(pointer_id)
    }
}

fn capture_mouse(events: &mut EventMap, event: &PointerEvent) {
    match event.phase {
        PointerPhase::Down | PointerPhase::Move | PointerPhase::Up => {
            events.insert(MOUSE_KEY.to_string(), RawEvent::Pointer(event.clone()));
        }
        PointerPhase::Cancel | PointerPhase::Leave => {
            events.remove(MOUSE_KEY);
        }
    }
}

fn capture_touch(events: &mut EventMap, slots: &mut TouchSlots, event: &PointerEvent) {
    match event.phase {
        PointerPhase::Down => match slots.acquire(event.pointer_id) {
            Some(slot) => {
                debug!("Touch {} -> slot {}", event.pointer_id, slot);
                events.insert(touch_key(slot), RawEvent::Pointer(event.clone()));
            }
            None => warn!(
                "No free touch slot for pointer {} ({} in use)",
                event.pointer_id, slots.max
            ),
        },
        PointerPhase::Move => {
            if let Some(slot) = slots.slot_of(event.pointer_id) {
                events.insert(touch_key(slot), RawEvent::Pointer(event.clone()));
            }
        }
        PointerPhase::Up | PointerPhase::Cancel | PointerPhase::Leave => {
            if let Some(slot) = slots.release(event.pointer_id) {
                debug!("Touch {} released slot {}", event.pointer_id, slot);
                events.remove(&touch_key(slot));
            }
        }
    }
}

impl Device for PointerDevice {
    fn device_type(&self) -> DeviceType {
        DeviceType::Pointer
    }

    fn connect(&mut self) {
        let token = self.capture.begin();
        self.slots.lock().clear();
        let writer = self.capture.writer(&token);
        let slots = Arc::clone(&self.slots);

        self.target.listen(&token, move |event| {
            let kind = match PointerKind::classify(&event.pointer_type) {
                Ok(kind) => kind,
                Err(e) => {
                    warn!("Dropping pointer event {}: {}", event.pointer_id, e);
                    return;
                }
            };
            writer.update(|events| match kind {
                PointerKind::Mouse => capture_mouse(events, event),
                PointerKind::Touch => capture_touch(events, &mut slots.lock(), event),
            });
        });
        info!("Pointer connected");
    }

    fn disconnect(&mut self) {
        if self.capture.end() {
            self.slots.lock().clear();
            info!("Pointer disconnected");
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
