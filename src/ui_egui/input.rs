//! Translation of egui keyboard and pointer input into grid input events.

use std::time::Instant;

use egui::{Pos2, Response, Vec2};

use crate::services::selection::{InputEvent, Key, Point};

/// Release speed, in points per second, above which a drag becomes a fling.
pub const MIN_FLING_VELOCITY: f32 = 400.0;

pub fn map_key(key: egui::Key) -> Option<Key> {
    match key {
        egui::Key::ArrowUp => Some(Key::Up),
        egui::Key::ArrowDown => Some(Key::Down),
        egui::Key::ArrowLeft => Some(Key::Left),
        egui::Key::ArrowRight => Some(Key::Right),
        egui::Key::Space => Some(Key::Center),
        egui::Key::Enter => Some(Key::Enter),
        egui::Key::Delete | egui::Key::Backspace => Some(Key::Delete),
        _ => None,
    }
}

/// Keeps the state needed to turn egui's per-frame input into gestures.
#[derive(Debug, Default)]
pub struct InputTranslator {
    center_down_at: Option<Instant>,
    drag_origin: Option<Point>,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one key event. Auto-repeat of the center key is dropped so
    /// that holding it measures a single press.
    pub fn key(&mut self, key: egui::Key, pressed: bool, repeat: bool, now: Instant) -> Option<InputEvent> {
        let key = map_key(key)?;
        if key == Key::Center {
            if pressed {
                if repeat || self.center_down_at.is_some() {
                    return None;
                }
                self.center_down_at = Some(now);
                return Some(InputEvent::KeyDown(key));
            }
            let held = now.saturating_duration_since(self.center_down_at.take()?);
            return Some(InputEvent::KeyUp { key, held });
        }
        pressed.then_some(InputEvent::KeyDown(key))
    }

    /// Translate the grid's pointer response for this frame. `origin` is the
    /// top-left corner of the grid and `velocity` the pointer velocity.
    pub fn pointer(&mut self, response: &Response, origin: Pos2, velocity: Vec2) -> Vec<InputEvent> {
        let local = |pos: Pos2| Point::new(pos.x - origin.x, pos.y - origin.y);
        let position = response.interact_pointer_pos().map(local);
        let mut events = Vec::new();

        if response.secondary_clicked() || response.long_touched() {
            if let Some(point) = position {
                events.push(InputEvent::LongPress(point));
            }
            return events;
        }

        if response.clicked() {
            if let Some(point) = position {
                events.push(InputEvent::TouchDown(point));
                events.push(InputEvent::SingleTapUp(point));
                events.push(InputEvent::TouchUp);
            }
            return events;
        }

        if response.drag_started() {
            if let Some(point) = position {
                self.drag_origin = Some(point);
                events.push(InputEvent::TouchDown(point));
            }
        }

        if let (Some(start), Some(current)) = (self.drag_origin, position) {
            if response.dragged() && current != start {
                events.push(InputEvent::Scroll { start, current });
            }
        }

        if response.drag_stopped() {
            if let Some(start) = self.drag_origin.take() {
                let end = position.unwrap_or(start);
                if velocity.length() >= MIN_FLING_VELOCITY {
                    events.push(InputEvent::Fling {
                        start,
                        end,
                        velocity_x: velocity.x,
                        velocity_y: velocity.y,
                    });
                }
                events.push(InputEvent::TouchUp);
            }
        }
        events
    }
}
