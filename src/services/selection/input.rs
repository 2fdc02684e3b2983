//! Toolkit-neutral input events delivered to the calendar view.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// D-pad or trackball press.
    Center,
    Enter,
    Delete,
}

impl Key {
    pub fn is_arrow(self) -> bool {
        matches!(self, Key::Up | Key::Down | Key::Left | Key::Right)
    }
}

/// Position in view pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    /// `held` is the time between key down and key up.
    KeyUp { key: Key, held: Duration },
    TouchDown(Point),
    /// Drag from `start` to `current` within one gesture.
    Scroll { start: Point, current: Point },
    Fling {
        start: Point,
        end: Point,
        velocity_x: f32,
        velocity_y: f32,
    },
    SingleTapUp(Point),
    LongPress(Point),
    TouchUp,
    TouchCancel,
}
