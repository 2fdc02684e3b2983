//! Post-fling "free spin" deceleration.
//!
//! The spin is a pending deadline rather than a timer thread: the host asks
//! [`FreeSpin::next_tick_at`] when to call back, and cancelling simply drops
//! the deadline.

use std::time::{Duration, Instant};

/// Velocity multiplier applied per tick once the free spin is over.
pub const FRICTION: f32 = 0.7;
/// How long a fling keeps its initial velocity.
pub const FREE_SPIN: Duration = Duration::from_millis(180);
/// Fastest allowed scroll, in pixels per tick.
pub const MAX_DELTA: i32 = 60;
pub const TICK_INTERVAL: Duration = Duration::from_millis(30);
/// Below this velocity the spin slows linearly.
const LINEAR_THRESHOLD: i32 = 10;
const LINEAR_STEP: i32 = 2;

/// Divisor turning a fling velocity (px/s) into a per-tick delta.
pub const VELOCITY_DIVISOR: f32 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FreeSpin {
    /// +1 scrolls toward earlier hours, -1 toward later ones.
    sign: i32,
    abs_delta: i32,
    float_delta: f32,
    free_spin_until: Instant,
    next_tick_at: Option<Instant>,
}

impl FreeSpin {
    /// Seed a spin from a per-tick delta. The first tick is due immediately.
    pub fn start(delta: i32, now: Instant) -> Self {
        let abs_delta = delta.saturating_abs().min(MAX_DELTA);
        Self {
            sign: delta.signum(),
            abs_delta,
            float_delta: abs_delta as f32,
            free_spin_until: now + FREE_SPIN,
            next_tick_at: if abs_delta > 0 { Some(now) } else { None },
        }
    }

    /// Seed a spin from a vertical fling velocity in pixels per second.
    pub fn from_velocity(velocity_y: f32, now: Instant) -> Self {
        let delta = if velocity_y.is_finite() {
            (velocity_y / VELOCITY_DIVISOR) as i32
        } else {
            0
        };
        Self::start(delta, now)
    }

    pub fn velocity(&self) -> i32 {
        self.abs_delta
    }

    pub fn is_running(&self) -> bool {
        self.next_tick_at.is_some()
    }

    pub fn next_tick_at(&self) -> Option<Instant> {
        self.next_tick_at
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_tick_at.is_some_and(|at| now >= at)
    }

    pub fn cancel(&mut self) {
        self.next_tick_at = None;
    }

    /// Advance one tick and return the signed change to apply to the
    /// viewport's scroll offset.
    pub fn step(&mut self, now: Instant) -> i32 {
        if now > self.free_spin_until {
            if self.abs_delta <= LINEAR_THRESHOLD {
                self.abs_delta -= LINEAR_STEP;
            } else {
                self.float_delta *= FRICTION;
                self.abs_delta = self.float_delta as i32;
            }
            self.abs_delta = self.abs_delta.max(0);
        }

        if self.sign > 0 {
            -self.abs_delta
        } else {
            self.abs_delta
        }
    }

    /// Stop dead, e.g. after running into the end of the content.
    pub fn halt(&mut self) {
        self.abs_delta = 0;
    }

    /// Book the next tick if there is velocity left. Returns whether the
    /// spin is still running.
    pub fn reschedule(&mut self, now: Instant) -> bool {
        self.next_tick_at = if self.abs_delta > 0 {
            Some(now + TICK_INTERVAL)
        } else {
            None
        };
        self.next_tick_at.is_some()
    }
}
