//! Ping-pong chase animation state.
//!
//! Position is kept as an integer count of sub-steps (`STEPS_PER_LED` per
//! LED) so bound checks are exact.

/// Sub-steps per LED. The chase advances one sub-step per tick.
pub const STEPS_PER_LED: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// A chase that fills the strip from index 0 outward and drains back.
#[derive(Debug, Clone)]
pub struct PingPong {
    led_count: u32,
    position: u32,
    direction: Direction,
    active: bool,
}

impl PingPong {
    pub fn new(led_count: usize) -> Self {
        Self {
            led_count: u32::try_from(led_count).unwrap_or(u32::MAX / STEPS_PER_LED),
            position: 0,
            direction: Direction::Forward,
            active: false,
        }
    }

    /// Restart from index 0, moving forward.
    pub fn start(&mut self) {
        self.position = 0;
        self.direction = Direction::Forward;
        self.active = self.led_count > 0;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of LEDs currently lit (truncated position).
    pub fn lit(&self) -> usize {
        (self.position / STEPS_PER_LED) as usize
    }

    /// Advance one sub-step.
    ///
    /// Flips to backward on reaching the far end. On draining back to index 0
    /// while moving backward, resets to forward and deactivates.
    pub fn advance(&mut self) {
        if !self.active {
            return;
        }
        match self.direction {
            Direction::Forward => self.position += 1,
            Direction::Backward => self.position = self.position.saturating_sub(1),
        }
        let idx = self.position / STEPS_PER_LED;
        if idx >= self.led_count {
            self.position = self.led_count * STEPS_PER_LED;
            self.direction = Direction::Backward;
        }
        if idx == 0 && self.direction == Direction::Backward {
            self.direction = Direction::Forward;
            self.position = 0;
            self.active = false;
        }
    }
}
