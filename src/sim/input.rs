//! Player input collected between ticks
//!
//! Browser callbacks write into `InputState`; the tick reads it once per frame.
//! Directions use "held" semantics, everything else is edge-triggered and is
//! cleared when consumed.

use glam::Vec2;

use crate::consts::NUDGE_STEP;

/// One of the four claw directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit vector on the (x, z) plane. "Up" moves away from the player.
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
        }
    }

    fn slot(self) -> usize {
        self as usize
    }

    /// Map a `KeyboardEvent.code` to a direction
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Direction::Left),
            "ArrowRight" | "KeyD" => Some(Direction::Right),
            "ArrowUp" | "KeyW" => Some(Direction::Up),
            "ArrowDown" | "KeyS" => Some(Direction::Down),
            _ => None,
        }
    }
}

/// Accumulated input state
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: [bool; 4],
    grab_requested: bool,
    pause_requested: bool,
    nudge: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a direction being pressed or released
    pub fn set_direction(&mut self, direction: Direction, held: bool) {
        self.held[direction.slot()] = held;
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        self.held[direction.slot()]
    }

    /// Release every direction (focus lost, key-ups will never arrive)
    pub fn release_all(&mut self) {
        self.held = [false; 4];
    }

    /// Displacement for this tick: held unit vectors summed and scaled
    pub fn planar_delta(&self, speed: f32) -> Vec2 {
        Direction::ALL
            .iter()
            .filter(|d| self.is_held(**d))
            .map(|d| d.unit())
            .sum::<Vec2>()
            * speed
    }

    /// Discrete grab action (key press or button click)
    pub fn request_grab(&mut self) {
        self.grab_requested = true;
    }

    /// Take the pending grab request, clearing it
    pub fn consume_grab_request(&mut self) -> bool {
        std::mem::take(&mut self.grab_requested)
    }

    /// Queue a single step from an on-screen direction button
    pub fn nudge(&mut self, direction: Direction) {
        self.nudge += direction.unit() * NUDGE_STEP;
    }

    /// Take the queued button steps, clearing them
    pub fn take_nudge(&mut self) -> Vec2 {
        std::mem::take(&mut self.nudge)
    }

    pub fn request_pause_toggle(&mut self) {
        self.pause_requested = true;
    }

    pub fn consume_pause_toggle(&mut self) -> bool {
        std::mem::take(&mut self.pause_requested)
    }
}
