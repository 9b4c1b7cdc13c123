//! Game state and core simulation types
//!
//! `GameState` is owned by the frame driver and passed by `&mut` into every
//! simulation call. Physics lives beside it (see `Physics`), not inside it.

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::claw::ClawController;
use super::physics::BodyId;
use super::score::ScoreBoard;
use crate::catalog::ToyKind;

/// A toy in the bin
#[derive(Debug, Clone)]
pub struct Toy {
    pub id: u32,
    pub kind: ToyKind,
    /// Render transform
    pub pos: Vec3,
    pub rot: Quat,
    /// Physics body; `None` once the claw has picked the toy up
    pub body: Option<BodyId>,
}

impl Toy {
    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }
}

/// Notifications produced during a tick, drained by the frame driver
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Claw started descending
    GrabStarted,
    /// Claw closed on a toy
    Grabbed { toy_id: u32, kind: ToyKind },
    /// Claw closed on nothing
    Missed,
    /// Claw is back at the top, empty, and accepting input again
    ClawReady,
    /// A toy went down the chute at `pos`
    Deposited { kind: ToyKind, points: u64, pos: Vec3 },
    /// Fresh toys were dropped into the bin
    Replenished { count: usize },
    Paused,
    Resumed,
}

impl GameEvent {
    /// Text for the status line, if this event changes it
    pub fn status_text(&self) -> Option<String> {
        match self {
            GameEvent::GrabStarted => Some("Grabbing...".to_string()),
            GameEvent::Grabbed { kind, .. } => Some(format!("Got the {}!", kind.display_name())),
            GameEvent::Missed => Some("Missed...".to_string()),
            GameEvent::ClawReady => Some(IDLE_STATUS.to_string()),
            GameEvent::Deposited { .. } => Some("Congratulations! Keep playing".to_string()),
            GameEvent::Replenished { .. } => None,
            GameEvent::Paused => Some("Paused".to_string()),
            GameEvent::Resumed => Some(IDLE_STATUS.to_string()),
        }
    }
}

/// Status line shown while the claw is waiting for the player
pub const IDLE_STATUS: &str = "Use the arrow keys to move the claw";

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the spawner RNG was created from
    pub seed: u64,
    rng: Pcg32,
    /// Simulation clock (seconds); frozen while paused
    pub time: f64,
    pub paused: bool,
    pub claw: ClawController,
    /// Live toys in insertion order
    pub toys: Vec<Toy>,
    pub scoreboard: ScoreBoard,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create an empty bin. `now` is the wall-clock session start (seconds).
    pub fn new(seed: u64, now: f64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            paused: false,
            claw: ClawController::new(),
            toys: Vec::new(),
            scoreboard: ScoreBoard::new(now),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn toy(&self, id: u32) -> Option<&Toy> {
        self.toys.iter().find(|t| t.id == id)
    }

    pub fn toy_mut(&mut self, id: u32) -> Option<&mut Toy> {
        self.toys.iter_mut().find(|t| t.id == id)
    }

    /// Remove a toy from the field, preserving the order of the rest
    pub fn take_toy(&mut self, id: u32) -> Option<Toy> {
        let index = self.toys.iter().position(|t| t.id == id)?;
        Some(self.toys.remove(index))
    }

    pub fn toy_count(&self) -> usize {
        self.toys.len()
    }

    pub fn score(&self) -> u64 {
        self.scoreboard.score()
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }
}
