//! Simulation module
//!
//! All gameplay logic lives here:
//! - Claw state machine driven by the sim clock, never by callbacks
//! - Seeded RNG for spawning
//! - Stable iteration order (toys in insertion order)
//! - No rendering or platform dependencies; physics sits behind a trait

pub mod claw;
pub mod input;
pub mod physics;
pub mod score;
pub mod spawner;
pub mod state;
pub mod tick;

pub use claw::{ClawController, ClawState, find_grab_target};
pub use input::{Direction, InputState};
pub use physics::{BodyId, Physics, RapierWorld};
pub use score::{ScoreBoard, format_mm_ss};
pub use spawner::{replenish_if_low, spawn_initial, spawn_toy};
pub use state::{GameEvent, GameState, IDLE_STATUS, Toy};
pub use tick::{clamp_frame_dt, new_session, sync_poses, tick};
