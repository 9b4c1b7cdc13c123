//! Per-frame simulation tick
//!
//! Variable timestep: the frame delta is clamped and fed straight to physics
//! and the claw. There is no fixed-step accumulator.

use super::claw;
use super::input::InputState;
use super::physics::Physics;
use super::spawner;
use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Create a fresh session with the bin filled
pub fn new_session(seed: u64, now: f64, physics: &mut impl Physics) -> GameState {
    let mut state = GameState::new(seed, now);
    spawner::spawn_initial(&mut state, physics, INITIAL_TOY_COUNT);
    physics.set_claw(state.claw.position());
    log::info!("New session (seed {})", seed);
    state
}

/// Clamp a raw frame delta into something safe to integrate
pub fn clamp_frame_dt(raw: f32) -> f32 {
    if raw.is_finite() {
        raw.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// Advance the game by one display frame
pub fn tick(state: &mut GameState, physics: &mut impl Physics, input: &mut InputState, dt: f32) {
    if input.consume_pause_toggle() {
        state.paused = !state.paused;
        state.events.push(if state.paused {
            GameEvent::Paused
        } else {
            GameEvent::Resumed
        });
        log::info!("{}", if state.paused { "Paused" } else { "Resumed" });
    }

    if state.paused {
        // Discrete actions don't queue up behind a pause
        input.consume_grab_request();
        input.take_nudge();
        return;
    }

    let dt = clamp_frame_dt(dt);
    state.time += dt as f64;

    physics.step(dt);
    claw::update(state, physics, input, dt);
    physics.set_claw(state.claw.position());
    sync_poses(state, physics);
}

/// Copy simulated poses into toy render transforms. Toys without a body
/// (the one in the claw) keep whatever the claw set.
pub fn sync_poses(state: &mut GameState, physics: &impl Physics) {
    for toy in &mut state.toys {
        let Some(body) = toy.body else {
            continue;
        };
        if let Some((pos, rot)) = physics.pose(body) {
            toy.pos = pos;
            toy.rot = rot;
        }
    }
}
