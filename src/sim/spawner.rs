//! Toy spawning and replenishment

use glam::{Quat, Vec2, Vec3};
use rand::Rng;

use super::physics::Physics;
use super::state::{GameEvent, GameState, Toy};
use crate::catalog::ToyKind;
use crate::consts::*;

/// Add one toy of `kind` at `pos`, backed by a physics sphere. Returns its id.
pub fn spawn_toy(state: &mut GameState, physics: &mut impl Physics, kind: ToyKind, pos: Vec3) -> u32 {
    let id = state.next_entity_id();
    let body = physics.add_sphere(pos, TOY_BODY_RADIUS, TOY_MASS);
    state.toys.push(Toy {
        id,
        kind,
        pos,
        rot: Quat::IDENTITY,
        body: Some(body),
    });
    id
}

/// Uniform random archetype, with replacement
fn random_kind(rng: &mut impl Rng) -> ToyKind {
    ToyKind::ALL[rng.random_range(0..ToyKind::ALL.len())]
}

/// Uniform random point in the play-field footprint
fn random_planar(rng: &mut impl Rng) -> Vec2 {
    let e = PLAY_FIELD_HALF_EXTENT;
    Vec2::new(rng.random_range(-e..e), rng.random_range(-e..e))
}

/// Fill the bin with `n` toys at random positions and heights
pub fn spawn_initial(state: &mut GameState, physics: &mut impl Physics, n: usize) {
    for _ in 0..n {
        let rng = state.rng_mut();
        let kind = random_kind(rng);
        let planar = random_planar(rng);
        let height = rng.random_range(SPAWN_MIN_HEIGHT..SPAWN_MAX_HEIGHT);
        spawn_toy(state, physics, kind, crate::planar_to_world(planar, height));
    }
    log::info!("Spawned {} toys", n);
}

/// Drop `batch` new toys in from above if fewer than `floor` remain.
/// Returns how many toys were added.
pub fn replenish_if_low(
    state: &mut GameState,
    physics: &mut impl Physics,
    floor: usize,
    batch: usize,
) -> usize {
    if state.toy_count() >= floor {
        return 0;
    }
    for _ in 0..batch {
        let rng = state.rng_mut();
        let kind = random_kind(rng);
        let planar = random_planar(rng);
        spawn_toy(
            state,
            physics,
            kind,
            crate::planar_to_world(planar, REPLENISH_DROP_HEIGHT),
        );
    }
    state.events.push(GameEvent::Replenished { count: batch });
    log::info!("Replenished bin with {} toys ({} live)", batch, state.toy_count());
    batch
}
