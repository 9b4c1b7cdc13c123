//! Claw controller: planar movement and the grab state machine
//!
//! ```text
//! Idle -grab-> Descending -1s-> Evaluating -0.5s, test-> Ascending -1s-> Idle
//!                                                            |  (holding)
//!                                                            v
//!                                         Idle <-deposit 1s- Depositing
//! ```
//!
//! Phases are driven by the simulation clock (`GameState::time`): each phase
//! records when it started and progress is recomputed every tick.

use glam::{Vec2, Vec3};

use super::input::InputState;
use super::physics::Physics;
use super::spawner;
use super::state::{GameEvent, GameState, Toy};
use crate::consts::*;
use crate::{clamp_to_field, lerp_clamped, planar_to_world};

/// Claw state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClawState {
    /// At the top, movable, waiting for a grab
    Idle,
    /// Lowering into the bin
    Descending,
    /// At the bottom, about to close
    Evaluating,
    /// Rising back to the top
    Ascending,
    /// At the top holding a toy, about to drop it in the chute
    Depositing,
}

/// Claw position, height and grab phase
#[derive(Debug, Clone)]
pub struct ClawController {
    /// (x, z) over the bin
    pub planar: Vec2,
    pub height: f32,
    state: ClawState,
    /// Sim time the current phase began
    phase_started: f64,
    /// Toy held by the claw
    grabbed: Option<u32>,
}

impl Default for ClawController {
    fn default() -> Self {
        Self::new()
    }
}

impl ClawController {
    pub fn new() -> Self {
        Self {
            planar: Vec2::ZERO,
            height: CLAW_RAISED_HEIGHT,
            state: ClawState::Idle,
            phase_started: 0.0,
            grabbed: None,
        }
    }

    pub fn state(&self) -> ClawState {
        self.state
    }

    pub fn grabbed(&self) -> Option<u32> {
        self.grabbed
    }

    pub fn is_idle(&self) -> bool {
        self.state == ClawState::Idle
    }

    /// Claw tip in world space
    pub fn position(&self) -> Vec3 {
        planar_to_world(self.planar, self.height)
    }

    /// Where a held toy hangs
    pub fn hang_position(&self) -> Vec3 {
        planar_to_world(self.planar, self.height - GRAB_HANG_OFFSET)
    }

    /// Seconds spent in the current phase
    pub fn phase_elapsed(&self, now: f64) -> f32 {
        (now - self.phase_started).max(0.0) as f32
    }

    /// How far the fingers are open, 1 = fully open, 0 = closed
    pub fn openness(&self, now: f64) -> f32 {
        let t = self.phase_elapsed(now);
        match self.state {
            ClawState::Idle | ClawState::Descending => 1.0,
            ClawState::Evaluating => 1.0 - (t / GRIP_DWELL).clamp(0.0, 1.0),
            ClawState::Ascending if self.grabbed.is_some() => 0.0,
            ClawState::Ascending => (t / PHASE_DURATION).clamp(0.0, 1.0),
            ClawState::Depositing => (t / DEPOSIT_DELAY).clamp(0.0, 1.0),
        }
    }

    fn enter(&mut self, state: ClawState, now: f64) {
        log::debug!("Claw {:?} -> {:?} at t={:.2}", self.state, state, now);
        self.state = state;
        self.phase_started = now;
    }

    /// Move on the plane, clamped to the field. Ignored unless idle.
    pub fn try_move(&mut self, delta: Vec2) -> bool {
        if !self.is_idle() || delta == Vec2::ZERO {
            return false;
        }
        self.planar = clamp_to_field(self.planar + delta);
        true
    }

    /// Start a grab cycle. Ignored unless idle.
    pub fn try_begin_grab(&mut self, now: f64) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.enter(ClawState::Descending, now);
        true
    }
}

/// First toy, in insertion order, within grab range of the claw tip.
///
/// When two toys are in range the one spawned earlier wins, even if the other
/// is nearer.
pub fn find_grab_target(claw_pos: Vec3, toys: &[Toy]) -> Option<usize> {
    toys.iter()
        .position(|toy| claw_pos.distance(toy.pos) < GRAB_THRESHOLD)
}

/// Advance the claw by one tick: apply input, progress the current phase and
/// keep a held toy attached to the claw.
pub fn update(state: &mut GameState, physics: &mut impl Physics, input: &mut InputState, dt: f32) {
    let now = state.time;
    let grab_requested = input.consume_grab_request();
    let nudge = input.take_nudge();

    match state.claw.state {
        ClawState::Idle => {
            let delta = input.planar_delta(CLAW_SPEED * dt) + nudge;
            state.claw.try_move(delta);
            if grab_requested && state.claw.try_begin_grab(now) {
                state.events.push(GameEvent::GrabStarted);
            }
        }
        ClawState::Descending => {
            let t = state.claw.phase_elapsed(now) / PHASE_DURATION;
            state.claw.height = lerp_clamped(CLAW_RAISED_HEIGHT, CLAW_LOWERED_HEIGHT, t);
            if t >= 1.0 {
                state.claw.enter(ClawState::Evaluating, now);
            }
        }
        ClawState::Evaluating => {
            if state.claw.phase_elapsed(now) >= GRIP_DWELL {
                resolve_grab(state, physics);
                state.claw.enter(ClawState::Ascending, now);
            }
        }
        ClawState::Ascending => {
            let t = state.claw.phase_elapsed(now) / PHASE_DURATION;
            state.claw.height = lerp_clamped(CLAW_LOWERED_HEIGHT, CLAW_RAISED_HEIGHT, t);
            if t >= 1.0 {
                if state.claw.grabbed.is_some() {
                    state.claw.enter(ClawState::Depositing, now);
                } else {
                    state.claw.enter(ClawState::Idle, now);
                    state.events.push(GameEvent::ClawReady);
                }
            }
        }
        ClawState::Depositing => {
            if state.claw.phase_elapsed(now) >= DEPOSIT_DELAY {
                deposit(state, physics);
                state.claw.enter(ClawState::Idle, now);
            }
        }
    }

    // A held toy follows the claw regardless of physics
    if let Some(id) = state.claw.grabbed {
        let hang = state.claw.hang_position();
        if let Some(toy) = state.toy_mut(id) {
            toy.pos = hang;
        }
    }
}

/// Run the proximity test once and pick up the winning toy, if any
fn resolve_grab(state: &mut GameState, physics: &mut impl Physics) {
    let claw_pos = state.claw.position();
    match find_grab_target(claw_pos, &state.toys) {
        Some(index) => {
            let toy = &mut state.toys[index];
            if let Some(body) = toy.body.take() {
                physics.remove(body);
            }
            let (toy_id, kind) = (toy.id, toy.kind);
            state.claw.grabbed = Some(toy_id);
            state.events.push(GameEvent::Grabbed { toy_id, kind });
            log::debug!("Grabbed {} (id {}) at {:?}", kind.display_name(), toy_id, claw_pos);
        }
        None => {
            state.events.push(GameEvent::Missed);
            log::debug!("Missed at {:?}", claw_pos);
        }
    }
}

/// Drop the held toy down the chute, award points and top up the bin
fn deposit(state: &mut GameState, physics: &mut impl Physics) {
    let Some(id) = state.claw.grabbed.take() else {
        return;
    };
    let Some(mut toy) = state.take_toy(id) else {
        log::warn!("Held toy {} vanished before deposit", id);
        return;
    };

    toy.pos = EXIT_CHUTE;
    if let Some(body) = toy.body.take() {
        physics.remove(body);
    }
    state.scoreboard.add(POINTS_PER_TOY);
    state.events.push(GameEvent::Deposited {
        kind: toy.kind,
        points: POINTS_PER_TOY,
        pos: toy.pos,
    });
    log::info!(
        "Deposited {} (+{}, score {})",
        toy.name(),
        POINTS_PER_TOY,
        state.score()
    );

    spawner::replenish_if_low(state, physics, REPLENISH_FLOOR, REPLENISH_BATCH);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToyKind;
    use crate::sim::input::Direction;
    use crate::sim::physics::testing::FrozenWorld;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    /// Advance time and the claw only (no pose sync), like a tick would
    fn step(state: &mut GameState, physics: &mut FrozenWorld, input: &mut InputState) {
        state.time += DT as f64;
        update(state, physics, input, DT);
    }

    /// Step until the claw reaches `target`, panicking after a generous bound
    fn run_until(
        state: &mut GameState,
        physics: &mut FrozenWorld,
        input: &mut InputState,
        target: ClawState,
    ) {
        for _ in 0..1000 {
            if state.claw.state() == target {
                return;
            }
            step(state, physics, input);
        }
        panic!("claw never reached {:?}, stuck in {:?}", target, state.claw.state());
    }

    fn place_toy(state: &mut GameState, physics: &mut FrozenWorld, kind: ToyKind, pos: Vec3) -> u32 {
        spawner::spawn_toy(state, physics, kind, pos)
    }

    fn start_grab(state: &mut GameState, physics: &mut FrozenWorld, input: &mut InputState) {
        input.request_grab();
        step(state, physics, input);
        assert_eq!(state.claw.state(), ClawState::Descending);
    }

    #[test]
    fn test_idle_moves_and_clamps() {
        let mut state = GameState::new(1, 0.0);
        let mut physics = FrozenWorld::new();
        let mut input = InputState::new();
        input.set_direction(Direction::Right, true);

        for _ in 0..600 {
            step(&mut state, &mut physics, &mut input);
        }
        assert_eq!(state.claw.planar.x, PLAY_FIELD_HALF_EXTENT);
        assert_eq!(state.claw.planar.y, 0.0);
    }

    #[test]
    fn test_nudge_applies_when_idle() {
        let mut state = GameState::new(1, 0.0);
        let mut physics = FrozenWorld::new();
        let mut input = InputState::new();
        input.nudge(Direction::Up);
        step(&mut state, &mut physics, &mut input);
        assert!((state.claw.planar - Vec2::new(0.0, -NUDGE_STEP)).length() < 1e-6);
    }

    #[test]
    fn test_descends_then_evaluates() {
        let mut state = GameState::new(1, 0.0);
        let mut physics = FrozenWorld::new();
        let mut input = InputState::new();

        start_grab(&mut state, &mut physics, &mut input);
        assert_eq!(state.events, vec![GameEvent::GrabStarted]);

        // Roughly halfway down after half the phase
        for _ in 0..30 {
            step(&mut state, &mut physics, &mut input);
        }
        let mid = (CLAW_RAISED_HEIGHT + CLAW_LOWERED_HEIGHT) / 2.0;
        assert!((state.claw.height - mid).abs() < 0.25, "height {}", state.claw.height);

        run_until(&mut state, &mut physics, &mut input, ClawState::Evaluating);
        assert_eq!(state.claw.height, CLAW_LOWERED_HEIGHT);
    }

    #[test]
    fn test_grab_at_toy_position() {
        let mut state = GameState::new(1, 0.0);
        let mut physics = FrozenWorld::new();
        let mut input = InputState::new();
        let id = place_toy(
            &mut state,
            &mut physics,
            ToyKind::Bear,
            Vec3::new(0.0, CLAW_LOWERED_HEIGHT, 0.0),
        );
        let body = state.toys[0].body.expect("spawned with a body");

        start_grab(&mut state, &mut physics, &mut input);
        run_until(&mut state, &mut physics, &mut input, ClawState::Ascending);

        assert_eq!(state.claw.grabbed(), Some(id));
        assert!(!physics.contains(body), "grabbed toy leaves the physics world");
        assert!(state.toys[0].body.is_none());
        assert_eq!(state.score(), 0, "no points until deposit");
        assert!(state.events.contains(&GameEvent::Grabbed {
            toy_id: id,
            kind: ToyKind::Bear
        }));

        // The toy rides up with the claw
        step(&mut state, &mut physics, &mut input);
        let toy = state.toy(id).expect("still on the field while held");
        assert!((toy.pos - state.claw.hang_position()).length() < 1e-6);

        run_until(&mut state, &mut physics, &mut input, ClawState::Depositing);
        assert_eq!(state.score(), 0);
        assert_eq!(state.claw.grabbed(), Some(id));
    }

    #[test]
    fn test_deposit_scores_and_removes_toy() {
        let mut state = GameState::new(1, 0.0);
        let mut physics = FrozenWorld::new();
        let mut input = InputState::new();
        // Plenty of toys so replenishment stays out of the way
        for i in 0..8 {
            place_toy(
                &mut state,
                &mut physics,
                ToyKind::Cat,
                Vec3::new(-3.5 + i as f32 * 0.1, 0.6, -3.5),
            );
        }
        let id = place_toy(&mut state, &mut physics, ToyKind::Duck, Vec3::new(2.0, 0.6, 2.0));
        state.claw.planar = Vec2::new(2.0, 2.0);

        start_grab(&mut state, &mut physics, &mut input);
        run_until(&mut state, &mut physics, &mut input, ClawState::Depositing);
        run_until(&mut state, &mut physics, &mut input, ClawState::Idle);

        assert_eq!(state.score(), POINTS_PER_TOY);
        assert!(state.toy(id).is_none());
        assert_eq!(state.toy_count(), 8);
        assert_eq!(state.claw.grabbed(), None);
        assert_eq!(state.claw.height, CLAW_RAISED_HEIGHT);
        assert!(state.events.contains(&GameEvent::Deposited {
            kind: ToyKind::Duck,
            points: POINTS_PER_TOY,
            pos: EXIT_CHUTE,
        }));
    }

    #[test]
    fn test_depositing_last_toy_replenishes_bin() {
        let mut state = GameState::new(5, 0.0);
        let mut physics = FrozenWorld::new();
        let mut input = InputState::new();
        let id = place_toy(&mut state, &mut physics, ToyKind::Rabbit, Vec3::new(0.0, 0.6, 0.0));

        start_grab(&mut state, &mut physics, &mut input);
        run_until(&mut state, &mut physics, &mut input, ClawState::Depositing);
        run_until(&mut state, &mut physics, &mut input, ClawState::Idle);

        assert_eq!(state.score(), POINTS_PER_TOY);
        assert!(state.toy(id).is_none());
        assert_eq!(state.toy_count(), REPLENISH_BATCH);
        assert_eq!(physics.body_count(), REPLENISH_BATCH);
        assert!(state.toys.iter().all(|t| t.body.is_some()));

        // Deposit first, then the refill
        let deposited = state
            .events
            .iter()
            .position(|e| matches!(e, GameEvent::Deposited { .. }))
            .expect("deposit event");
        let replenished = state
            .events
            .iter()
            .position(|e| *e == GameEvent::Replenished { count: REPLENISH_BATCH })
            .expect("replenish event");
        assert!(deposited < replenished);
    }

    #[test]
    fn test_miss_returns_to_idle_without_score() {
        let mut state = GameState::new(1, 0.0);
        let mut physics = FrozenWorld::new();
        let mut input = InputState::new();
        place_toy(&mut state, &mut physics, ToyKind::Pig, Vec3::new(3.0, 0.6, 3.0));

        start_grab(&mut state, &mut physics, &mut input);
        run_until(&mut state, &mut physics, &mut input, ClawState::Ascending);
        assert_eq!(state.claw.grabbed(), None);
        assert!(state.events.contains(&GameEvent::Missed));

        run_until(&mut state, &mut physics, &mut input, ClawState::Idle);
        assert_eq!(state.score(), 0);
        assert_eq!(state.toy_count(), 1);
        assert_eq!(state.events.last(), Some(&GameEvent::ClawReady));
    }

    #[test]
    fn test_first_toy_in_range_wins_over_nearest() {
        let mut state = GameState::new(1, 0.0);
        let mut physics = FrozenWorld::new();
        let mut input = InputState::new();
        // Both in range; the second is closer but the first was spawned first
        let first = place_toy(&mut state, &mut physics, ToyKind::Bear, Vec3::new(0.9, 1.0, 0.0));
        let _nearest = place_toy(&mut state, &mut physics, ToyKind::Panda, Vec3::new(0.1, 1.0, 0.0));

        start_grab(&mut state, &mut physics, &mut input);
        run_until(&mut state, &mut physics, &mut input, ClawState::Ascending);
        assert_eq!(state.claw.grabbed(), Some(first));
    }

    #[test]
    fn test_find_grab_target_threshold_is_strict() {
        let toys = vec![Toy {
            id: 1,
            kind: ToyKind::Rabbit,
            pos: Vec3::new(GRAB_THRESHOLD, 0.0, 0.0),
            rot: glam::Quat::IDENTITY,
            body: None,
        }];
        assert_eq!(find_grab_target(Vec3::ZERO, &toys), None);
        assert_eq!(find_grab_target(Vec3::new(0.01, 0.0, 0.0), &toys), Some(0));
    }

    #[test]
    fn test_grab_request_ignored_mid_cycle() {
        let mut state = GameState::new(1, 0.0);
        let mut physics = FrozenWorld::new();
        let mut input = InputState::new();

        start_grab(&mut state, &mut physics, &mut input);
        let started = state.claw.phase_elapsed(state.time);
        input.request_grab();
        step(&mut state, &mut physics, &mut input);

        assert_eq!(state.claw.state(), ClawState::Descending);
        assert!(state.claw.phase_elapsed(state.time) > started, "phase was not restarted");
        assert!(!input.consume_grab_request(), "request consumed, not deferred");
        assert_eq!(
            state.events.iter().filter(|e| **e == GameEvent::GrabStarted).count(),
            1
        );
    }

    #[test]
    fn test_openness() {
        let mut claw = ClawController::new();
        assert_eq!(claw.openness(0.0), 1.0);
        claw.try_begin_grab(0.0);
        claw.enter(ClawState::Evaluating, 1.0);
        assert!((claw.openness(1.0 + GRIP_DWELL as f64 / 2.0) - 0.5).abs() < 1e-4);
        assert_eq!(claw.openness(5.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_planar_stays_in_field(moves in prop::collection::vec((0usize..4, any::<bool>(), 1u32..40), 1..40)) {
            let mut state = GameState::new(1, 0.0);
            let mut physics = FrozenWorld::new();
            let mut input = InputState::new();
            for (dir, held, ticks) in moves {
                input.set_direction(Direction::ALL[dir], held);
                if held && ticks % 7 == 0 {
                    input.nudge(Direction::ALL[dir]);
                }
                for _ in 0..ticks {
                    step(&mut state, &mut physics, &mut input);
                    prop_assert!(state.claw.planar.x.abs() <= PLAY_FIELD_HALF_EXTENT);
                    prop_assert!(state.claw.planar.y.abs() <= PLAY_FIELD_HALF_EXTENT);
                }
            }
        }

        #[test]
        fn prop_movement_locked_outside_idle(moves in prop::collection::vec((0usize..4, 1u32..20), 1..30)) {
            let mut state = GameState::new(1, 0.0);
            let mut physics = FrozenWorld::new();
            let mut input = InputState::new();
            start_grab(&mut state, &mut physics, &mut input);
            let locked = state.claw.planar;

            for (dir, ticks) in moves {
                input.release_all();
                input.set_direction(Direction::ALL[dir], true);
                input.nudge(Direction::ALL[dir]);
                for _ in 0..ticks {
                    if state.claw.is_idle() {
                        break;
                    }
                    step(&mut state, &mut physics, &mut input);
                    if !state.claw.is_idle() {
                        prop_assert_eq!(state.claw.planar, locked);
                    }
                }
            }
        }

        #[test]
        fn prop_grabbed_only_while_ascending_or_depositing(
            toy_x in -4.0f32..4.0,
            toy_z in -4.0f32..4.0,
            claw_x in -4.0f32..4.0,
            claw_z in -4.0f32..4.0,
        ) {
            let mut state = GameState::new(1, 0.0);
            let mut physics = FrozenWorld::new();
            let mut input = InputState::new();
            place_toy(&mut state, &mut physics, ToyKind::Bear, Vec3::new(toy_x, 0.6, toy_z));
            state.claw.planar = Vec2::new(claw_x, claw_z);

            input.request_grab();
            for _ in 0..400 {
                step(&mut state, &mut physics, &mut input);
                let holding = state.claw.grabbed().is_some();
                let carrying_phase = matches!(
                    state.claw.state(),
                    ClawState::Ascending | ClawState::Depositing
                );
                prop_assert!(!holding || carrying_phase);
                if state.claw.state() == ClawState::Depositing {
                    prop_assert!(holding);
                }
            }
            prop_assert!(state.claw.is_idle());
        }
    }
}
