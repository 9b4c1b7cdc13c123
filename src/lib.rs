//! Claw Machine - A 3D arcade claw game
//!
//! Core modules:
//! - `sim`: Claw state machine, toy spawning, scoring and the physics seam
//! - `catalog`: Toy archetypes and their procedural models
//! - `renderer`: WebGPU raymarching pipeline
//! - `settings`: Player preferences (quality, audio)
//! - `audio`: Procedural Web Audio sound effects

pub mod audio;
pub mod catalog;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use catalog::{ToyArchetype, ToyKind, ToyModel};
pub use settings::{QualityPreset, Settings};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Delta used for the very first frame, before a previous timestamp exists
    pub const FIRST_FRAME_DT: f32 = 1.0 / 60.0;

    /// Half-extent of the claw's travel square on x and z
    pub const PLAY_FIELD_HALF_EXTENT: f32 = 4.0;
    /// Half-extent of the physical bin (walls sit here)
    pub const BIN_HALF_EXTENT: f32 = 5.0;

    /// Claw height at rest
    pub const CLAW_RAISED_HEIGHT: f32 = 8.0;
    /// Claw height at the bottom of a grab
    pub const CLAW_LOWERED_HEIGHT: f32 = 1.0;
    /// Planar claw speed while a direction is held (units/s)
    pub const CLAW_SPEED: f32 = 3.0;
    /// Distance moved by a single on-screen button press
    pub const NUDGE_STEP: f32 = 0.8;

    /// Duration of the descend and ascend tweens (seconds)
    pub const PHASE_DURATION: f32 = 1.0;
    /// Time the claw sits at the bottom before closing
    pub const GRIP_DWELL: f32 = 0.5;
    /// Time between reaching the top with a prize and dropping it in the chute
    pub const DEPOSIT_DELAY: f32 = 1.0;

    /// A toy closer than this to the claw tip is grabbed
    pub const GRAB_THRESHOLD: f32 = 1.2;
    /// A grabbed toy hangs this far below the claw height
    pub const GRAB_HANG_OFFSET: f32 = 1.5;
    /// Where deposited toys are dropped
    pub const EXIT_CHUTE: Vec3 = Vec3::new(6.0, 2.0, 0.0);
    /// Points per deposited toy
    pub const POINTS_PER_TOY: u64 = 10;

    /// Toys in the bin at the start of a session
    pub const INITIAL_TOY_COUNT: usize = 12;
    /// Replenish when fewer than this many toys remain
    pub const REPLENISH_FLOOR: usize = 5;
    /// Toys added per replenishment
    pub const REPLENISH_BATCH: usize = 5;
    /// Initial toys start between these heights
    pub const SPAWN_MIN_HEIGHT: f32 = 1.0;
    pub const SPAWN_MAX_HEIGHT: f32 = 2.5;
    /// Replenished toys are dropped from here
    pub const REPLENISH_DROP_HEIGHT: f32 = 8.0;

    /// Collision sphere for every toy
    pub const TOY_BODY_RADIUS: f32 = 0.6;
    pub const TOY_MASS: f32 = 0.8;
    /// Collision sphere carried by the claw; it shoves toys aside on the way down
    pub const CLAW_BODY_RADIUS: f32 = 0.4;
    /// Gravity (m/s²)
    pub const GRAVITY: f32 = -9.82;

    /// Camera placement
    pub const CAMERA_EYE: Vec3 = Vec3::new(0.0, 8.0, 12.0);
    pub const CAMERA_TARGET: Vec3 = Vec3::ZERO;
    pub const CAMERA_FOV_DEGREES: f32 = 75.0;
}

/// Clamp a planar claw position into the travel square
#[inline]
pub fn clamp_to_field(pos: Vec2) -> Vec2 {
    let e = consts::PLAY_FIELD_HALF_EXTENT;
    pos.clamp(Vec2::splat(-e), Vec2::splat(e))
}

/// Lift a planar (x, z) position to 3D at the given height
#[inline]
pub fn planar_to_world(pos: Vec2, height: f32) -> Vec3 {
    Vec3::new(pos.x, height, pos.y)
}

/// Linear interpolation with `t` clamped to [0, 1]
#[inline]
pub fn lerp_clamped(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_to_field() {
        let p = clamp_to_field(Vec2::new(9.0, -12.0));
        assert_eq!(p, Vec2::new(4.0, -4.0));
        let inside = Vec2::new(1.5, -2.5);
        assert_eq!(clamp_to_field(inside), inside);
    }

    #[test]
    fn test_lerp_clamped() {
        assert_eq!(lerp_clamped(8.0, 1.0, 0.0), 8.0);
        assert_eq!(lerp_clamped(8.0, 1.0, 1.0), 1.0);
        assert_eq!(lerp_clamped(8.0, 1.0, 2.0), 1.0);
        assert!((lerp_clamped(8.0, 1.0, 0.5) - 4.5).abs() < 1e-6);
    }
}
