//! GPU data layout and CPU-side scene packing
//!
//! Toy models are built once per kind and transformed into world space every
//! frame. Each toy becomes a bounding sphere plus a contiguous run of
//! round-cone parts; the shader skips a toy's parts when its bounding sphere
//! is farther than the current closest surface.

use bytemuck::{Pod, Zeroable};

use crate::catalog::{ToyKind, ToyModel};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::GameState;

/// Maximum number of toys uploaded
pub const MAX_TOYS: usize = 64;
/// Maximum number of model parts uploaded
pub const MAX_PARTS: usize = 1024;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub resolution: [f32; 2],    // offset 0
    pub time: f32,               // offset 8
    pub fov_y: f32,              // offset 12 - radians
    pub camera_eye: [f32; 4],    // offset 16 - xyz, w unused
    pub camera_target: [f32; 4], // offset 32
    pub claw: [f32; 4],          // offset 48 - x, height, z, openness
    pub toy_count: u32,          // offset 64
    pub part_count: u32,         // offset 68
    pub max_steps: u32,          // offset 72
    pub soft_shadows: u32,       // offset 76
    pub paused: u32,             // offset 80
    pub _pad: [u32; 3],          // pad to 96 bytes
}

impl Globals {
    /// Placeholder contents before the first frame
    pub fn zeroed_with_resolution(width: u32, height: u32) -> Self {
        Self {
            resolution: [width as f32, height as f32],
            ..Self::zeroed()
        }
    }

    pub fn new(
        state: &GameState,
        settings: &Settings,
        resolution: (u32, u32),
        time: f32,
        toy_count: u32,
        part_count: u32,
    ) -> Self {
        let claw = &state.claw;
        Self {
            resolution: [resolution.0 as f32, resolution.1 as f32],
            time,
            fov_y: CAMERA_FOV_DEGREES.to_radians(),
            camera_eye: CAMERA_EYE.extend(1.0).to_array(),
            camera_target: CAMERA_TARGET.extend(1.0).to_array(),
            claw: [
                claw.planar.x,
                claw.height,
                claw.planar.y,
                claw.openness(state.time),
            ],
            toy_count,
            part_count,
            max_steps: settings.quality.raymarch_steps(),
            soft_shadows: settings.quality.soft_shadows() as u32,
            paused: state.paused as u32,
            _pad: [0; 3],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ToyData {
    /// World-space bounding sphere: center xyz, radius w
    pub bounds: [f32; 4],
    pub part_start: u32,
    pub part_count: u32,
    /// 1 while in the claw (rim highlight)
    pub held: u32,
    pub _pad: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PartData {
    /// Endpoint a (xyz) and its radius (w)
    pub a: [f32; 4],
    /// Endpoint b (xyz) and its radius (w)
    pub b: [f32; 4],
    pub color: [f32; 4],
}

/// Toy models, built once per kind
#[derive(Debug, Clone)]
pub struct ModelCache {
    models: Vec<ToyModel>,
    radii: Vec<f32>,
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelCache {
    pub fn new() -> Self {
        let models: Vec<ToyModel> = ToyKind::ALL.iter().map(|k| k.archetype().model()).collect();
        let radii = models.iter().map(ToyModel::bounding_radius).collect();
        Self { models, radii }
    }

    pub fn model(&self, kind: ToyKind) -> &ToyModel {
        &self.models[kind.index()]
    }

    pub fn bounding_radius(&self, kind: ToyKind) -> f32 {
        self.radii[kind.index()]
    }
}

/// Packed per-frame toy data
#[derive(Debug, Default)]
pub struct SceneData {
    pub toys: Vec<ToyData>,
    pub parts: Vec<PartData>,
}

impl SceneData {
    /// Transform every live toy's model into world space. Toys that would
    /// overflow either buffer are dropped whole.
    pub fn pack(state: &GameState, cache: &ModelCache) -> Self {
        let mut scene = SceneData::default();
        let held = state.claw.grabbed();

        for toy in &state.toys {
            if scene.toys.len() >= MAX_TOYS {
                break;
            }
            let model = cache.model(toy.kind);
            if scene.parts.len() + model.parts.len() > MAX_PARTS {
                log::warn!("Part buffer full, skipping {} toys", state.toys.len() - scene.toys.len());
                break;
            }

            let part_start = scene.parts.len() as u32;
            for part in &model.parts {
                let a = toy.pos + toy.rot * part.a;
                let b = toy.pos + toy.rot * part.b;
                scene.parts.push(PartData {
                    a: a.extend(part.ra).to_array(),
                    b: b.extend(part.rb).to_array(),
                    color: [part.color[0], part.color[1], part.color[2], 1.0],
                });
            }

            scene.toys.push(ToyData {
                bounds: toy.pos.extend(cache.bounding_radius(toy.kind)).to_array(),
                part_start,
                part_count: model.parts.len() as u32,
                held: (held == Some(toy.id)) as u32,
                _pad: 0,
            });
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::testing::FrozenWorld;
    use crate::sim::spawner;
    use glam::{Quat, Vec3};

    #[test]
    fn test_gpu_struct_sizes() {
        assert_eq!(std::mem::size_of::<Globals>(), 96);
        assert_eq!(std::mem::size_of::<ToyData>(), 32);
        assert_eq!(std::mem::size_of::<PartData>(), 48);
    }

    #[test]
    fn test_pack_part_ranges_are_contiguous() {
        let mut state = GameState::new(4, 0.0);
        let mut physics = FrozenWorld::new();
        spawner::spawn_initial(&mut state, &mut physics, INITIAL_TOY_COUNT);
        let cache = ModelCache::new();

        let scene = SceneData::pack(&state, &cache);
        assert_eq!(scene.toys.len(), INITIAL_TOY_COUNT);

        let mut expected_start = 0;
        for (toy, data) in state.toys.iter().zip(&scene.toys) {
            assert_eq!(data.part_start, expected_start);
            assert_eq!(data.part_count as usize, cache.model(toy.kind).parts.len());
            expected_start += data.part_count;
        }
        assert_eq!(scene.parts.len() as u32, expected_start);
    }

    #[test]
    fn test_pack_applies_toy_transform() {
        let mut state = GameState::new(4, 0.0);
        let mut physics = FrozenWorld::new();
        let pos = Vec3::new(1.0, 2.0, 3.0);
        spawner::spawn_toy(&mut state, &mut physics, ToyKind::Duck, pos);
        state.toys[0].rot = Quat::from_rotation_y(std::f32::consts::PI);
        let cache = ModelCache::new();

        let scene = SceneData::pack(&state, &cache);
        let local = cache.model(ToyKind::Duck).parts[1].a;
        let world = Vec3::from_slice(&scene.parts[1].a[..3]);
        let expected = pos + Vec3::new(-local.x, local.y, -local.z);
        assert!((world - expected).length() < 1e-5);
        assert_eq!(scene.toys[0].bounds[3], cache.bounding_radius(ToyKind::Duck));
    }

    #[test]
    fn test_pack_caps_toy_count() {
        let mut state = GameState::new(4, 0.0);
        let mut physics = FrozenWorld::new();
        spawner::spawn_initial(&mut state, &mut physics, MAX_TOYS + 10);
        let scene = SceneData::pack(&state, &ModelCache::new());
        assert!(scene.toys.len() <= MAX_TOYS);
        assert!(scene.parts.len() <= MAX_PARTS);
    }

    #[test]
    fn test_globals_track_claw() {
        let mut state = GameState::new(4, 0.0);
        state.claw.planar = glam::Vec2::new(1.5, -2.0);
        let settings = Settings::default();
        let globals = Globals::new(&state, &settings, (800, 600), 1.0, 0, 0);
        assert_eq!(globals.claw, [1.5, CLAW_RAISED_HEIGHT, -2.0, 1.0]);
        assert_eq!(globals.max_steps, settings.quality.raymarch_steps());
        assert_eq!(globals.paused, 0);
    }
}
