//! Rigid-body physics for the toy bin
//!
//! The simulation only needs a handful of operations from a physics engine, so
//! they sit behind the `Physics` trait. `RapierWorld` is the real backend: a
//! ground plane, four glass walls, one dynamic sphere per toy and a kinematic
//! sphere that follows the claw.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use rapier3d::prelude::*;

use crate::consts::{BIN_HALF_EXTENT, CLAW_BODY_RADIUS, GRAVITY};

/// Opaque handle to a body owned by a `Physics` backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

/// Physics collaborator used by the simulation
pub trait Physics {
    /// Add a dynamic sphere at `pos`
    fn add_sphere(&mut self, pos: Vec3, radius: f32, mass: f32) -> BodyId;
    /// Remove a body; unknown ids are ignored
    fn remove(&mut self, body: BodyId);
    /// Move the claw's collision sphere to `pos`, creating it on first use.
    /// The move takes effect over the next `step`.
    fn set_claw(&mut self, pos: Vec3);
    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32);
    /// Current position and orientation of a body
    fn pose(&self, body: BodyId) -> Option<(Vec3, Quat)>;
    /// Number of toy bodies (the claw is not counted)
    fn body_count(&self) -> usize;
}

/// Rapier-backed physics world
pub struct RapierWorld {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    gravity: Vector<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    /// Toy bodies by id
    bodies: HashMap<BodyId, RigidBodyHandle>,
    next_id: u32,
    claw: Option<RigidBodyHandle>,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierWorld {
    /// Create a world containing the bin: floor plus four walls
    pub fn new() -> Self {
        let mut world = Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            gravity: vector![0.0, GRAVITY, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            bodies: HashMap::new(),
            next_id: 1,
            claw: None,
        };
        world.build_bin();
        log::info!("Physics world ready (gravity {})", GRAVITY);
        world
    }

    fn build_bin(&mut self) {
        let e = BIN_HALF_EXTENT;
        let wall_half_height = 5.0;
        let wall_half_thickness = 0.1;

        // Floor: top face at y = 0
        let floor = ColliderBuilder::cuboid(e + 1.0, 0.1, e + 1.0)
            .translation(vector![0.0, -0.1, 0.0])
            .build();
        self.collider_set.insert(floor);

        let walls = [
            (vector![0.0, wall_half_height, e], vector![e, wall_half_height, wall_half_thickness]),
            (vector![0.0, wall_half_height, -e], vector![e, wall_half_height, wall_half_thickness]),
            (vector![-e, wall_half_height, 0.0], vector![wall_half_thickness, wall_half_height, e]),
            (vector![e, wall_half_height, 0.0], vector![wall_half_thickness, wall_half_height, e]),
        ];
        for (center, half) in walls {
            let wall = ColliderBuilder::cuboid(half.x, half.y, half.z)
                .translation(center)
                .build();
            self.collider_set.insert(wall);
        }
    }

    /// Current position of the claw's collision sphere
    pub fn claw_position(&self) -> Option<Vec3> {
        let rb = self.rigid_body_set.get(self.claw?)?;
        let t = rb.translation();
        Some(Vec3::new(t.x, t.y, t.z))
    }
}

impl Physics for RapierWorld {
    fn add_sphere(&mut self, pos: Vec3, radius: f32, mass: f32) -> BodyId {
        let rb = RigidBodyBuilder::dynamic()
            .translation(vector![pos.x, pos.y, pos.z])
            .build();
        let handle = self.rigid_body_set.insert(rb);
        let collider = ColliderBuilder::ball(radius).mass(mass).build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.insert(id, handle);
        id
    }

    fn remove(&mut self, body: BodyId) {
        if let Some(handle) = self.bodies.remove(&body) {
            self.rigid_body_set.remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            );
        }
    }

    fn set_claw(&mut self, pos: Vec3) {
        let target = vector![pos.x, pos.y, pos.z];
        if let Some(rb) = self.claw.and_then(|h| self.rigid_body_set.get_mut(h)) {
            rb.set_next_kinematic_translation(target);
            return;
        }

        let rb = RigidBodyBuilder::kinematic_position_based()
            .translation(target)
            .build();
        let handle = self.rigid_body_set.insert(rb);
        let collider = ColliderBuilder::ball(CLAW_BODY_RADIUS).build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        self.claw = Some(handle);
    }

    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    fn pose(&self, body: BodyId) -> Option<(Vec3, Quat)> {
        let handle = self.bodies.get(&body)?;
        let rb = self.rigid_body_set.get(*handle)?;
        let t = rb.translation();
        let q = rb.rotation().coords;
        Some((Vec3::new(t.x, t.y, t.z), Quat::from_xyzw(q.x, q.y, q.z, q.w)))
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

/// Test doubles
#[cfg(test)]
pub mod testing {
    use super::*;

    /// A physics world where nothing moves: bodies stay where they were added.
    #[derive(Debug, Default)]
    pub struct FrozenWorld {
        bodies: HashMap<BodyId, Vec3>,
        next_id: u32,
        pub steps: u32,
        /// Last position handed to `set_claw`
        pub claw: Option<Vec3>,
    }

    impl FrozenWorld {
        pub fn new() -> Self {
            Self::default()
        }

        /// Teleport a body (stands in for physics moving it)
        pub fn set_position(&mut self, body: BodyId, pos: Vec3) {
            if let Some(p) = self.bodies.get_mut(&body) {
                *p = pos;
            }
        }

        pub fn contains(&self, body: BodyId) -> bool {
            self.bodies.contains_key(&body)
        }
    }

    impl Physics for FrozenWorld {
        fn add_sphere(&mut self, pos: Vec3, _radius: f32, _mass: f32) -> BodyId {
            self.next_id += 1;
            let id = BodyId(self.next_id);
            self.bodies.insert(id, pos);
            id
        }

        fn remove(&mut self, body: BodyId) {
            self.bodies.remove(&body);
        }

        fn set_claw(&mut self, pos: Vec3) {
            self.claw = Some(pos);
        }

        fn step(&mut self, _dt: f32) {
            self.steps += 1;
        }

        fn pose(&self, body: BodyId) -> Option<(Vec3, Quat)> {
            self.bodies.get(&body).map(|p| (*p, Quat::IDENTITY))
        }

        fn body_count(&self) -> usize {
            self.bodies.len()
        }
    }
}
