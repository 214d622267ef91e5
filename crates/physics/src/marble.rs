use glam::{Quat, Vec3};
use marbleworks_common::NodeId;
use marbleworks_scene::TransformGraph;
use rapier3d::math::Rotation;
use rapier3d::prelude::*;

use crate::simulator::{to_vec3, PhysicsWorld};

/// Force applied per push request, in newtons.
const ROLL_FORCE: f32 = 5.0;

/// Radius of the marble's ball collider.
const MARBLE_RADIUS: f32 = 1.0;

/// The player-controlled rolling marble.
///
/// A dynamic ball body driven by forces. After each solver step the
/// simulated pose is copied back into the marble's scene-graph node; the
/// scene never drives the body.
pub struct Marble {
    body: RigidBodyHandle,
    node: NodeId,
}

impl Marble {
    /// Create the marble's rigid body and collider at the spawn position and
    /// bind it to a scene-graph node.
    pub fn new(physics: &mut PhysicsWorld, node: NodeId, spawn: Vec3) -> Self {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![spawn.x, spawn.y, spawn.z])
            .build();
        let handle = physics.insert_rigid_body(body);

        let collider = ColliderBuilder::ball(MARBLE_RADIUS)
            .density(10.0)
            .friction(0.8)
            .restitution(0.3)
            .build();
        physics.insert_collider_with_parent(collider, handle);

        tracing::debug!(?node, ?spawn, "created marble body");
        Self { body: handle, node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Queue a rolling force along `dir` for the next solver step and keep
    /// the body awake so it rolls even when barely pushed.
    pub fn push(&self, physics: &mut PhysicsWorld, dir: Vec3) {
        if let Some(body) = physics.body_mut(self.body) {
            body.add_force(vector![dir.x, dir.y, dir.z] * ROLL_FORCE, true);
            body.wake_up(true);
        }
    }

    /// Drop forces queued by [`Self::push`]. Call once per frame after the
    /// solver step; rapier accumulates forces until told otherwise.
    pub fn clear_forces(&self, physics: &mut PhysicsWorld) {
        if let Some(body) = physics.body_mut(self.body) {
            body.reset_forces(true);
        }
    }

    /// Copy the simulated pose into the scene graph.
    pub fn sync_scene(&self, physics: &PhysicsWorld, scene: &mut TransformGraph) -> bool {
        let Some(body) = physics.body(self.body) else {
            return false;
        };
        let position = to_vec3(body.translation());
        let q = body.rotation();
        let rotation = Quat::from_xyzw(q.i, q.j, q.k, q.w);

        scene.set_position(self.node, position) && scene.set_rotation_quat(self.node, rotation)
    }

    /// Teleport back to a spawn point with all motion cancelled.
    pub fn reset(&self, physics: &mut PhysicsWorld, spawn: Vec3) {
        if let Some(body) = physics.body_mut(self.body) {
            body.reset_forces(true);
            body.set_linvel(vector![0.0, 0.0, 0.0], true);
            body.set_angvel(vector![0.0, 0.0, 0.0], true);
            body.set_rotation(Rotation::identity(), true);
            body.set_translation(vector![spawn.x, spawn.y, spawn.z], true);
        }
    }

    /// Current simulated position, for tooling and tests.
    pub fn position(&self, physics: &PhysicsWorld) -> Option<Vec3> {
        physics.body(self.body).map(|b| to_vec3(b.translation()))
    }
}
