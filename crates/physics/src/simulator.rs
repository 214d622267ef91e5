use glam::Vec3;
use rapier3d::prelude::*;

/// Owns the full rapier pipeline state and steps it at a fixed rate.
///
/// Y-up, gravity straight down. Callers insert bodies and colliders through
/// the helpers and read poses back after each `step`.
pub struct PhysicsWorld {
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhaseMultiSap,
    narrow_phase: NarrowPhase,
    ccd_solver: CCDSolver,
    gravity: Vector<Real>,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    physics_hooks: (),
    event_handler: (),
    queries: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self {
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            gravity: vector![0.0, -9.81, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            physics_hooks: (),
            event_handler: (),
            queries: QueryPipeline::new(),
        }
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed solver timestep in seconds.
    pub fn fixed_dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Advance the solver by one fixed timestep.
    pub fn step(&mut self) {
        let _span = tracing::trace_span!("physics_step").entered();
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
            Some(&mut self.queries),
            &self.physics_hooks,
            &self.event_handler,
        );
    }

    pub fn insert_rigid_body(&mut self, rigid_body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(rigid_body)
    }

    /// Insert a collider attached to an existing rigid body.
    pub fn insert_collider_with_parent(
        &mut self,
        collider: Collider,
        parent: RigidBodyHandle,
    ) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent, &mut self.rigid_body_set)
    }

    /// Insert a free-standing (fixed) collider.
    pub fn insert_collider(&mut self, collider: Collider) -> ColliderHandle {
        self.collider_set.insert(collider)
    }

    /// Fixed ground slab the marble rolls on. Positioned so its top face
    /// sits at y = 0.
    pub fn add_ground(&mut self, half_extents: Vec3) -> ColliderHandle {
        let ground = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![0.0, -half_extents.y, 0.0])
            .friction(0.8)
            .build();
        self.insert_collider(ground)
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }
}

/// rapier vector to glam, component-wise.
pub fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_world_has_sane_timestep() {
        let world = PhysicsWorld::new();
        assert!(world.fixed_dt() > 0.0);
        assert!(world.fixed_dt() <= 1.0 / 30.0);
    }

    #[test]
    fn free_body_falls_under_gravity() {
        let mut world = PhysicsWorld::new();
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![0.0, 5.0, 0.0])
            .build();
        let handle = world.insert_rigid_body(body);

        for _ in 0..60 {
            world.step();
        }
        let y = world.body(handle).unwrap().translation().y;
        assert!(y < 4.0, "body should have fallen, y = {y}");
    }

    #[test]
    fn ground_collider_sits_below_origin() {
        let mut world = PhysicsWorld::new();
        world.add_ground(Vec3::new(20.0, 0.1, 20.0));
        // A dynamic ball dropped from above must not fall through
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![0.0, 3.0, 0.0])
            .build();
        let handle = world.insert_rigid_body(body);
        let ball = ColliderBuilder::ball(0.5).density(1.0).build();
        world.insert_collider_with_parent(ball, handle);

        for _ in 0..600 {
            world.step();
        }
        let y = world.body(handle).unwrap().translation().y;
        assert!(y > 0.0, "ball fell through the ground, y = {y}");
    }
}
