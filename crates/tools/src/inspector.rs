use marbleworks_common::EntityId;
use marbleworks_kernel::World;
use serde::Serialize;

/// World inspector for developer tooling.
///
/// Read-only queries against the world state for debugging and CLI output.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state.
    pub fn summary(world: &World) -> WorldSummary {
        WorldSummary {
            tick: world.tick(),
            sim_time: world.sim_time(),
            entity_count: world.entity_count(),
            emitter_count: world.emitter_count(),
            live_particles: world.live_particle_count(),
        }
    }

    /// Local and world transform of a specific entity.
    ///
    /// Takes `&mut World` because reading the world matrix may refresh the
    /// transform graph's lazy cache.
    pub fn inspect_entity(world: &mut World, id: EntityId) -> Option<EntityInfo> {
        let data = world.get(id)?;
        let name = data.name.clone();
        let node = data.node;

        let scene = world.scene_mut();
        let position = scene.position(node)?;
        let rotation = scene.rotation(node)?;
        let scale = scene.scale(node)?;
        let (_, _, world_position) = scene.world_matrix(node)?.to_scale_rotation_translation();

        Some(EntityInfo {
            id,
            name,
            position: position.to_array(),
            rotation: rotation.to_array(),
            scale: scale.to_array(),
            world_position: world_position.to_array(),
        })
    }

    /// All entity ids in deterministic order.
    pub fn list_entities(world: &World) -> Vec<EntityId> {
        world.entities().keys().copied().collect()
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSummary {
    pub tick: u64,
    pub sim_time: f32,
    pub entity_count: usize,
    pub emitter_count: usize,
    pub live_particles: usize,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: tick={} t={:.2}s entities={} emitters={} live_particles={}",
            self.tick, self.sim_time, self.entity_count, self.emitter_count, self.live_particles
        )
    }
}

/// Detailed info about a single entity. Rotation is local Euler angles in
/// radians (pitch, yaw, roll).
#[derive(Debug, Clone, Serialize)]
pub struct EntityInfo {
    pub id: EntityId,
    pub name: String,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub world_position: [f32; 3],
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entity [{:.8}] {} pos=({:.2}, {:.2}, {:.2}) world=({:.2}, {:.2}, {:.2})",
            &self.id.0.to_string()[..8],
            self.name,
            self.position[0],
            self.position[1],
            self.position[2],
            self.world_position[0],
            self.world_position[1],
            self.world_position[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use marbleworks_particles::EmitterConfig;

    #[test]
    fn summary_empty_world() {
        let world = World::new();
        let summary = WorldInspector::summary(&world);
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.entity_count, 0);
        assert_eq!(summary.live_particles, 0);
    }

    #[test]
    fn summary_counts_emitters_and_particles() {
        let mut world = World::new();
        let id = world.spawn("fountain");
        let config = EmitterConfig {
            capacity: 8,
            particles_per_second: 4.0,
            lifetime: 10.0,
            ..EmitterConfig::default()
        };
        world.attach_emitter(id, config, 0).unwrap();
        world.step(1.0);

        let summary = WorldInspector::summary(&world);
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.emitter_count, 1);
        assert!(summary.live_particles > 0);
    }

    #[test]
    fn inspect_entity_reports_world_pose() {
        let mut world = World::new();
        let parent = world.spawn("platform");
        let child = world.spawn_child("marble", parent).unwrap();
        let parent_node = world.node_of(parent).unwrap();
        let child_node = world.node_of(child).unwrap();
        world.scene_mut().set_position(parent_node, Vec3::new(5.0, 0.0, 0.0));
        world.scene_mut().set_position(child_node, Vec3::new(0.0, 1.0, 0.0));

        let info = WorldInspector::inspect_entity(&mut world, child).unwrap();
        assert_eq!(info.name, "marble");
        assert_eq!(info.position, [0.0, 1.0, 0.0]);
        assert_eq!(info.world_position, [5.0, 1.0, 0.0]);
    }

    #[test]
    fn inspect_entity_not_found() {
        let mut world = World::new();
        assert!(WorldInspector::inspect_entity(&mut world, EntityId::new()).is_none());
    }

    #[test]
    fn list_entities() {
        let mut world = World::new();
        let a = world.spawn("a");
        let b = world.spawn("b");

        let ids = WorldInspector::list_entities(&world);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a));
        assert!(ids.contains(&b));
    }

    #[test]
    fn summary_display() {
        let world = World::new();
        let s = format!("{}", WorldInspector::summary(&world));
        assert!(s.contains("tick=0"));
    }
}
