use marbleworks_common::{EntityId, NodeId};
use marbleworks_particles::{Emitter, EmitterConfig, EmitterError};
use marbleworks_scene::TransformGraph;
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-entity data stored in the world.
///
/// Entities are plain owned records: a name for tooling and the id of their
/// transform node. Meshes, materials, and physics bodies live with their
/// respective subsystems and reference entities by id.
#[derive(Debug, Clone)]
pub struct EntityData {
    pub name: String,
    pub node: NodeId,
}

/// Errors from world operations that reference other subsystems.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),
    #[error(transparent)]
    Emitter(#[from] EmitterError),
}

/// The authoritative world state.
///
/// Owns the transform graph and all entities. Renderers, physics, and
/// tooling derive from it; mutations go through explicit operations.
///
/// Uses BTreeMap for deterministic iteration order across all platforms.
#[derive(Debug, Default)]
pub struct World {
    scene: TransformGraph,
    entities: BTreeMap<EntityId, EntityData>,
    emitters: BTreeMap<EntityId, Emitter>,
    tick: u64,
    sim_time: f32,
}

impl World {
    /// Create an empty world at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Accumulated simulation time in seconds.
    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    /// Read-only access to all entities (BTreeMap for deterministic iteration).
    pub fn entities(&self) -> &BTreeMap<EntityId, EntityData> {
        &self.entities
    }

    pub fn scene(&self) -> &TransformGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut TransformGraph {
        &mut self.scene
    }

    /// Spawn a root entity with an identity transform. Returns its id.
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityId {
        let id = EntityId::new();
        let node = self.scene.insert();
        let name = name.into();
        tracing::debug!(?id, name, "spawned entity");
        self.entities.insert(id, EntityData { name, node });
        id
    }

    /// Spawn an entity whose transform node is attached under the parent
    /// entity's node. Returns `None` if the parent is unknown.
    pub fn spawn_child(&mut self, name: impl Into<String>, parent: EntityId) -> Option<EntityId> {
        let parent_node = self.node_of(parent)?;
        let id = self.spawn(name);
        let node = self.node_of(id).unwrap_or_else(NodeId::new);
        self.scene.add_child(parent_node, node);
        Some(id)
    }

    /// Remove an entity, its emitter binding, and its transform node.
    /// Children of the node are detached with their world poses preserved.
    pub fn despawn(&mut self, id: EntityId) -> Option<EntityData> {
        let data = self.entities.remove(&id)?;
        self.emitters.remove(&id);
        self.scene.remove(data.node);
        tracing::debug!(?id, name = data.name, "despawned entity");
        Some(data)
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityData> {
        self.entities.get(&id)
    }

    /// Transform node backing an entity.
    pub fn node_of(&self, id: EntityId) -> Option<NodeId> {
        self.entities.get(&id).map(|data| data.node)
    }

    /// Bind a particle emitter to an entity. The emitter samples its spawn
    /// shape from the entity's world translation and scale each step.
    pub fn attach_emitter(
        &mut self,
        id: EntityId,
        config: EmitterConfig,
        seed: u64,
    ) -> Result<(), WorldError> {
        if !self.entities.contains_key(&id) {
            return Err(WorldError::UnknownEntity(id));
        }
        let emitter = Emitter::new(config, seed)?;
        tracing::debug!(?id, capacity = emitter.capacity(), "attached emitter");
        self.emitters.insert(id, emitter);
        Ok(())
    }

    pub fn emitter(&self, id: EntityId) -> Option<&Emitter> {
        self.emitters.get(&id)
    }

    pub fn emitter_mut(&mut self, id: EntityId) -> Option<&mut Emitter> {
        self.emitters.get_mut(&id)
    }

    /// Iterate all emitter bindings in deterministic id order.
    pub fn emitters(&self) -> impl Iterator<Item = (EntityId, &Emitter)> {
        self.emitters.iter().map(|(id, emitter)| (*id, emitter))
    }

    /// Total living particles across all emitters.
    pub fn live_particle_count(&self) -> usize {
        self.emitters.values().map(Emitter::living_count).sum()
    }

    /// Advance the simulation by one frame.
    ///
    /// Bumps the tick and clock, then updates every emitter once, feeding it
    /// the owning node's world translation and scale for shape sampling.
    pub fn step(&mut self, dt: f32) {
        let _span = tracing::debug_span!("world_step", tick = self.tick).entered();
        self.tick += 1;
        self.sim_time += dt;

        for (id, emitter) in self.emitters.iter_mut() {
            let Some(data) = self.entities.get(id) else {
                continue;
            };
            let Some(world) = self.scene.world_matrix(data.node) else {
                continue;
            };
            let (extent, _rotation, origin) = world.to_scale_rotation_translation();
            emitter.update(dt, self.sim_time, origin, extent);
        }

        tracing::trace!(
            sim_time = self.sim_time,
            live_particles = self.emitters.values().map(Emitter::living_count).sum::<usize>(),
            "step complete"
        );
    }
}
