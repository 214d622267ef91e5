use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use marbleworks_particles::{Emitter, Particle};

/// Per-particle instance data laid out for GPU upload.
///
/// Position/velocity integration happens on the GPU: the vertex stage
/// reconstructs the current position from the spawn state, the emitter
/// acceleration, and the frame's simulation time.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub starting_position: [f32; 3],
    pub emit_time: f32,
    pub velocity: [f32; 3],
    _pad: f32,
}

impl From<&Particle> for ParticleInstance {
    fn from(p: &Particle) -> Self {
        Self {
            starting_position: p.starting_position.to_array(),
            emit_time: p.emit_time,
            velocity: p.velocity.to_array(),
            _pad: 0.0,
        }
    }
}

/// One emitter's worth of living particles, flattened for a draw call.
///
/// Instances are in spawn order (oldest first), so a single contiguous
/// upload covers the whole batch even when the emitter's ring has wrapped.
#[derive(Debug, Clone)]
pub struct ParticleBatch {
    pub instances: Vec<ParticleInstance>,
    pub particle_size: Vec2,
    pub color_tint: Vec4,
    pub acceleration: Vec3,
    pub size_flag: i32,
    pub alpha_flag: i32,
}

impl ParticleBatch {
    pub fn from_emitter(emitter: &Emitter) -> Self {
        let mut particles = Vec::new();
        emitter.snapshot_into(&mut particles);
        let config = emitter.config();
        Self {
            instances: particles.iter().map(ParticleInstance::from).collect(),
            particle_size: config.particle_size,
            color_tint: config.color_tint,
            acceleration: config.acceleration,
            size_flag: config.size_modifier.shader_flag(),
            alpha_flag: config.alpha_modifier.shader_flag(),
        }
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Six indices per quad, one quad per living particle.
    pub fn index_count(&self) -> usize {
        self.instances.len() * 6
    }

    /// Raw bytes for a vertex/instance buffer write.
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

/// Index buffer for `capacity` camera-facing quads: two triangles each,
/// `0,1,2, 0,2,3` shifted by four vertices per quad.
pub fn quad_indices(capacity: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(capacity * 6);
    for quad in 0..capacity as u32 {
        let base = quad * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    indices
}
