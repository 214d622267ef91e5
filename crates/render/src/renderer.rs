use glam::Vec3;
use marbleworks_kernel::World;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, 10.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The world reference is mutable only because reading a world matrix may
/// refresh a lazy cache; renderers must not change world truth.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given world state and view.
    fn render(&self, world: &mut World, view: &RenderView) -> Self::Output;
}

/// Debug text renderer: a GPU-free backend for CLI output, logging, and
/// testing the render interface. Produces a human-readable dump of the
/// world state.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, world: &mut World, view: &RenderView) -> String {
        let _span = tracing::trace_span!("debug_render", tick = world.tick()).entered();
        let mut out = String::new();
        out.push_str(&format!(
            "=== World State (tick={}, t={:.2}s) ===\n",
            world.tick(),
            world.sim_time()
        ));
        out.push_str(&format!(
            "Entities: {}  Emitters: {}  Live particles: {}\n",
            world.entity_count(),
            world.emitter_count(),
            world.live_particle_count()
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));

        let ids: Vec<_> = world.entities().keys().copied().collect();
        for id in ids {
            let Some(data) = world.get(id) else { continue };
            let name = data.name.clone();
            let node = data.node;
            let living = world.emitter(id).map(|e| e.living_count());
            let Some(matrix) = world.scene_mut().world_matrix(node) else {
                continue;
            };
            let (_, _, p) = matrix.to_scale_rotation_translation();
            out.push_str(&format!(
                "  [{:.8}] {} pos=({:.2}, {:.2}, {:.2})",
                &id.0.to_string()[..8],
                name,
                p.x,
                p.y,
                p.z
            ));
            if let Some(living) = living {
                out.push_str(&format!(" particles={living}"));
            }
            out.push('\n');
        }

        out
    }
}
