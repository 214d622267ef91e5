//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate world truth; the `&mut World` in the trait
//!   exists only so lazy transform caches can refresh during a read.
//! - Particle uploads are contiguous, in spawn order, with `living * 6`
//!   quad indices.

pub mod camera;
pub mod renderer;
pub mod upload;

pub use camera::OrbitCamera;
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use upload::{quad_indices, ParticleBatch, ParticleInstance};

pub fn crate_info() -> &'static str {
    "marbleworks-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
