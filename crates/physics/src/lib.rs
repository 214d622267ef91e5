//! Physics Integration: rapier3d plumbing for the rolling-marble mini-game.
//!
//! # Invariants
//! - The solver is an external collaborator; this crate only wires bodies up
//!   and copies simulated poses back into the scene graph.
//! - Pose write-back goes through `set_position`/`set_rotation_quat` once per
//!   step; nothing here reads scene state back into the solver.

pub mod marble;
pub mod simulator;

pub use marble::Marble;
pub use simulator::PhysicsWorld;

pub fn crate_info() -> &'static str {
    "marbleworks-physics v0.1.0"
}
