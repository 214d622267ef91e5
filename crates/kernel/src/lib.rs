//! World Kernel: owns the entities, the transform graph, and the per-frame
//! simulation step.
//!
//! # Invariants
//! - Single-threaded, frame-stepped; `step(dt)` always runs to completion in
//!   time proportional to total particle capacity.
//! - Entities are plain owned data keyed by id, not an ECS registry.
//! - The kernel drives emitters; it never calls into physics; simulated
//!   poses are written back through the scene graph by the physics layer.

pub mod world;

pub use world::{EntityData, World, WorldError};
