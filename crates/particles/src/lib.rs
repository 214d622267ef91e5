//! Particle Emitters: CPU-simulated particles in a fixed-capacity ring buffer.
//!
//! # Invariants
//! - `0 <= living_count <= capacity` for every sequence of updates.
//! - Retirement is strictly FIFO from the head cursor; spawning only writes
//!   the tail cursor. A full buffer drops spawn requests silently.
//! - Snapshots are contiguous and in spawn order regardless of wraparound.
//! - Emission is deterministic for a given seed.

pub mod emitter;
pub mod rng;

pub use emitter::{
    AlphaModifier, Emitter, EmitterConfig, EmitterError, EmitterShape, Particle, SizeModifier,
};
pub use rng::SpawnRng;

pub fn crate_info() -> &'static str {
    "marbleworks-particles v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("particles"));
    }
}
