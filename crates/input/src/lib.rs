//! Input Mapping: raw key states mapped to high-level actions.
//!
//! # Invariants
//! - Game logic consumes actions, never raw key codes.
//! - Held keys produce one action per frame; unbound keys produce nothing.

pub mod action;

pub use action::{Action, InputMap, Key};

pub fn crate_info() -> &'static str {
    "marbleworks-input v0.1.0"
}
