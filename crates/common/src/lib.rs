//! Shared ids and math helpers used across the marbleworks crates.
//!
//! # Invariants
//! - Ids are `Ord` so BTreeMap-keyed storage iterates deterministically.
//! - Euler/quaternion conversions agree with the scene graph's
//!   scale-rotation-translation composition order.

pub mod math;
pub mod types;

pub use types::{EntityId, NodeId};
