//! Developer Tooling: world inspector and entity queries.
//!
//! # Invariants
//! - Inspection never changes world truth; only lazy caches may refresh.

pub mod inspector;

pub use inspector::{EntityInfo, WorldInspector, WorldSummary};

pub fn crate_info() -> &'static str {
    "marbleworks-tools v0.1.0"
}
