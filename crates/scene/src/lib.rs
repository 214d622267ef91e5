//! Scene Graph: hierarchical transforms with cached world matrices.
//!
//! # Invariants
//! - A node's cached world matrix is valid whenever its dirty flag is clear.
//! - Mutation marks the node and every descendant dirty immediately;
//!   recomputation is deferred to the next matrix read.
//! - Hierarchy edits preserve the edited node's world pose.
//! - Parent/child links are ids, never references; the graph owns all nodes.

pub mod graph;

pub use graph::TransformGraph;

pub fn crate_info() -> &'static str {
    "marbleworks-scene v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("scene"));
    }
}
