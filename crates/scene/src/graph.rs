use glam::{Mat4, Quat, Vec3};
use marbleworks_common::math::{quat_from_euler, quat_to_euler};
use marbleworks_common::NodeId;
use std::collections::BTreeMap;

/// A single node in the transform graph.
///
/// Local pose is stored as position + Euler angles (pitch, yaw, roll in
/// radians) + scale. The world matrix and its inverse transpose are cached
/// and only recomputed when the dirty flag is set.
#[derive(Debug, Clone)]
struct TransformNode {
    position: Vec3,
    euler: Vec3,
    scale: Vec3,
    world: Mat4,
    world_inverse_transpose: Mat4,
    dirty: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Default for TransformNode {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            euler: Vec3::ZERO,
            scale: Vec3::ONE,
            world: Mat4::IDENTITY,
            world_inverse_transpose: Mat4::IDENTITY,
            dirty: false,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Hierarchical pose cache for every transform in the scene.
///
/// The graph owns the nodes; entities and cameras hold [`NodeId`]s. All
/// operations on unknown ids are no-ops returning `false`/`None`; hierarchy
/// misuse is defined, not an error.
///
/// Uses BTreeMap for deterministic iteration order across all platforms.
#[derive(Debug, Clone, Default)]
pub struct TransformGraph {
    nodes: BTreeMap<NodeId, TransformNode>,
}

impl TransformGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new root node with the identity transform. Returns its id.
    pub fn insert(&mut self) -> NodeId {
        let id = NodeId::new();
        self.nodes.insert(id, TransformNode::default());
        id
    }

    /// Remove a node, detaching it from its parent and detaching each of its
    /// children with their world poses preserved. The children become roots.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if !self.nodes.contains_key(&id) {
            return false;
        }

        let children: Vec<NodeId> = self.children_of(id).to_vec();
        for child in children {
            self.remove_child(id, child);
        }
        if let Some(parent) = self.parent_of(id) {
            self.remove_child(parent, id);
        }

        tracing::debug!(?id, "removed transform node");
        self.nodes.remove(&id).is_some()
    }

    /// Whether the graph contains a node with this id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // --- Local pose mutators ---
    //
    // Every mutator marks the node and all of its descendants dirty, even if
    // they were already dirty. Recomputation happens at the next matrix read.

    /// Overwrite the local position.
    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.position = position;
        self.mark_subtree_dirty(id);
        true
    }

    /// Overwrite the local Euler rotation (pitch, yaw, roll in radians).
    pub fn set_rotation(&mut self, id: NodeId, euler: Vec3) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.euler = euler;
        self.mark_subtree_dirty(id);
        true
    }

    /// Overwrite the rotation from a quaternion, converting to Euler storage.
    pub fn set_rotation_quat(&mut self, id: NodeId, rotation: Quat) -> bool {
        self.set_rotation(id, quat_to_euler(rotation))
    }

    /// Overwrite the local scale.
    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.scale = scale;
        self.mark_subtree_dirty(id);
        true
    }

    /// Translate along the world axes.
    pub fn move_absolute(&mut self, id: NodeId, delta: Vec3) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.position += delta;
        self.mark_subtree_dirty(id);
        true
    }

    /// Translate along the node's own axes: the delta is rotated by the
    /// node's orientation before being added.
    pub fn move_relative(&mut self, id: NodeId, delta: Vec3) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.position += quat_from_euler(node.euler) * delta;
        self.mark_subtree_dirty(id);
        true
    }

    /// Add to the Euler angles.
    pub fn rotate(&mut self, id: NodeId, delta: Vec3) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.euler += delta;
        self.mark_subtree_dirty(id);
        true
    }

    /// Multiply into the scale, component-wise.
    pub fn scale_by(&mut self, id: NodeId, factor: Vec3) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.scale *= factor;
        self.mark_subtree_dirty(id);
        true
    }

    /// Overwrite the local TRS from a decomposed matrix.
    ///
    /// Decomposes into scale, rotation quaternion, and translation; the
    /// quaternion is stored as Euler angles (gimbal-lock-prone near ±90°
    /// pitch, an accepted limit of the representation).
    pub fn set_from_matrix(&mut self, id: NodeId, matrix: Mat4) -> bool {
        if !self.nodes.contains_key(&id) {
            return false;
        }
        self.apply_matrix_to_local(id, matrix);
        self.mark_subtree_dirty(id);
        true
    }

    // --- Local pose getters ---

    pub fn position(&self, id: NodeId) -> Option<Vec3> {
        self.nodes.get(&id).map(|n| n.position)
    }

    /// Pitch, yaw, roll in radians.
    pub fn rotation(&self, id: NodeId) -> Option<Vec3> {
        self.nodes.get(&id).map(|n| n.euler)
    }

    pub fn scale(&self, id: NodeId) -> Option<Vec3> {
        self.nodes.get(&id).map(|n| n.scale)
    }

    /// Whether the node's cached matrices are stale. Inspection/test hook.
    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.dirty)
    }

    // --- Cached matrices ---

    /// World matrix for the node, recomputing first if dirty.
    pub fn world_matrix(&mut self, id: NodeId) -> Option<Mat4> {
        self.update_matrices(id)?;
        self.nodes.get(&id).map(|n| n.world)
    }

    /// Inverse transpose of the world matrix, recomputing first if dirty.
    ///
    /// Genuinely distinct from [`Self::world_matrix`]: for any transform with
    /// non-uniform scale and a rotation the two differ.
    pub fn world_inverse_transpose(&mut self, id: NodeId) -> Option<Mat4> {
        self.update_matrices(id)?;
        self.nodes.get(&id).map(|n| n.world_inverse_transpose)
    }

    // --- Hierarchy ---

    /// Attach `child` under `parent`, preserving the child's world pose.
    ///
    /// No-op if either id is unknown, the link already exists, or the edit
    /// would create a cycle. A child with an existing parent is detached
    /// from it first.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if parent == child || !self.contains(parent) || !self.contains(child) {
            return false;
        }
        if self.index_of_child(parent, child).is_some() {
            return false;
        }
        if self.is_ancestor(child, parent) {
            tracing::debug!(?parent, ?child, "attach rejected: would create a cycle");
            return false;
        }

        if let Some(old_parent) = self.parent_of(child) {
            self.remove_child(old_parent, child);
        }

        // Rebase the child's local TRS so that
        // parent_world * new_local == old child_world.
        let Some(parent_world) = self.world_matrix(parent) else {
            return false;
        };
        let Some(child_world) = self.world_matrix(child) else {
            return false;
        };
        let relative = parent_world.inverse() * child_world;
        self.apply_matrix_to_local(child, relative);

        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
        self.mark_subtree_dirty(child);

        tracing::debug!(?parent, ?child, "attached child");
        true
    }

    /// Detach `child` from `parent`, baking its world pose into its local
    /// TRS so the pose is unchanged by the detach. No-op if not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(index) = self.index_of_child(parent, child) else {
            return false;
        };
        let Some(child_world) = self.world_matrix(child) else {
            return false;
        };
        self.apply_matrix_to_local(child, child_world);

        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.remove(index);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = None;
        }
        self.mark_subtree_dirty(child);

        tracing::debug!(?parent, ?child, "detached child");
        true
    }

    /// Reparent from the child's perspective. `None` detaches to the world
    /// frame. World pose is preserved either way.
    pub fn set_parent(&mut self, child: NodeId, new_parent: Option<NodeId>) -> bool {
        match new_parent {
            Some(parent) => {
                if self.parent_of(child) == Some(parent) {
                    return true;
                }
                self.add_child(parent, child)
            }
            None => match self.parent_of(child) {
                Some(old_parent) => self.remove_child(old_parent, child),
                None => self.contains(child),
            },
        }
    }

    /// The node's parent, if it has one.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Ordered child list (empty for unknown ids).
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Position of `child` in the parent's child list, or `None`.
    pub fn index_of_child(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children_of(parent).iter().position(|c| *c == child)
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children_of(parent).get(index).copied()
    }

    pub fn child_count(&self, parent: NodeId) -> usize {
        self.children_of(parent).len()
    }

    // --- Internals ---

    /// Mark a node and all of its descendants dirty. Iterative so deep
    /// hierarchies cannot overflow the stack.
    fn mark_subtree_dirty(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(&current) {
                node.dirty = true;
                stack.extend(node.children.iter().copied());
            }
        }
    }

    /// Whether `candidate` appears on the parent chain of `node`.
    fn is_ancestor(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut current = self.parent_of(node);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    /// Recompute the cached matrices if dirty, recursing to the parent first.
    fn update_matrices(&mut self, id: NodeId) -> Option<()> {
        let (dirty, parent) = {
            let node = self.nodes.get(&id)?;
            (node.dirty, node.parent)
        };
        if !dirty {
            return Some(());
        }

        let parent_world = match parent {
            Some(p) => self.world_matrix(p)?,
            None => Mat4::IDENTITY,
        };

        let node = self.nodes.get_mut(&id)?;
        let local = Mat4::from_scale_rotation_translation(
            node.scale,
            quat_from_euler(node.euler),
            node.position,
        );
        let world = parent_world * local;
        node.world = world;
        node.world_inverse_transpose = world.inverse().transpose();
        node.dirty = false;
        Some(())
    }

    /// Decompose a matrix into the node's local TRS. Callers are responsible
    /// for dirtying the subtree afterwards.
    fn apply_matrix_to_local(&mut self, id: NodeId, matrix: Mat4) {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = translation;
            node.euler = quat_to_euler(rotation);
            node.scale = scale;
        }
    }
}
