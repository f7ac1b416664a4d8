//! Narrow interfaces to the host's scene graph.
//!
//! The engine never owns live widget nodes. It walks them through
//! [`WidgetTree`], remembers enough to put reparented nodes back
//! (original parent + sibling index), and performs the actual moves
//! through [`SceneOps`]. Both traits are implemented by the host.

/// Opaque handle to a live scene-graph node, minted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Read-only view of a widget subtree.
pub trait WidgetTree {
    /// Children of `node` in sibling (draw) order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// The logical widget identifier attached to `node`, if any.
    /// Nodes without an identifier are skipped during indexing.
    fn widget_id(&self, node: NodeId) -> Option<String>;
}

/// Mutating sibling-order primitives, used to raise highlight targets
/// onto an overlay layer and restore them afterwards.
pub trait SceneOps {
    /// Detach `node` from its current parent and insert it under
    /// `parent` at sibling position `index`.
    fn reparent(&mut self, node: NodeId, parent: NodeId, index: usize);
}
