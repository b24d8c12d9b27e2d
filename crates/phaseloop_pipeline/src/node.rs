//! Execution nodes of a host frame loop.
//!
//! A host loop is a tree of [`PipelineNode`]s. Each node is identified by a
//! [`NodeType`], derived from a marker type the way schedules are identified
//! elsewhere: any `'static` type can serve as a node marker.
//!
//! ```
//! use phaseloop_pipeline::node::{LoopSystem, NodeType, PipelineNode};
//!
//! pub struct AudioFlush;
//! impl LoopSystem for AudioFlush {}
//!
//! let node = PipelineNode::with_update::<AudioFlush>(|| {});
//! assert_eq!(node.node_type(), NodeType::of::<AudioFlush>());
//! ```

use core::any::TypeId;
use core::fmt;
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// NodeType
// ─────────────────────────────────────────────────────────────────────────────

/// Identity of a node in the pipeline tree, derived from a marker type.
///
/// Two nodes share a `NodeType` iff they were created from the same marker
/// type. The splicer uses this identity to find insertion points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeType {
    type_id: TypeId,
    type_name: &'static str,
}

impl NodeType {
    /// Creates a `NodeType` for the given marker type.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the full type name of the marker.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the marker's type name without its module path.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.type_name
            .rsplit("::")
            .next()
            .unwrap_or(self.type_name)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Marker trait for node types.
///
/// The trait carries no methods. [`NodeType::of`] accepts any `'static` type;
/// implementing `LoopSystem` documents that a type is meant as a node marker.
pub trait LoopSystem: 'static {}

// ─────────────────────────────────────────────────────────────────────────────
// UpdateFn
// ─────────────────────────────────────────────────────────────────────────────

/// Function run when the host loop reaches a node.
pub type UpdateFn = Arc<dyn Fn() + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// PipelineNode
// ─────────────────────────────────────────────────────────────────────────────

/// A node in the host's execution tree.
///
/// When the host reaches a node it runs the node's own update function (if
/// any) and then each child in order. A node marked as fixed-step is run as
/// many times per frame as the host's fixed timestep dictates, possibly zero.
#[derive(Clone)]
pub struct PipelineNode {
    node_type: NodeType,
    update: Option<UpdateFn>,
    fixed_step: bool,
    children: Vec<PipelineNode>,
}

impl PipelineNode {
    /// Creates an empty node with no update function and no children.
    #[must_use]
    pub fn new<T: 'static>() -> Self {
        Self::of_type(NodeType::of::<T>())
    }

    /// Creates an empty node for an already-resolved [`NodeType`].
    #[must_use]
    pub fn of_type(node_type: NodeType) -> Self {
        Self {
            node_type,
            update: None,
            fixed_step: false,
            children: Vec::new(),
        }
    }

    /// Creates a leaf node that runs `update` when reached.
    #[must_use]
    pub fn with_update<T: 'static>(update: impl Fn() + Send + Sync + 'static) -> Self {
        Self::new::<T>().update(Arc::new(update))
    }

    /// Sets the node's update function.
    #[must_use]
    pub fn update(mut self, update: UpdateFn) -> Self {
        self.update = Some(update);
        self
    }

    /// Marks the node as a fixed-step subtree.
    #[must_use]
    pub fn fixed_step(mut self) -> Self {
        self.fixed_step = true;
        self
    }

    /// Appends a child node.
    #[must_use]
    pub fn child(mut self, child: PipelineNode) -> Self {
        self.children.push(child);
        self
    }

    /// Appends an empty child node for marker `T`.
    #[must_use]
    pub fn leaf<T: 'static>(self) -> Self {
        self.child(PipelineNode::new::<T>())
    }

    /// Returns the node's identity.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Returns true if the node has an update function.
    #[must_use]
    pub fn has_update(&self) -> bool {
        self.update.is_some()
    }

    /// Returns true if the node is repeated per fixed step.
    #[must_use]
    pub fn is_fixed_step(&self) -> bool {
        self.fixed_step
    }

    /// Returns the node's children in execution order.
    #[must_use]
    pub fn children(&self) -> &[PipelineNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<PipelineNode> {
        &mut self.children
    }

    /// Finds the first node of the given type, depth-first, including `self`.
    #[must_use]
    pub fn find(&self, node_type: NodeType) -> Option<&PipelineNode> {
        if self.node_type == node_type {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(node_type))
    }

    /// Returns the total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(PipelineNode::node_count).sum::<usize>()
    }

    /// Runs this subtree once: own update first, then each child.
    ///
    /// Fixed-step children are run `fixed_steps` times.
    pub(crate) fn run(&self, fixed_steps: u32) {
        if let Some(update) = &self.update {
            update();
        }
        for child in &self.children {
            let repeat = if child.fixed_step { fixed_steps } else { 1 };
            for _ in 0..repeat {
                child.run(fixed_steps);
            }
        }
    }

    pub(crate) fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            f.write_str("\t")?;
        }
        writeln!(f, "{}", self.node_type)?;
        for child in &self.children {
            child.write_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PipelineNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineNode")
            .field("node_type", &self.node_type.short_name())
            .field("has_update", &self.update.is_some())
            .field("fixed_step", &self.fixed_step)
            .field("children", &self.children)
            .finish()
    }
}
