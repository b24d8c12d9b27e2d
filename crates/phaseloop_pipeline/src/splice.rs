//! One-time structural insertion into a host loop tree.
//!
//! A splice finds the first node of a target [`NodeType`] (depth-first,
//! pre-order, across every subtree) and inserts a new child there. Existing
//! children keep their relative order.
//!
//! Batches are not transactional: [`splice_all`] reports each request on its
//! own, and a request that cannot find its target does not undo the ones that
//! already succeeded.

use crate::node::{NodeType, PipelineNode};

/// Where a spliced node lands among the target's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertPosition {
    /// Before all existing children.
    #[default]
    First,
    /// After all existing children.
    Last,
    /// At the given child index, clamped to the child count.
    At(usize),
}

impl InsertPosition {
    fn resolve(self, len: usize) -> usize {
        match self {
            InsertPosition::First => 0,
            InsertPosition::Last => len,
            InsertPosition::At(index) => index.min(len),
        }
    }
}

/// Errors that can occur while splicing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpliceError {
    /// No node of the target type exists anywhere in the tree.
    #[error("splice target '{target}' not found in pipeline")]
    TargetNotFound {
        /// Type name of the missing target.
        target: &'static str,
    },
}

/// A single insertion to perform.
#[derive(Debug)]
pub struct SpliceRequest {
    /// Type of the node to insert under.
    pub target: NodeType,
    /// The node to insert.
    pub node: PipelineNode,
    /// Position among the target's children.
    pub position: InsertPosition,
}

impl SpliceRequest {
    /// Creates a request inserting `node` first under `target`.
    #[must_use]
    pub fn new(target: NodeType, node: PipelineNode) -> Self {
        Self {
            target,
            node,
            position: InsertPosition::First,
        }
    }

    /// Sets the insert position.
    #[must_use]
    pub fn at(mut self, position: InsertPosition) -> Self {
        self.position = position;
        self
    }
}

/// Inserts `node` under the first node of type `target`.
///
/// # Errors
///
/// Returns [`SpliceError::TargetNotFound`] if no node in `tree` has type
/// `target`. The tree is unchanged in that case.
pub fn splice(
    tree: &mut PipelineNode,
    target: NodeType,
    node: PipelineNode,
    position: InsertPosition,
) -> Result<(), SpliceError> {
    let Some(found) = find_mut(tree, target) else {
        return Err(SpliceError::TargetNotFound {
            target: target.type_name(),
        });
    };

    let children = found.children_mut();
    let index = position.resolve(children.len());
    tracing::trace!(
        target_node = target.short_name(),
        inserted = node.node_type().short_name(),
        index,
        "spliced node into pipeline"
    );
    children.insert(index, node);
    Ok(())
}

/// Applies each request in order, returning one result per request.
pub fn splice_all(
    tree: &mut PipelineNode,
    requests: impl IntoIterator<Item = SpliceRequest>,
) -> Vec<Result<(), SpliceError>> {
    requests
        .into_iter()
        .map(|request| splice(tree, request.target, request.node, request.position))
        .collect()
}

fn find_mut(node: &mut PipelineNode, target: NodeType) -> Option<&mut PipelineNode> {
    if node.node_type() == target {
        return Some(node);
    }
    node.children_mut()
        .iter_mut()
        .find_map(|child| find_mut(child, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Root;
    struct Stage;
    struct Inner;
    struct Existing;
    struct Injected;
    struct Missing;

    fn child_types(node: &PipelineNode) -> Vec<NodeType> {
        node.children().iter().map(PipelineNode::node_type).collect()
    }

    #[test]
    fn insert_position_resolution() {
        assert_eq!(InsertPosition::First.resolve(3), 0);
        assert_eq!(InsertPosition::Last.resolve(3), 3);
        assert_eq!(InsertPosition::At(1).resolve(3), 1);
        assert_eq!(InsertPosition::At(10).resolve(3), 3);
    }

    #[test]
    fn splice_first_prepends_child() {
        let mut tree = PipelineNode::new::<Root>()
            .child(PipelineNode::new::<Stage>().leaf::<Existing>());

        splice(
            &mut tree,
            NodeType::of::<Stage>(),
            PipelineNode::new::<Injected>(),
            InsertPosition::First,
        )
        .expect("stage exists");

        let stage = tree.find(NodeType::of::<Stage>()).unwrap();
        assert_eq!(
            child_types(stage),
            vec![NodeType::of::<Injected>(), NodeType::of::<Existing>()]
        );
    }

    #[test]
    fn splice_last_appends_child() {
        let mut tree = PipelineNode::new::<Root>()
            .child(PipelineNode::new::<Stage>().leaf::<Existing>());

        splice(
            &mut tree,
            NodeType::of::<Stage>(),
            PipelineNode::new::<Injected>(),
            InsertPosition::Last,
        )
        .unwrap();

        let stage = tree.find(NodeType::of::<Stage>()).unwrap();
        assert_eq!(
            child_types(stage),
            vec![NodeType::of::<Existing>(), NodeType::of::<Injected>()]
        );
    }

    #[test]
    fn splice_reaches_nested_targets() {
        let mut tree = PipelineNode::new::<Root>()
            .child(PipelineNode::new::<Stage>().child(PipelineNode::new::<Inner>()));

        splice(
            &mut tree,
            NodeType::of::<Inner>(),
            PipelineNode::new::<Injected>(),
            InsertPosition::First,
        )
        .unwrap();

        let inner = tree.find(NodeType::of::<Inner>()).unwrap();
        assert_eq!(child_types(inner), vec![NodeType::of::<Injected>()]);
    }

    #[test]
    fn splice_missing_target_leaves_tree_untouched() {
        let mut tree = PipelineNode::new::<Root>().leaf::<Stage>();
        let before = tree.node_count();

        let err = splice(
            &mut tree,
            NodeType::of::<Missing>(),
            PipelineNode::new::<Injected>(),
            InsertPosition::First,
        )
        .unwrap_err();

        assert!(matches!(err, SpliceError::TargetNotFound { target } if target.ends_with("Missing")));
        assert_eq!(tree.node_count(), before);
    }

    #[test]
    fn splice_all_reports_each_request() {
        let mut tree = PipelineNode::new::<Root>().leaf::<Stage>();

        let results = splice_all(
            &mut tree,
            [
                SpliceRequest::new(NodeType::of::<Missing>(), PipelineNode::new::<Injected>()),
                SpliceRequest::new(NodeType::of::<Stage>(), PipelineNode::new::<Injected>()),
            ],
        );

        assert!(results[0].is_err());
        assert!(results[1].is_ok(), "a failed request must not block later ones");
        assert!(tree.find(NodeType::of::<Injected>()).is_some());
    }
}
