//! Splicing tests against realistic loop trees.
//!
//! Tests covering deep targets, partial batches, frame execution after a
//! splice, and (via `proptest`) that insertion never disturbs siblings.

use phaseloop_pipeline::host;
use phaseloop_pipeline::{
    InsertPosition, NodeType, PipelineNode, PlayerLoop, SpliceError, SpliceRequest,
};
use std::sync::{Arc, Mutex};

struct Injected;
struct Other;
struct Deep;

fn recording(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> PipelineNode {
    let log = Arc::clone(log);
    PipelineNode::with_update::<Injected>(move || log.lock().unwrap().push(name))
}

// ═══════════════════════════════════════════════════════════════════════════════
// TARGETING
// ═══════════════════════════════════════════════════════════════════════════════

/// Verifies that a target nested several levels down is found.
#[test]
fn splice_finds_nested_target() {
    let mut player_loop = PlayerLoop::new(
        PipelineNode::new::<host::PlayerLoopRoot>().child(
            PipelineNode::new::<host::Update>()
                .child(PipelineNode::new::<Other>().child(PipelineNode::new::<Deep>())),
        ),
    );

    player_loop
        .splice(
            NodeType::of::<Deep>(),
            PipelineNode::new::<Injected>(),
            InsertPosition::Last,
        )
        .unwrap();

    let deep = player_loop.find(NodeType::of::<Deep>()).unwrap();
    assert_eq!(deep.children().len(), 1);
    assert_eq!(deep.children()[0].node_type(), NodeType::of::<Injected>());
}

/// Verifies that one missing target fails alone in a batch.
#[test]
fn splice_all_reports_per_request() {
    let mut player_loop = PlayerLoop::default_loop();
    let before = player_loop.root().node_count();

    let results = player_loop.splice_all([
        SpliceRequest::new(NodeType::of::<host::Update>(), PipelineNode::new::<Injected>()),
        SpliceRequest::new(NodeType::of::<Deep>(), PipelineNode::new::<Injected>()),
        SpliceRequest::new(NodeType::of::<host::PreUpdate>(), PipelineNode::new::<Injected>())
            .at(InsertPosition::At(1)),
    ]);

    assert!(results[0].is_ok());
    assert!(matches!(
        &results[1],
        Err(SpliceError::TargetNotFound { target }) if target.ends_with("Deep")
    ));
    assert!(results[2].is_ok());
    assert_eq!(player_loop.root().node_count(), before + 2);
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXECUTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Verifies that spliced nodes run where they were placed, and fixed-step
/// placements repeat per step.
#[test]
fn spliced_nodes_run_in_tree_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut player_loop = PlayerLoop::default_loop();

    player_loop
        .splice(NodeType::of::<Deep>(), recording(&log, "never"), InsertPosition::First)
        .unwrap_err();
    player_loop
        .splice(NodeType::of::<host::PostLateUpdate>(), recording(&log, "end"), InsertPosition::Last)
        .unwrap();
    player_loop
        .splice(NodeType::of::<host::FixedUpdate>(), recording(&log, "fixed"), InsertPosition::First)
        .unwrap();
    player_loop
        .splice(NodeType::of::<host::Initialization>(), recording(&log, "init"), InsertPosition::First)
        .unwrap();

    player_loop.run_frame(2);

    assert_eq!(*log.lock().unwrap(), vec!["init", "fixed", "fixed", "end"]);
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    struct Child;

    fn arb_position() -> impl Strategy<Value = InsertPosition> {
        prop_oneof![
            Just(InsertPosition::First),
            Just(InsertPosition::Last),
            (0..16usize).prop_map(InsertPosition::At),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Inserting under a node keeps its existing children in order and
        /// lands at the clamped position.
        #[test]
        fn prop_splice_preserves_siblings(children in 0..10usize, position in arb_position()) {
            let mut target = PipelineNode::new::<host::Update>();
            for _ in 0..children {
                target = target.leaf::<Child>();
            }
            let mut player_loop = PlayerLoop::new(
                PipelineNode::new::<host::PlayerLoopRoot>().child(target),
            );

            player_loop
                .splice(NodeType::of::<host::Update>(), PipelineNode::new::<Injected>(), position)
                .unwrap();

            let update = player_loop.find(NodeType::of::<host::Update>()).unwrap();
            let kinds: Vec<NodeType> = update.children().iter().map(PipelineNode::node_type).collect();
            let expected_index = match position {
                InsertPosition::First => 0,
                InsertPosition::Last => children,
                InsertPosition::At(index) => index.min(children),
            };

            prop_assert_eq!(kinds.len(), children + 1);
            prop_assert_eq!(kinds[expected_index], NodeType::of::<Injected>());
            prop_assert!(
                kinds
                    .iter()
                    .enumerate()
                    .all(|(i, kind)| i == expected_index || *kind == NodeType::of::<Child>())
            );
        }
    }
}
