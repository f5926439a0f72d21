//! Graph Store Behavioral Tests - BDD Style
//!
//! Following BDD naming convention: given_<context>_when_<action>_then_<outcome>

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use dagsmith_core::{
    DagError, DagResult, EdgeId, GraphStore, LayoutConfig, NodeId, Position, RankDirection,
    Violation, validate,
};

fn store_with(labels: &[&str]) -> (GraphStore, Vec<NodeId>) {
    let mut store = GraphStore::new();
    let ids = labels
        .iter()
        .map(|label| store.add_node_at(*label, Position::origin()))
        .collect();
    (store, ids)
}

fn node(ids: &[NodeId], index: usize) -> DagResult<NodeId> {
    ids.get(index)
        .cloned()
        .ok_or_else(|| DagError::node_not_found(format!("#{index}")))
}

fn has_path(store: &GraphStore, from: &NodeId, to: &NodeId) -> bool {
    let mut stack = vec![from.clone()];
    let mut seen = std::collections::HashSet::new();
    while let Some(current) = stack.pop() {
        if &current == to {
            return true;
        }
        if seen.insert(current.clone()) {
            stack.extend(
                store
                    .edges()
                    .filter(|edge| edge.source == current)
                    .map(|edge| edge.target.clone()),
            );
        }
    }
    false
}

// ============================================================================
// EDGE GATE
// ============================================================================

#[test]
fn given_edge_exists_when_added_again_then_duplicate_rejected_and_graph_unchanged() -> DagResult<()>
{
    // GIVEN: a -> b
    let (mut store, ids) = store_with(&["A", "B"]);
    let (a, b) = (node(&ids, 0)?, node(&ids, 1)?);
    store.add_edge(a.clone(), b.clone())?;
    let before = store.snapshot();

    // WHEN: a -> b is added again
    let result = store.add_edge(a.clone(), b.clone());

    // THEN: rejected as a duplicate, nothing changed
    assert_eq!(result, Err(DagError::EdgeAlreadyExists(a, b)));
    assert_eq!(store.snapshot(), before);
    Ok(())
}

#[test]
fn given_any_graph_when_self_loop_added_then_rejected() -> DagResult<()> {
    // GIVEN: a small connected graph
    let (mut store, ids) = store_with(&["A", "B", "C"]);
    store.add_edge(node(&ids, 0)?, node(&ids, 1)?)?;
    store.add_edge(node(&ids, 1)?, node(&ids, 2)?)?;

    // WHEN / THEN: every node refuses a self-loop
    for id in &ids {
        let result = store.add_edge(id.clone(), id.clone());
        assert_eq!(result, Err(DagError::SelfLoopDetected(id.clone())));
    }
    assert_eq!(store.edge_count(), 2);
    Ok(())
}

#[test]
fn given_chain_when_closing_edge_added_then_cycle_rejected_and_two_edges_remain() -> DagResult<()>
{
    // GIVEN: n0 -> n1 -> n2
    let (mut store, ids) = store_with(&["n0", "n1", "n2"]);
    let (n0, n1, n2) = (node(&ids, 0)?, node(&ids, 1)?, node(&ids, 2)?);
    store.add_edge(n0.clone(), n1.clone())?;
    store.add_edge(n1.clone(), n2.clone())?;

    // WHEN: n2 -> n0 is attempted
    let result = store.add_edge(n2.clone(), n0.clone());

    // THEN: rejected with the closing path, exactly 2 edges remain
    assert_eq!(
        result,
        Err(DagError::CycleDetected(vec![
            n2.clone(),
            n0,
            n1,
            n2
        ]))
    );
    assert_eq!(store.edge_count(), 2);
    Ok(())
}

#[test]
fn given_edge_when_reciprocal_added_then_cycle_rejected() -> DagResult<()> {
    // GIVEN: a -> b
    let (mut store, ids) = store_with(&["A", "B"]);
    let (a, b) = (node(&ids, 0)?, node(&ids, 1)?);
    store.add_edge(a.clone(), b.clone())?;

    // WHEN: b -> a is attempted
    let result = store.add_edge(b, a);

    // THEN: it would form a 2-cycle
    assert!(matches!(result, Err(DagError::CycleDetected(_))));
    assert_eq!(store.edge_count(), 1);
    Ok(())
}

#[test]
fn given_missing_endpoint_when_edge_added_then_rejected_as_missing() -> DagResult<()> {
    // GIVEN: one real node
    let (mut store, ids) = store_with(&["A"]);
    let ghost = NodeId::new("node_99");

    // WHEN: connecting to a node that does not exist
    let result = store.add_edge(node(&ids, 0)?, ghost.clone());

    // THEN: rejected, with the missing id reported
    assert_eq!(result, Err(DagError::NodeNotFound(ghost)));
    let code = result.err().map(|e| e.rejection_code());
    assert_eq!(code, Some("missing_endpoint"));
    Ok(())
}

#[test]
fn given_dense_dag_when_every_edge_attempted_then_no_edge_has_return_path() -> DagResult<()> {
    // GIVEN: six nodes
    let (mut store, ids) = store_with(&["a", "b", "c", "d", "e", "f"]);

    // WHEN: every ordered pair is attempted, in both directions
    for source in &ids {
        for target in &ids {
            let _ = store.add_edge(source.clone(), target.clone());
        }
    }

    // THEN: for every a -> b there is no path b -> ... -> a
    assert!(store.edge_count() > 0);
    for edge in store.edges() {
        assert!(
            !has_path(&store, &edge.target, &edge.source),
            "edge {} has a return path",
            edge.id
        );
    }
    Ok(())
}

// ============================================================================
// REMOVAL
// ============================================================================

#[test]
fn given_hub_node_when_removed_then_no_surviving_edge_touches_it() -> DagResult<()> {
    // GIVEN: hub with fan-in and fan-out
    let (mut store, ids) = store_with(&["in1", "in2", "hub", "out1", "out2"]);
    let hub = node(&ids, 2)?;
    store.add_edge(node(&ids, 0)?, hub.clone())?;
    store.add_edge(node(&ids, 1)?, hub.clone())?;
    store.add_edge(hub.clone(), node(&ids, 3)?)?;
    store.add_edge(hub.clone(), node(&ids, 4)?)?;
    store.add_edge(node(&ids, 0)?, node(&ids, 3)?)?;

    // WHEN: the hub is removed
    let removed = store.remove_node(&hub);

    // THEN: cascade leaves only the unrelated edge
    assert!(removed.is_some());
    assert!(store.edges().all(|edge| !edge.touches(&hub)));
    assert_eq!(store.edge_count(), 1);
    Ok(())
}

#[test]
fn given_selection_of_node_only_when_bulk_removed_then_incident_edges_go_too() -> DagResult<()> {
    // GIVEN: a -> b -> c with only b selected
    let (mut store, ids) = store_with(&["A", "B", "C"]);
    store.add_edge(node(&ids, 0)?, node(&ids, 1)?)?;
    store.add_edge(node(&ids, 1)?, node(&ids, 2)?)?;
    let selected = [node(&ids, 1)?];

    // WHEN: bulk removal with no edges listed
    let removed = store.remove_selected(&selected, &Vec::<EdgeId>::new());

    // THEN: both incident edges were deleted as well
    assert_eq!((removed.nodes, removed.edges), (1, 2));
    assert_eq!(store.edge_count(), 0);
    Ok(())
}

#[test]
fn given_absent_ids_when_mutated_then_silently_ignored() {
    // GIVEN: an empty store
    let mut store = GraphStore::new();
    let ghost = NodeId::new("ghost");

    // WHEN / THEN: nothing happens and nothing fails
    assert!(store.remove_node(&ghost).is_none());
    assert!(!store.update_note(&ghost, "text"));
    assert!(!store.reposition_node(&ghost, 10.0, 10.0));
    assert!(store.remove_edge(&EdgeId::new("edge-a-b")).is_none());
    assert_eq!(store.node_count(), 0);
}

// ============================================================================
// VALIDATION
// ============================================================================

#[test]
fn given_two_isolated_nodes_when_connected_then_verdict_turns_valid() -> DagResult<()> {
    // GIVEN: n0, n1 without edges
    let (mut store, ids) = store_with(&["n0", "n1"]);
    let before = store.validate(2);
    assert!(!before.is_valid());
    assert_eq!(
        before.violations(),
        &[
            Violation::NotConnected {
                node: "n0".to_string()
            },
            Violation::NotConnected {
                node: "n1".to_string()
            },
        ]
    );

    // WHEN: n0 -> n1 is added
    store.add_edge(node(&ids, 0)?, node(&ids, 1)?)?;

    // THEN: valid with no reasons
    let after = store.validate(2);
    assert!(after.is_valid());
    assert!(after.reasons().is_empty());
    Ok(())
}

#[test]
fn given_removed_middle_node_when_validated_then_survivors_not_connected() -> DagResult<()> {
    // GIVEN: a -> b -> c, valid
    let (mut store, ids) = store_with(&["A", "B", "C"]);
    store.add_edge(node(&ids, 0)?, node(&ids, 1)?)?;
    store.add_edge(node(&ids, 1)?, node(&ids, 2)?)?;
    assert!(store.validate(2).is_valid());

    // WHEN: b is removed
    store.remove_node(&node(&ids, 1)?);

    // THEN: no cycle check involved, yet the graph is now invalid
    let report = validate(store.nodes(), store.edges());
    assert_eq!(
        report.reasons(),
        vec!["Node \"A\" is not connected.", "Node \"C\" is not connected."]
    );
    Ok(())
}

// ============================================================================
// LAYOUT
// ============================================================================

#[test]
fn given_three_unconnected_nodes_when_laid_out_then_chain_ranks_increase_along_axis() -> DagResult<()>
{
    // GIVEN: n0, n1, n2 with no edges
    let (mut store, ids) = store_with(&["n0", "n1", "n2"]);

    for direction in [RankDirection::LeftRight, RankDirection::TopBottom] {
        // WHEN: laid out
        let result = store.auto_layout(&LayoutConfig::default().with_direction(direction));

        // THEN: ranks 0, 1, 2 strictly increase along the rank axis
        let ranks: Vec<Option<usize>> = ids.iter().map(|id| result.rank_of(id)).collect();
        assert_eq!(ranks, vec![Some(0), Some(1), Some(2)]);

        let axis: Vec<f64> = ids
            .iter()
            .filter_map(|id| store.node(id))
            .map(|n| {
                if direction.is_horizontal() {
                    n.position.x
                } else {
                    n.position.y
                }
            })
            .collect();
        assert_eq!(axis.len(), 3);
        assert!(axis.windows(2).all(|pair| pair.first() < pair.get(1)));

        // AND: the synthesized chain is now the edge set
        let pairs: Vec<(NodeId, NodeId)> = store
            .edges()
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (node(&ids, 0)?, node(&ids, 1)?),
                (node(&ids, 1)?, node(&ids, 2)?)
            ]
        );
    }
    Ok(())
}

// ============================================================================
// SNAPSHOTS
// ============================================================================

#[test]
fn given_exported_snapshot_when_reloaded_then_graph_and_counter_resume() -> DagResult<()> {
    // GIVEN: a graph exported as JSON
    let (mut store, ids) = store_with(&["A", "B"]);
    store.add_edge(node(&ids, 0)?, node(&ids, 1)?)?;
    store.update_note(&node(&ids, 0)?, "entry point");
    let json = store.snapshot().to_json_pretty()?;

    // WHEN: it is parsed and loaded
    let snapshot = dagsmith_core::GraphSnapshot::from_json(&json)?;
    let mut restored = GraphStore::from_snapshot(&snapshot)?;

    // THEN: same graph, fresh ids continue after the last one
    assert_eq!(restored.snapshot(), store.snapshot());
    assert_eq!(restored.add_node("C"), NodeId::new("node_2"));
    Ok(())
}

#[test]
fn given_snapshot_with_dangling_edge_when_loaded_then_refused() {
    // GIVEN: an edge to a node that is not in the snapshot
    let json = r#"{
        "nodes": [{"id": "node_0", "label": "A"}],
        "edges": [{"id": "edge-node_0-node_1", "source": "node_0", "target": "node_1"}]
    }"#;

    // WHEN: loaded
    let result = dagsmith_core::GraphSnapshot::from_json(json)
        .and_then(|snapshot| GraphStore::from_snapshot(&snapshot));

    // THEN: refused as an invalid snapshot
    assert!(matches!(result, Err(DagError::InvalidSnapshot { .. })));
}

#[test]
fn given_node_ids_with_dashes_when_snapshot_loaded_then_both_edges_admitted() -> DagResult<()> {
    // GIVEN: a -> b-c and a-b -> c, two different pairs sharing a naive id
    let json = r#"{
        "nodes": [
            {"id": "a", "label": "A"},
            {"id": "b-c", "label": "BC"},
            {"id": "a-b", "label": "AB"},
            {"id": "c", "label": "C"}
        ],
        "edges": [
            {"id": "x", "source": "a", "target": "b-c"},
            {"id": "y", "source": "a-b", "target": "c"}
        ]
    }"#;

    // WHEN: loaded
    let store = GraphStore::from_snapshot(&dagsmith_core::GraphSnapshot::from_json(json)?)?;

    // THEN: both edges exist with distinct ids
    let ids: Vec<&str> = store.edges().map(|edge| edge.id.as_str()).collect();
    assert_eq!(ids, vec![r"edge-a-b\-c", r"edge-a\-b-c"]);
    Ok(())
}

#[test]
fn given_imported_node_at_counter_limit_when_nodes_added_then_ids_stay_unique() -> DagResult<()> {
    // GIVEN: a snapshot holding the largest possible counter value
    let json = format!(r#"{{"nodes": [{{"id": "node_{}", "label": "Top"}}], "edges": []}}"#, u64::MAX);
    let mut store = GraphStore::from_snapshot(&dagsmith_core::GraphSnapshot::from_json(&json)?)?;

    // WHEN: two more nodes are created
    let a = store.add_node("A");
    let b = store.add_node("B");

    // THEN: every id is distinct
    let ids: std::collections::HashSet<&NodeId> = store.nodes().map(|node| &node.id).collect();
    assert_ne!(a, b);
    assert_eq!(ids.len(), 3);
    Ok(())
}
