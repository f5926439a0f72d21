//! DAG Property-Based Tests
//!
//! Random edge sequences against the graph store; the invariants below must
//! hold no matter which edges were accepted or rejected.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::collections::HashSet;

use dagsmith_core::{GraphStore, LayoutConfig, NodeId, Position, RankDirection, validate};
use proptest::prelude::*;

const MAX_NODES: usize = 12;

fn build(node_count: usize, attempts: &[(usize, usize)]) -> (GraphStore, Vec<NodeId>) {
    let mut store = GraphStore::new();
    let ids: Vec<NodeId> = (0..node_count)
        .map(|i| store.add_node_at(format!("N{i}"), Position::origin()))
        .collect();
    for (source, target) in attempts {
        if let (Some(source), Some(target)) = (ids.get(*source), ids.get(*target)) {
            let _ = store.add_edge(source.clone(), target.clone());
        }
    }
    (store, ids)
}

fn reachable(store: &GraphStore, from: &NodeId, to: &NodeId) -> bool {
    let mut stack = vec![from.clone()];
    let mut seen = HashSet::new();
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

fn attempts() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2..=MAX_NODES).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n), 0..n.saturating_mul(n)),
        )
    })
}

proptest! {
    #[test]
    fn property_accepted_edges_never_have_a_return_path((n, pairs) in attempts()) {
        let (store, _) = build(n, &pairs);
        for edge in store.edges() {
            prop_assert!(!edge.is_self_loop());
            prop_assert!(!reachable(&store, &edge.target, &edge.source));
        }
        prop_assert!(!validate(store.nodes(), store.edges())
            .violations()
            .contains(&dagsmith_core::Violation::CycleDetected));
    }

    #[test]
    fn property_edge_ids_are_unique((n, pairs) in attempts()) {
        let (store, _) = build(n, &pairs);
        let ids: HashSet<_> = store.edges().map(|edge| edge.id.clone()).collect();
        prop_assert_eq!(ids.len(), store.edge_count());
    }

    #[test]
    fn property_removing_a_node_removes_its_edges(
        (n, pairs) in attempts(),
        victim in 0..MAX_NODES,
    ) {
        let (mut store, ids) = build(n, &pairs);
        if let Some(victim) = ids.get(victim % n) {
            store.remove_node(victim);
            prop_assert!(store.edges().all(|edge| !edge.touches(victim)));
            prop_assert!(store
                .edges()
                .all(|edge| store.contains_node(&edge.source) && store.contains_node(&edge.target)));
        }
    }

    #[test]
    fn property_layout_ranks_follow_node_order(
        (n, pairs) in attempts(),
        vertical in any::<bool>(),
    ) {
        let (mut store, ids) = build(n, &pairs);
        let direction = if vertical { RankDirection::TopBottom } else { RankDirection::LeftRight };
        let result = store.auto_layout(&LayoutConfig::default().with_direction(direction));

        prop_assert_eq!(store.edge_count(), n.saturating_sub(1));
        let axis: Vec<f64> = ids
            .iter()
            .filter_map(|id| store.node(id))
            .map(|node| if vertical { node.position.y } else { node.position.x })
            .collect();
        prop_assert!(axis.windows(2).all(|pair| pair.first() < pair.get(1)));
        for (expected, id) in ids.iter().enumerate() {
            prop_assert_eq!(result.rank_of(id), Some(expected));
        }
        prop_assert!(store.validate(2).is_valid());
    }
}
