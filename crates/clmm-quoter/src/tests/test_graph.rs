//! Graph and pathfinding tests for clmm-quoter.

use indexmap::IndexSet;

use super::key;
use crate::engine::graph::{PoolEdge, PoolGraph, PoolGraphEdge};
use crate::engine::pathfinder::{PairKey, Pathfinder, WalkSearchOptions};

fn edge(address: u8, mint_a: u8, mint_b: u8) -> PoolEdge {
    PoolEdge { address: key(address), token_mint_a: key(mint_a), token_mint_b: key(mint_b) }
}

#[test]
fn test_graph_construction() {
    let graph = PoolGraph::build(&[edge(0xa1, 1, 2), edge(0xa2, 2, 3)]);
    assert_eq!(graph.get_node_count(), 3);
    assert_eq!(graph.get_edge_count(), 2);
    assert!(graph.contains_token(&key(2)));
    assert!(!graph.contains_token(&key(9)));
    assert_eq!(graph.get_all_pool_addresses(), vec![key(0xa1), key(0xa2)]);
}

#[test]
fn test_graph_is_symmetric() {
    let graph = PoolGraph::build(&[edge(0xa1, 1, 2)]);
    assert_eq!(
        graph.get_pools_for_token(&key(1)),
        vec![PoolGraphEdge { pool: key(0xa1), other_token: key(2) }]
    );
    assert_eq!(
        graph.get_pools_for_token(&key(2)),
        vec![PoolGraphEdge { pool: key(0xa1), other_token: key(1) }]
    );
}

#[test]
fn test_graph_skips_duplicates_and_self_pairs() {
    let graph = PoolGraph::build(&[edge(0xa1, 1, 2), edge(0xa1, 1, 2), edge(0xa2, 3, 3)]);
    assert_eq!(graph.get_edge_count(), 1);
    assert_eq!(graph.get_pools_for_token(&key(1)).len(), 1);
    assert!(graph.get_pools_for_token(&key(3)).is_empty());
}

#[test]
fn test_direct_and_two_hop_walks() {
    // 1-2 directly via a1 and a2, and via 3 through b1/b2
    let graph = PoolGraph::build(&[
        edge(0xa1, 1, 2),
        edge(0xa2, 2, 1),
        edge(0xb1, 1, 3),
        edge(0xb2, 3, 2),
    ]);
    let routes = Pathfinder::new(&graph).find_walks(&[(key(1), key(2))], &WalkSearchOptions::default());
    let walks = routes.walks_for(&key(1), &key(2));
    assert_eq!(walks.len(), 3);
    assert!(walks.contains(&vec![key(0xa1)]));
    assert!(walks.contains(&vec![key(0xa2)]));
    assert!(walks.contains(&vec![key(0xb1), key(0xb2)]));
}

#[test]
fn test_both_directions_share_one_entry() {
    let graph = PoolGraph::build(&[edge(0xb1, 1, 3), edge(0xb2, 3, 2)]);
    let routes = Pathfinder::new(&graph)
        .find_walks(&[(key(2), key(1)), (key(1), key(2))], &WalkSearchOptions::default());
    assert_eq!(routes.len(), 1);
    assert!(routes.contains_key(&PairKey::new(key(2), key(1))));
    assert_eq!(routes.walks_for(&key(1), &key(2)), vec![vec![key(0xb1), key(0xb2)]]);
    assert_eq!(routes.walks_for(&key(2), &key(1)), vec![vec![key(0xb2), key(0xb1)]]);
}

#[test]
fn test_direct_pool_never_reused_as_leg() {
    // a1 joins 1 and 2 directly; 2 also reaches 3 and 3 reaches 1
    let graph = PoolGraph::build(&[edge(0xa1, 1, 2), edge(0xb1, 2, 3), edge(0xb2, 3, 1)]);
    let routes = Pathfinder::new(&graph).find_walks(&[(key(1), key(2))], &WalkSearchOptions::default());
    for walk in routes.walks_for(&key(1), &key(2)) {
        if walk.len() == 2 {
            assert!(!walk.contains(&key(0xa1)));
        }
    }
}

#[test]
fn test_intermediate_filter_and_depth() {
    let graph = PoolGraph::build(&[
        edge(0xb1, 1, 3),
        edge(0xb2, 3, 2),
        edge(0xc1, 1, 4),
        edge(0xc2, 4, 2),
    ]);
    let pathfinder = Pathfinder::new(&graph);

    let only_three = WalkSearchOptions {
        max_hops: 2,
        intermediate_tokens: Some(IndexSet::from([key(3)])),
    };
    let routes = pathfinder.find_walks(&[(key(1), key(2))], &only_three);
    assert_eq!(routes.walks_for(&key(1), &key(2)), vec![vec![key(0xb1), key(0xb2)]]);

    let one_hop = WalkSearchOptions { max_hops: 1, intermediate_tokens: None };
    assert!(pathfinder.find_walks(&[(key(1), key(2))], &one_hop).is_empty());

    // deeper requests are clamped rather than rejected
    let deep = WalkSearchOptions { max_hops: 5, intermediate_tokens: None };
    assert_eq!(pathfinder.find_walks(&[(key(1), key(2))], &deep).walks_for(&key(1), &key(2)).len(), 2);
}

#[test]
fn test_unconnected_pairs_have_no_entry() {
    let graph = PoolGraph::build(&[edge(0xa1, 1, 2), edge(0xa2, 3, 4)]);
    let routes = Pathfinder::new(&graph).find_walks(
        &[(key(1), key(4)), (key(1), key(1)), (key(7), key(8))],
        &WalkSearchOptions::default(),
    );
    assert!(routes.is_empty());
    assert!(routes.walks_for(&key(1), &key(4)).is_empty());
}
