//! Token/pool graph model built once per snapshot.

use indexmap::{IndexMap, IndexSet};
use petgraph::prelude::NodeIndex;
use petgraph::stable_graph::StableUnGraph;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{PoolSnapshot, Pubkey};

/// A pool as it appears in the snapshot: address plus its two mints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolEdge {
    pub address: Pubkey,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
}

impl From<&PoolSnapshot> for PoolEdge {
    fn from(pool: &PoolSnapshot) -> Self {
        Self {
            address: pool.address,
            token_mint_a: pool.token_mint_a,
            token_mint_b: pool.token_mint_b,
        }
    }
}

/// One adjacency entry: the pool and the mint it leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolGraphEdge {
    pub pool: Pubkey,
    pub other_token: Pubkey,
}

/// Undirected mint graph; each edge is a pool. Never mutated after [`PoolGraph::build`].
#[derive(Debug, Clone, Default)]
pub struct PoolGraph {
    graph: StableUnGraph<Pubkey, Pubkey>,
    token_indices: IndexMap<Pubkey, NodeIndex>,
    pool_ids: IndexSet<Pubkey>,
}

impl PoolGraph {
    /// Build the graph from a pool list. Duplicate pool addresses and pools whose two
    /// mints coincide are skipped.
    pub fn build(pools: &[PoolEdge]) -> Self {
        let mut graph = PoolGraph::default();
        for pool in pools {
            if pool.token_mint_a == pool.token_mint_b {
                warn!(pool = %pool.address, "skipping pool with identical mints");
                continue;
            }
            if !graph.pool_ids.insert(pool.address) {
                debug!(pool = %pool.address, "duplicate pool in snapshot");
                continue;
            }
            let a = graph.node_for(pool.token_mint_a);
            let b = graph.node_for(pool.token_mint_b);
            graph.graph.add_edge(a, b, pool.address);
        }
        debug!(
            tokens = graph.token_indices.len(),
            pools = graph.pool_ids.len(),
            "built pool graph"
        );
        graph
    }

    fn node_for(&mut self, mint: Pubkey) -> NodeIndex {
        if let Some(&idx) = self.token_indices.get(&mint) {
            return idx;
        }
        let idx = self.graph.add_node(mint);
        self.token_indices.insert(mint, idx);
        idx
    }

    /// All pools touching `mint`, each with the mint on its other side.
    pub fn get_pools_for_token(&self, mint: &Pubkey) -> Vec<PoolGraphEdge> {
        let Some(&idx) = self.token_indices.get(mint) else {
            return Vec::new();
        };
        let mut edges: Vec<PoolGraphEdge> = self
            .graph
            .edges(idx)
            .filter_map(|edge| {
                let other = if edge.source() == idx { edge.target() } else { edge.source() };
                self.graph.node_weight(other).map(|other_token| PoolGraphEdge {
                    pool: *edge.weight(),
                    other_token: *other_token,
                })
            })
            .collect();
        edges.sort();
        edges
    }

    pub fn contains_token(&self, mint: &Pubkey) -> bool {
        self.token_indices.contains_key(mint)
    }

    pub fn get_all_token_addresses(&self) -> Vec<Pubkey> {
        self.token_indices.keys().copied().collect()
    }

    pub fn get_all_pool_addresses(&self) -> Vec<Pubkey> {
        self.pool_ids.iter().copied().collect()
    }

    pub fn get_node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn get_edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
