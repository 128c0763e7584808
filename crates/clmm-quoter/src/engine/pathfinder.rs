//! Walk discovery (direct and one-intermediate routes) over a [`PoolGraph`].

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::graph::{PoolGraph, PoolGraphEdge};
use crate::math::constants::MAX_SUPPORTED_HOPS;
use crate::types::Pubkey;

/// Ordered pool addresses leading from one mint to another.
pub type Walk = Vec<Pubkey>;

/// Direction-independent key for a token pair: the two mints in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub token_a: Pubkey,
    pub token_b: Pubkey,
}

impl PairKey {
    pub fn new(token_1: Pubkey, token_2: Pubkey) -> Self {
        if token_1 <= token_2 {
            Self { token_a: token_1, token_b: token_2 }
        } else {
            Self { token_a: token_2, token_b: token_1 }
        }
    }
}

/// Walk search results. Walks are stored oriented from `token_a` to `token_b` of their key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSearchEntries {
    entries: IndexMap<PairKey, Vec<Walk>>,
}

impl RouteSearchEntries {
    pub fn get(&self, key: &PairKey) -> Option<&Vec<Walk>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &PairKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &PairKey> {
        self.entries.keys()
    }

    /// Walks for the pair, oriented from `token_in` to `token_out`.
    /// Empty when no route exists.
    pub fn walks_for(&self, token_in: &Pubkey, token_out: &Pubkey) -> Vec<Walk> {
        let key = PairKey::new(*token_in, *token_out);
        let Some(walks) = self.entries.get(&key) else {
            return Vec::new();
        };
        if key.token_a == *token_in {
            walks.clone()
        } else {
            walks
                .iter()
                .map(|walk| walk.iter().rev().copied().collect())
                .collect()
        }
    }
}

/// Walk search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSearchOptions {
    pub max_hops: usize,
    /// When set, two-hop walks may only pass through these mints.
    pub intermediate_tokens: Option<IndexSet<Pubkey>>,
}

impl Default for WalkSearchOptions {
    fn default() -> Self {
        Self { max_hops: MAX_SUPPORTED_HOPS, intermediate_tokens: None }
    }
}

/// Route enumerator over a borrowed graph snapshot.
pub struct Pathfinder<'a> {
    pub graph: &'a PoolGraph,
}

impl<'a> Pathfinder<'a> {
    pub fn new(graph: &'a PoolGraph) -> Self {
        Self { graph }
    }

    /// Enumerate walks for every requested pair. Both directions of a pair share one entry;
    /// pairs with no connecting walk get no entry at all.
    pub fn find_walks(
        &self,
        pairs: &[(Pubkey, Pubkey)],
        options: &WalkSearchOptions,
    ) -> RouteSearchEntries {
        let max_hops = if options.max_hops > MAX_SUPPORTED_HOPS {
            warn!(
                requested = options.max_hops,
                supported = MAX_SUPPORTED_HOPS,
                "clamping walk depth"
            );
            MAX_SUPPORTED_HOPS
        } else {
            options.max_hops
        };

        let mut results = RouteSearchEntries::default();
        for (token_in, token_out) in pairs {
            if token_in == token_out {
                continue;
            }
            let key = PairKey::new(*token_in, *token_out);
            if results.contains_key(&key) {
                continue;
            }
            let walks = self.walks_between(&key.token_a, &key.token_b, max_hops, options);
            debug!(
                token_a = %key.token_a,
                token_b = %key.token_b,
                walks = walks.len(),
                "walk search finished"
            );
            if !walks.is_empty() {
                results.entries.insert(key, walks);
            }
        }
        results
    }

    fn walks_between(
        &self,
        start: &Pubkey,
        end: &Pubkey,
        max_hops: usize,
        options: &WalkSearchOptions,
    ) -> Vec<Walk> {
        if max_hops == 0 {
            return Vec::new();
        }
        let from_start = self.graph.get_pools_for_token(start);
        let direct: Vec<&PoolGraphEdge> =
            from_start.iter().filter(|edge| edge.other_token == *end).collect();
        let direct_pools: HashSet<Pubkey> = direct.iter().map(|edge| edge.pool).collect();

        let mut walks: Vec<Walk> = direct.iter().map(|edge| vec![edge.pool]).collect();
        if max_hops < 2 {
            return walks;
        }

        let into_end = self.graph.get_pools_for_token(end);
        for first in from_start.iter().filter(|edge| edge.other_token != *end) {
            let intermediate = first.other_token;
            if let Some(allowed) = &options.intermediate_tokens {
                if !allowed.contains(&intermediate) {
                    continue;
                }
            }
            for second in into_end.iter().filter(|edge| edge.other_token == intermediate) {
                if first.pool == second.pool
                    || direct_pools.contains(&first.pool)
                    || direct_pools.contains(&second.pool)
                {
                    continue;
                }
                walks.push(vec![first.pool, second.pool]);
            }
        }
        walks
    }
}
