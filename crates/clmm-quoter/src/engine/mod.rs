pub mod analytics;
pub mod graph;
pub mod oracle;
pub mod pathfinder;
pub mod quoting;
pub mod selection;
pub mod simulation;

use std::collections::HashMap;

use indexmap::IndexMap;
use itertools::Itertools;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::RouterConfig;
use crate::types::{PoolSnapshot, Pubkey, QuoteRequest, QuoterError, Result};
use graph::{PoolEdge, PoolGraph};
use oracle::{mean_tick, ObservationBuffer};
use pathfinder::{Pathfinder, RouteSearchEntries, Walk};
use quoting::{compare_route_quotes, RouteQuote, TradeQuote};

/// Everything the router reads for one quote: pool states, their oracle buffers and the clock.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    pub pools: IndexMap<Pubkey, PoolSnapshot>,
    /// Oracle buffers keyed by pool address.
    pub oracles: IndexMap<Pubkey, ObservationBuffer>,
    /// Unix seconds; `None` reads the wall clock.
    pub now: Option<i64>,
}

impl MarketSnapshot {
    pub fn new(pools: impl IntoIterator<Item = PoolSnapshot>) -> Self {
        Self {
            pools: pools.into_iter().map(|pool| (pool.address, pool)).collect(),
            oracles: IndexMap::new(),
            now: None,
        }
    }

    pub fn with_oracle(mut self, pool: Pubkey, buffer: ObservationBuffer) -> Self {
        self.oracles.insert(pool, buffer);
        self
    }

    pub fn with_now(mut self, now: i64) -> Self {
        self.now = Some(now);
        self
    }

    pub fn pool_edges(&self) -> Vec<PoolEdge> {
        self.pools.values().map(PoolEdge::from).collect()
    }
}

/// Graph plus configuration for one snapshot. Rebuild it when the snapshot changes.
pub struct QuoteEngine {
    snapshot: MarketSnapshot,
    graph: PoolGraph,
    config: RouterConfig,
}

impl QuoteEngine {
    pub fn new(snapshot: MarketSnapshot, config: RouterConfig) -> Result<Self> {
        config.validate()?;
        let graph = PoolGraph::build(&snapshot.pool_edges());
        info!(
            tokens = graph.get_node_count(),
            pools = graph.get_edge_count(),
            "quote engine ready"
        );
        Ok(Self { snapshot, graph, config: config.normalized() })
    }

    pub fn graph(&self) -> &PoolGraph {
        &self.graph
    }

    pub fn snapshot(&self) -> &MarketSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Walk search for several pairs at once; the result can be reused across quotes.
    pub fn find_routes(&self, pairs: &[(Pubkey, Pubkey)]) -> RouteSearchEntries {
        Pathfinder::new(&self.graph).find_walks(pairs, &self.config.walk_options())
    }

    /// Best single or split route for `request`; `Ok(None)` when the pair has no route.
    pub fn quote(&self, request: &QuoteRequest) -> Result<Option<TradeQuote>> {
        let routes = self.find_routes(&[(request.token_in, request.token_out)]);
        quote_routes(request, &self.snapshot, &routes, &self.config)
    }
}

/// Oracle guard verdict for one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuardVerdict {
    Pass,
    Exclude,
}

fn check_oracle(
    pool: &PoolSnapshot,
    snapshot: &MarketSnapshot,
    config: &RouterConfig,
) -> Result<GuardVerdict> {
    let (Some(window), Some(buffer)) = (config.twap_window_secs, snapshot.oracles.get(&pool.address))
    else {
        return Ok(GuardVerdict::Pass);
    };
    match mean_tick(buffer, i64::from(window), pool.tick_current_index, snapshot.now) {
        Ok(twap_tick) => {
            let deviation = (i64::from(twap_tick) - i64::from(pool.tick_current_index)).unsigned_abs();
            if deviation > u64::from(config.max_tick_deviation) {
                debug!(
                    pool = %pool.address,
                    twap_tick,
                    current_tick = pool.tick_current_index,
                    "pool price deviates from its TWAP"
                );
                Ok(GuardVerdict::Exclude)
            } else {
                Ok(GuardVerdict::Pass)
            }
        }
        Err(err) if err.is_recoverable() => {
            debug!(pool = %pool.address, error = %err, "oracle history too short for guard");
            Ok(GuardVerdict::Exclude)
        }
        Err(err) => Err(err),
    }
}

fn price_walk(
    walk: &Walk,
    pools: &[&PoolSnapshot],
    token_in: &Pubkey,
    amount_in: u64,
    percent: u8,
) -> Result<Option<RouteQuote>> {
    let Some(hops) = simulation::simulate_walk(pools, token_in, amount_in)? else {
        return Ok(None);
    };
    let Some(amount_out) = hops.last().map(|hop| hop.amount_out) else {
        return Ok(None);
    };
    let mid_price = analytics::walk_mid_price(pools, token_in);
    let price_impact_bps =
        mid_price.and_then(|mid| analytics::calculate_price_impact_bps(amount_in, amount_out, mid));
    Ok(Some(RouteQuote {
        walk: walk.clone(),
        percent,
        amount_in,
        amount_out,
        hops,
        mid_price,
        price_impact_bps,
    }))
}

fn share_of(amount: u64, percent: u8) -> u64 {
    // percent <= 100 keeps the result within u64
    (u128::from(amount) * u128::from(percent) / 100) as u64
}

fn assemble(request: &QuoteRequest, routes: Vec<RouteQuote>, excluded: usize) -> TradeQuote {
    let amount_in: u64 = routes.iter().map(|route| route.amount_in).sum();
    let amount_out = routes
        .iter()
        .fold(0u64, |acc, route| acc.saturating_add(route.amount_out));
    let price_impact_bps = if routes.iter().all(|route| route.price_impact_bps.is_some()) {
        let weighted = routes.iter().try_fold(Decimal::ZERO, |acc, route| {
            let impact = route.price_impact_bps?;
            acc.checked_add(impact.checked_mul(Decimal::from(route.amount_in))?)
        });
        weighted.and_then(|total| total.checked_div(Decimal::from(amount_in)))
    } else {
        None
    };
    TradeQuote {
        token_in: request.token_in,
        token_out: request.token_out,
        amount_in,
        amount_out,
        routes,
        price_impact_bps,
        excluded_candidates: excluded,
    }
}

/// Price every walk found for the request's pair and pick the best single route or
/// two-route split.
///
/// Returns `Ok(None)` when no walk connects the pair and `Err(NoViableRoute)` when walks
/// exist but none could be priced. Candidates failing the oracle guard, or whose hops
/// cannot be filled or priced from the snapshot, are excluded; corrupt oracle state aborts
/// the quote.
pub fn quote_routes(
    request: &QuoteRequest,
    snapshot: &MarketSnapshot,
    routes: &RouteSearchEntries,
    config: &RouterConfig,
) -> Result<Option<TradeQuote>> {
    config.validate()?;
    if request.amount_in == 0 {
        return Err(QuoterError::InvalidRange("amount_in must be positive".into()));
    }
    let walks = routes.walks_for(&request.token_in, &request.token_out);
    if walks.is_empty() {
        info!(
            token_in = %request.token_in,
            token_out = %request.token_out,
            "no route found"
        );
        return Ok(None);
    }

    let mut excluded = 0usize;
    let mut verdicts: HashMap<Pubkey, GuardVerdict> = HashMap::new();
    let mut viable: Vec<(&Walk, Vec<&PoolSnapshot>)> = Vec::with_capacity(walks.len());
    'walks: for walk in &walks {
        let mut pools = Vec::with_capacity(walk.len());
        for address in walk {
            let Some(pool) = snapshot.pools.get(address) else {
                warn!(pool = %address, "walk references a pool missing from the snapshot");
                excluded += 1;
                continue 'walks;
            };
            let verdict = match verdicts.get(address).copied() {
                Some(verdict) => verdict,
                None => {
                    let verdict = check_oracle(pool, snapshot, config)?;
                    verdicts.insert(*address, verdict);
                    verdict
                }
            };
            if verdict == GuardVerdict::Exclude {
                excluded += 1;
                continue 'walks;
            }
            pools.push(pool);
        }
        viable.push((walk, pools));
    }

    let mut best_by_percent: IndexMap<u8, Vec<RouteQuote>> = IndexMap::new();
    for percent in config.split_percents() {
        let amount = share_of(request.amount_in, percent);
        if amount == 0 {
            continue;
        }
        let mut candidates = Vec::with_capacity(viable.len());
        for (walk, pools) in &viable {
            match price_walk(walk, pools, &request.token_in, amount, percent) {
                Ok(Some(quote)) => candidates.push(quote),
                Ok(None) => excluded += 1,
                Err(err) => {
                    // a corrupt pool state fails its own candidate only
                    warn!(walk = ?walk, percent, error = %err, "walk could not be priced");
                    excluded += 1;
                }
            }
        }
        let top = selection::select_top_k(candidates, config.top_k, compare_route_quotes);
        if !top.is_empty() {
            best_by_percent.insert(percent, top);
        }
    }

    let single = best_by_percent
        .get(&100u8)
        .and_then(|top| top.first())
        .cloned()
        .map(|route| vec![route]);

    let mut split: Option<Vec<RouteQuote>> = None;
    let mut split_out = 0u128;
    if config.max_splits >= 2 {
        for (&percent, first_legs) in &best_by_percent {
            // each unordered pair of shares once
            if percent > 50 {
                continue;
            }
            let Some(second_legs) = best_by_percent.get(&(100 - percent)) else {
                continue;
            };
            for (first, second) in first_legs.iter().cartesian_product(second_legs.iter()) {
                if first.shares_pool_with(second) {
                    continue;
                }
                let total = u128::from(first.amount_out) + u128::from(second.amount_out);
                if total > split_out {
                    split_out = total;
                    split = Some(vec![first.clone(), second.clone()]);
                }
            }
        }
    }

    let single_out = single
        .as_ref()
        .map(|legs| u128::from(legs[0].amount_out))
        .unwrap_or(0);
    let chosen = match (single, split) {
        (_, Some(legs)) if split_out > single_out => legs,
        (Some(legs), _) => legs,
        (None, Some(legs)) => legs,
        (None, None) => {
            warn!(
                token_in = %request.token_in,
                token_out = %request.token_out,
                excluded,
                "every candidate route was excluded"
            );
            return Err(QuoterError::NoViableRoute(excluded));
        }
    };

    let quote = assemble(request, chosen, excluded);
    info!(
        token_in = %quote.token_in,
        token_out = %quote.token_out,
        amount_in = quote.amount_in,
        amount_out = quote.amount_out,
        routes = quote.num_split_paths(),
        excluded = quote.excluded_candidates,
        "selected quote"
    );
    Ok(Some(quote))
}
