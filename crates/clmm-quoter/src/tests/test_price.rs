//! Route pricing and selection tests for clmm-quoter.

use super::{key, pool};
use crate::config::RouterConfig;
use crate::engine::oracle::{Observation, ObservationBuffer};
use crate::engine::pathfinder::{Pathfinder, WalkSearchOptions};
use crate::engine::{quote_routes, MarketSnapshot, QuoteEngine};
use crate::math::constants::OBSERVATION_CAPACITY;
use crate::types::{PoolSnapshot, QuoteRequest, QuoterError};

fn request(token_in: u8, token_out: u8, amount_in: u64) -> QuoteRequest {
    QuoteRequest { token_in: key(token_in), token_out: key(token_out), amount_in }
}

fn engine(pools: Vec<PoolSnapshot>, config: RouterConfig) -> QuoteEngine {
    crate::utils::init_tracing();
    QuoteEngine::new(MarketSnapshot::new(pools), config).unwrap()
}

fn oracle(samples: &[(u32, i64)]) -> ObservationBuffer {
    let mut observations = vec![Observation::default(); OBSERVATION_CAPACITY];
    for (slot, (timestamp, cumulative)) in samples.iter().enumerate() {
        observations[slot] = Observation::new(*timestamp, *cumulative);
    }
    ObservationBuffer::new(observations, (samples.len() - 1) as u16).unwrap()
}

#[test]
fn test_single_pool_quote() {
    let engine = engine(vec![pool(0xa1, 1, 2, 1_000_000_000_000)], RouterConfig::default());
    let quote = engine.quote(&request(1, 2, 1_000_000)).unwrap().unwrap();
    assert!(!quote.is_split_trade());
    assert_eq!(quote.amount_in, 1_000_000);
    assert_eq!(quote.routes[0].walk, vec![key(0xa1)]);
    assert_eq!(quote.routes[0].hops.len(), 1);
    assert!(quote.amount_out > 999_000 && quote.amount_out < 1_000_000);
    assert!(quote.price_impact_bps.unwrap() > rust_decimal::Decimal::ZERO);
}

#[test]
fn test_deeper_pool_wins_without_split() {
    let engine = engine(
        vec![pool(0xa1, 1, 2, 1_000_000), pool(0xa2, 1, 2, 1_000_000_000_000_000)],
        RouterConfig::default(),
    );
    let quote = engine.quote(&request(1, 2, 100_000)).unwrap().unwrap();
    assert_eq!(quote.num_split_paths(), 1);
    assert_eq!(quote.routes[0].walk, vec![key(0xa2)]);
    // the shallow pool alone returns roughly 100_000 * 10 / 11
    assert!(quote.amount_out > 99_000);
}

#[test]
fn test_split_across_parallel_pools() {
    let engine = engine(
        vec![pool(0xa1, 1, 2, 1_000_000), pool(0xa2, 1, 2, 1_000_000)],
        RouterConfig::default(),
    );
    let quote = engine.quote(&request(1, 2, 1_000_000)).unwrap().unwrap();
    assert!(quote.is_split_trade());
    assert_eq!(quote.amount_in, 1_000_000);
    assert_ne!(quote.routes[0].walk, quote.routes[1].walk);
    let percents: u32 = quote.routes.iter().map(|route| u32::from(route.percent)).sum();
    assert_eq!(percents, 100);

    // a single pool gives about half the input at this size
    let single_only = RouterConfig { max_splits: 1, ..RouterConfig::default() };
    let single = quote_routes(
        &request(1, 2, 1_000_000),
        engine.snapshot(),
        &engine.find_routes(&[(key(1), key(2))]),
        &single_only,
    )
    .unwrap()
    .unwrap();
    assert!(!single.is_split_trade());
    assert!(quote.amount_out > single.amount_out);
}

#[test]
fn test_two_hop_route() {
    let engine = engine(
        vec![pool(0xa1, 1, 3, 1_000_000_000_000), pool(0xa2, 3, 2, 1_000_000_000_000)],
        RouterConfig::default(),
    );
    let quote = engine.quote(&request(1, 2, 10_000)).unwrap().unwrap();
    let route = &quote.routes[0];
    assert_eq!(route.walk, vec![key(0xa1), key(0xa2)]);
    assert_eq!(route.hops[0].token_out, key(3));
    assert_eq!(route.hops[1].amount_in, route.hops[0].amount_out);
    assert_eq!(route.amount_out, quote.amount_out);
}

#[test]
fn test_reverse_direction_uses_reversed_walk() {
    let engine = engine(
        vec![pool(0xa1, 1, 3, 1_000_000_000_000), pool(0xa2, 3, 2, 1_000_000_000_000)],
        RouterConfig::default(),
    );
    let quote = engine.quote(&request(2, 1, 10_000)).unwrap().unwrap();
    assert_eq!(quote.routes[0].walk, vec![key(0xa2), key(0xa1)]);
}

#[test]
fn test_no_route_is_not_an_error() {
    let engine = engine(vec![pool(0xa1, 1, 2, 1_000_000)], RouterConfig::default());
    assert_eq!(engine.quote(&request(1, 9, 1_000)).unwrap(), None);
    assert_eq!(engine.quote(&request(1, 1, 1_000)).unwrap(), None);
}

#[test]
fn test_zero_amount_is_rejected() {
    let engine = engine(vec![pool(0xa1, 1, 2, 1_000_000)], RouterConfig::default());
    assert!(matches!(engine.quote(&request(1, 2, 0)), Err(QuoterError::InvalidRange(_))));
}

#[test]
fn test_empty_pool_yields_no_viable_route() {
    let engine = engine(vec![pool(0xa1, 1, 2, 0)], RouterConfig::default());
    assert!(matches!(engine.quote(&request(1, 2, 1_000)), Err(QuoterError::NoViableRoute(_))));
}

#[test]
fn test_unpriceable_pool_is_excluded() {
    let mut bad_fee = pool(0xa1, 1, 2, 1_000_000_000_000);
    bad_fee.fee_rate = 2_000_000;
    let engine = engine(vec![bad_fee, pool(0xa2, 1, 2, 1_000_000_000)], RouterConfig::default());
    let quote = engine.quote(&request(1, 2, 1_000)).unwrap().unwrap();
    assert_eq!(quote.routes.len(), 1);
    assert_eq!(quote.routes[0].walk, vec![key(0xa2)]);
    assert!(quote.excluded_candidates >= 1);
}

#[test]
fn test_zero_sqrt_price_pool_yields_no_viable_route() {
    let mut corrupt = pool(0xa1, 1, 2, 1_000_000_000);
    corrupt.sqrt_price = 0;
    let engine = engine(vec![corrupt], RouterConfig::default());
    // b -> a divides by the zero starting price
    assert!(matches!(engine.quote(&request(2, 1, 1_000)), Err(QuoterError::NoViableRoute(_))));
}

fn guarded() -> RouterConfig {
    RouterConfig { twap_window_secs: Some(10), max_tick_deviation: 50, ..RouterConfig::default() }
}

#[test]
fn test_oracle_guard_passes_stable_pool() {
    let snapshot = MarketSnapshot::new(vec![pool(0xa1, 1, 2, 1_000_000_000)])
        .with_oracle(key(0xa1), oracle(&[(100, 0), (110, 0)]))
        .with_now(110);
    let engine = QuoteEngine::new(snapshot, guarded()).unwrap();
    assert!(engine.quote(&request(1, 2, 1_000)).unwrap().is_some());
}

#[test]
fn test_oracle_guard_excludes_deviating_pool() {
    // a1 TWAP is tick 1000 while its current tick is 0
    let snapshot = MarketSnapshot::new(vec![
        pool(0xa1, 1, 2, 1_000_000_000_000),
        pool(0xa2, 1, 2, 1_000_000_000),
    ])
    .with_oracle(key(0xa1), oracle(&[(100, 0), (110, 10_000)]))
    .with_now(110);
    let engine = QuoteEngine::new(snapshot, guarded()).unwrap();
    let quote = engine.quote(&request(1, 2, 1_000)).unwrap().unwrap();
    assert_eq!(quote.routes.len(), 1);
    assert_eq!(quote.routes[0].walk, vec![key(0xa2)]);
    assert!(quote.excluded_candidates >= 1);
}

#[test]
fn test_oracle_guard_excludes_short_history() {
    let snapshot = MarketSnapshot::new(vec![pool(0xa1, 1, 2, 1_000_000_000)])
        .with_oracle(key(0xa1), oracle(&[(105, 0), (110, 0)]))
        .with_now(110);
    let engine = QuoteEngine::new(snapshot, guarded()).unwrap();
    assert_eq!(engine.quote(&request(1, 2, 1_000)), Err(QuoterError::NoViableRoute(1)));
}

#[test]
fn test_corrupt_oracle_aborts_quote() {
    let snapshot = MarketSnapshot::new(vec![
        pool(0xa1, 1, 2, 1_000_000_000),
        pool(0xa2, 1, 2, 1_000_000_000),
    ])
    .with_oracle(key(0xa1), oracle(&[(100, 0), (110, 5_000_000)]))
    .with_now(110);
    let engine = QuoteEngine::new(snapshot, guarded()).unwrap();
    assert!(matches!(engine.quote(&request(1, 2, 1_000)), Err(QuoterError::OutOfBounds(_))));
}

#[test]
fn test_routes_can_be_shared_across_quotes() {
    let pools = vec![pool(0xa1, 1, 2, 1_000_000_000_000), pool(0xa2, 2, 3, 1_000_000_000_000)];
    let snapshot = MarketSnapshot::new(pools);
    let graph = crate::engine::graph::PoolGraph::build(&snapshot.pool_edges());
    let routes = Pathfinder::new(&graph).find_walks(
        &[(key(1), key(2)), (key(2), key(3)), (key(1), key(3))],
        &WalkSearchOptions::default(),
    );
    let config = RouterConfig::default();
    for (token_in, token_out) in [(1, 2), (3, 2), (1, 3)] {
        let quote = quote_routes(&request(token_in, token_out, 5_000), &snapshot, &routes, &config)
            .unwrap()
            .unwrap();
        assert_eq!(quote.token_out, key(token_out));
        assert!(quote.amount_out > 0);
    }
}
