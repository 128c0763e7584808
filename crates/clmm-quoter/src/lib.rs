// Library entry point for clmm-quoter

pub mod config;
pub mod data_management;
pub mod engine;
pub mod math;
pub mod types;
pub mod utils;

pub use config::RouterConfig;
pub use engine::graph::{PoolEdge, PoolGraph};
pub use engine::oracle::{mean_tick, query_tick_at, Observation, ObservationBuffer};
pub use engine::pathfinder::{PairKey, Pathfinder, RouteSearchEntries, Walk, WalkSearchOptions};
pub use engine::quoting::{RouteQuote, TradeQuote};
pub use engine::selection::{partition, select_top_k};
pub use engine::{quote_routes, MarketSnapshot, QuoteEngine};
pub use types::{PoolSnapshot, Pubkey, QuoteRequest, QuoterError, Result, TokenAmounts};

#[cfg(test)]
mod tests;
