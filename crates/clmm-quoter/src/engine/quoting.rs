//! Quote models: per-route quotes and the assembled (possibly split) trade quote.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::pathfinder::Walk;
use crate::engine::simulation::HopQuote;
use crate::types::Pubkey;

/// One walk priced for one share of the trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteQuote {
    pub walk: Walk,
    /// Share of the requested amount routed here, in percent.
    pub percent: u8,
    pub amount_in: u64,
    pub amount_out: u64,
    pub hops: Vec<HopQuote>,
    pub mid_price: Option<Decimal>,
    /// Price impact for this route, in bps.
    pub price_impact_bps: Option<Decimal>,
}

impl RouteQuote {
    pub fn uses_pool(&self, pool: &Pubkey) -> bool {
        self.walk.contains(pool)
    }

    pub fn shares_pool_with(&self, other: &RouteQuote) -> bool {
        self.walk.iter().any(|pool| other.uses_pool(pool))
    }

    pub fn total_fees(&self) -> u64 {
        self.hops.iter().map(|hop| hop.fee_amount).sum()
    }
}

/// Ranking: more output first, then lower price impact; unknown impact ranks last.
pub fn compare_route_quotes(a: &RouteQuote, b: &RouteQuote) -> Ordering {
    b.amount_out.cmp(&a.amount_out).then_with(|| {
        match (a.price_impact_bps, b.price_impact_bps) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    })
}

/// Result of a price quote computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeQuote {
    pub token_in: Pubkey,
    pub token_out: Pubkey,
    /// Sum of the route inputs; may trail the request by rounding dust when split.
    pub amount_in: u64,
    pub amount_out: u64,
    pub routes: Vec<RouteQuote>,
    /// Input-weighted price impact across routes, in bps.
    pub price_impact_bps: Option<Decimal>,
    /// Candidates dropped by the oracle guard or unquotable hops.
    pub excluded_candidates: usize,
}

impl TradeQuote {
    pub fn is_split_trade(&self) -> bool {
        self.routes.len() > 1
    }

    pub fn num_split_paths(&self) -> usize {
        self.routes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(amount_out: u64, impact: Option<i64>) -> RouteQuote {
        RouteQuote {
            walk: vec![Pubkey::repeat_byte(amount_out as u8)],
            percent: 100,
            amount_in: 100,
            amount_out,
            hops: Vec::new(),
            mid_price: None,
            price_impact_bps: impact.map(Decimal::from),
        }
    }

    #[test]
    fn higher_output_ranks_first() {
        assert_eq!(compare_route_quotes(&quote(10, None), &quote(9, Some(1))), Ordering::Less);
        assert_eq!(compare_route_quotes(&quote(9, Some(1)), &quote(9, Some(5))), Ordering::Less);
        assert_eq!(compare_route_quotes(&quote(9, None), &quote(9, Some(5))), Ordering::Greater);
    }

    #[test]
    fn pool_overlap() {
        let a = quote(1, None);
        let mut b = quote(2, None);
        assert!(!a.shares_pool_with(&b));
        b.walk.push(Pubkey::repeat_byte(1));
        assert!(a.shares_pool_with(&b));
    }
}
