//! Spot prices and price impact for ranking candidate routes.

use rust_decimal::Decimal;

use crate::math::fixed_point::from_x64;
use crate::types::{PoolSnapshot, Pubkey};

/// Raw-unit spot price of `token_in` in the pool's other token, fees excluded.
pub fn spot_price(pool: &PoolSnapshot, token_in: &Pubkey) -> Option<Decimal> {
    let sqrt = from_x64(pool.sqrt_price).ok()?;
    let b_per_a = sqrt.checked_mul(sqrt)?;
    if *token_in == pool.token_mint_a {
        Some(b_per_a)
    } else if *token_in == pool.token_mint_b {
        Decimal::ONE.checked_div(b_per_a)
    } else {
        None
    }
}

/// Product of the hop spot prices along a walk.
pub fn walk_mid_price(pools: &[&PoolSnapshot], token_in: &Pubkey) -> Option<Decimal> {
    let mut price = Decimal::ONE;
    let mut current = *token_in;
    for pool in pools {
        price = price.checked_mul(spot_price(pool, &current)?)?;
        current = pool.other_mint(&current)?;
    }
    Some(price)
}

/// Shortfall of the actual output against the mid-price output, in bps (10 000 bps = 100%).
pub fn calculate_price_impact_bps(
    amount_in: u64,
    amount_out: u64,
    mid_price: Decimal,
) -> Option<Decimal> {
    if mid_price.is_zero() || amount_in == 0 {
        return None;
    }
    let expected_out = Decimal::from(amount_in).checked_mul(mid_price)?;
    if expected_out.is_zero() {
        return None;
    }
    let shortfall = expected_out - Decimal::from(amount_out);
    shortfall
        .checked_div(expected_out)?
        .checked_mul(Decimal::new(10_000, 0))
}
