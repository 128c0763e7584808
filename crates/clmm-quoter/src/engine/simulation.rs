//! Exact-in swap estimate against a pool snapshot.
//!
//! The snapshot carries no tick arrays, so a hop is priced inside the current liquidity
//! range only. A swap that would push the price past the protocol bounds is unquotable.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::math::constants::{FEE_RATE_DENOMINATOR, MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64};
use crate::math::fixed_point::{div_round_up, narrow_u128, WideUint};
use crate::math::liquidity::{token_a_delta, token_b_delta};
use crate::types::{PoolSnapshot, Pubkey, QuoterError, Result, SqrtPriceX64};

/// Result of pushing `amount_in` through one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopQuote {
    pub pool: Pubkey,
    pub token_in: Pubkey,
    pub token_out: Pubkey,
    pub amount_in: u64,
    pub amount_out: u64,
    pub fee_amount: u64,
    pub sqrt_price_before: SqrtPriceX64,
    pub sqrt_price_after: SqrtPriceX64,
}

// ceil(L * P * 2^64 / (L * 2^64 + amount * P))
fn next_sqrt_price_from_a(
    sqrt_price: SqrtPriceX64,
    liquidity: u128,
    amount: u64,
) -> Result<SqrtPriceX64> {
    let liquidity_x64 = WideUint::from(liquidity) << 64;
    let numerator = liquidity_x64 * WideUint::from(sqrt_price);
    let denominator = liquidity_x64 + WideUint::from(amount) * WideUint::from(sqrt_price);
    narrow_u128(div_round_up(numerator, denominator)?, "next_sqrt_price_from_a")
}

// P + floor(amount * 2^64 / L)
fn next_sqrt_price_from_b(
    sqrt_price: SqrtPriceX64,
    liquidity: u128,
    amount: u64,
) -> Result<SqrtPriceX64> {
    let delta = (WideUint::from(amount) << 64) / WideUint::from(liquidity);
    narrow_u128(WideUint::from(sqrt_price) + delta, "next_sqrt_price_from_b")
}

/// Quote `amount_in` of `token_in` through `pool`.
///
/// `Ok(None)` marks a hop that cannot be filled from the snapshot (wrong mint, no
/// liquidity, price leaving the protocol bounds, or nothing out after rounding).
pub fn simulate_hop(pool: &PoolSnapshot, token_in: &Pubkey, amount_in: u64) -> Result<Option<HopQuote>> {
    let Some(token_out) = pool.other_mint(token_in) else {
        return Ok(None);
    };
    if pool.liquidity == 0 || amount_in == 0 {
        return Ok(None);
    }
    if pool.fee_rate > FEE_RATE_DENOMINATOR {
        return Err(QuoterError::InvalidRange(format!(
            "fee rate {} exceeds {FEE_RATE_DENOMINATOR}",
            pool.fee_rate
        )));
    }

    let fee_amount = div_round_up(
        WideUint::from(amount_in) * WideUint::from(pool.fee_rate),
        WideUint::from(FEE_RATE_DENOMINATOR),
    )?;
    // fee_rate <= denominator so the fee never exceeds the input
    let fee_amount = u64::try_from(fee_amount).map_err(|_| QuoterError::Overflow("fee_amount"))?;
    let amount_after_fee = amount_in - fee_amount;

    let a_to_b = *token_in == pool.token_mint_a;
    let sqrt_price = pool.sqrt_price;
    let (sqrt_price_after, amount_out) = if a_to_b {
        let next = next_sqrt_price_from_a(sqrt_price, pool.liquidity, amount_after_fee)?;
        if next < MIN_SQRT_PRICE_X64 {
            debug!(pool = %pool.address, "swap would cross the minimum sqrt price");
            return Ok(None);
        }
        (next, token_b_delta(pool.liquidity, next, sqrt_price, false)?)
    } else {
        let next = next_sqrt_price_from_b(sqrt_price, pool.liquidity, amount_after_fee)?;
        if next > MAX_SQRT_PRICE_X64 {
            debug!(pool = %pool.address, "swap would cross the maximum sqrt price");
            return Ok(None);
        }
        (next, token_a_delta(pool.liquidity, sqrt_price, next, false)?)
    };

    if amount_out == 0 {
        return Ok(None);
    }

    Ok(Some(HopQuote {
        pool: pool.address,
        token_in: *token_in,
        token_out,
        amount_in,
        amount_out,
        fee_amount,
        sqrt_price_before: sqrt_price,
        sqrt_price_after,
    }))
}

/// Chain hops along `pools`, feeding each output into the next input.
pub fn simulate_walk(
    pools: &[&PoolSnapshot],
    token_in: &Pubkey,
    amount_in: u64,
) -> Result<Option<Vec<HopQuote>>> {
    let mut hops = Vec::with_capacity(pools.len());
    let mut current_token = *token_in;
    let mut current_amount = amount_in;
    for pool in pools {
        match simulate_hop(pool, &current_token, current_amount)? {
            Some(hop) => {
                current_token = hop.token_out;
                current_amount = hop.amount_out;
                hops.push(hop);
            }
            None => return Ok(None),
        }
    }
    Ok(Some(hops))
}
