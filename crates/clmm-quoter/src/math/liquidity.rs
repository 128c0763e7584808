//! Liquidity <-> token amount conversion across the three price regions.
//!
//! For a range [Pl, Pu] and current price Pc:
//! - Pc below the range: only token A, `a = L * (√Pu - √Pl) / (√Pl * √Pu)`
//! - Pc inside the range: both tokens, A against [Pc, Pu] and B against [Pl, Pc]
//! - Pc at or above the range: only token B, `b = L * (√Pu - √Pl)`

use crate::math::fixed_point::{div_round_up, narrow_u128, narrow_u64, shift_right_round_up, WideUint};
use crate::math::tick_math::sqrt_price_from_tick_index;
use crate::types::{Liquidity, QuoterError, Result, SqrtPriceX64, TickIndex, TokenAmounts};

fn ordered(sqrt_price_1: SqrtPriceX64, sqrt_price_2: SqrtPriceX64) -> Result<(WideUint, WideUint, WideUint)> {
    let lower = sqrt_price_1.min(sqrt_price_2);
    let upper = sqrt_price_1.max(sqrt_price_2);
    if lower == upper {
        return Err(QuoterError::InvalidRange(format!(
            "zero-width price range at sqrt price {lower}"
        )));
    }
    Ok((
        WideUint::from(lower),
        WideUint::from(upper),
        WideUint::from(upper - lower),
    ))
}

/// Liquidity supported by `amount` of token A over the range, rounded down.
pub fn estimate_liquidity_for_token_a(
    sqrt_price_1: SqrtPriceX64,
    sqrt_price_2: SqrtPriceX64,
    amount: u64,
) -> Result<Liquidity> {
    let (lower, upper, delta) = ordered(sqrt_price_1, sqrt_price_2)?;
    let numerator = (WideUint::from(amount) * upper * lower) >> 64;
    narrow_u128(numerator / delta, "estimate_liquidity_for_token_a")
}

/// Liquidity supported by `amount` of token B over the range, rounded down.
pub fn estimate_liquidity_for_token_b(
    sqrt_price_1: SqrtPriceX64,
    sqrt_price_2: SqrtPriceX64,
    amount: u64,
) -> Result<Liquidity> {
    let (_, _, delta) = ordered(sqrt_price_1, sqrt_price_2)?;
    let numerator = WideUint::from(amount) << 64;
    narrow_u128(numerator / delta, "estimate_liquidity_for_token_b")
}

/// Largest liquidity whose deposit needs no more than `amounts` of either token.
pub fn estimate_liquidity_from_token_amounts(
    current_tick: TickIndex,
    lower_tick: TickIndex,
    upper_tick: TickIndex,
    amounts: TokenAmounts,
) -> Result<Liquidity> {
    if upper_tick < lower_tick {
        return Err(QuoterError::InvalidRange(format!(
            "upper tick {upper_tick} is below lower tick {lower_tick}"
        )));
    }

    let current_sqrt_price = sqrt_price_from_tick_index(current_tick)?;
    let lower_sqrt_price = sqrt_price_from_tick_index(lower_tick)?;
    let upper_sqrt_price = sqrt_price_from_tick_index(upper_tick)?;

    if current_tick >= upper_tick {
        estimate_liquidity_for_token_b(upper_sqrt_price, lower_sqrt_price, amounts.token_b)
    } else if current_tick < lower_tick {
        estimate_liquidity_for_token_a(lower_sqrt_price, upper_sqrt_price, amounts.token_a)
    } else if current_tick == lower_tick {
        // no token B is held at the lower bound
        estimate_liquidity_for_token_a(current_sqrt_price, upper_sqrt_price, amounts.token_a)
    } else {
        let from_a =
            estimate_liquidity_for_token_a(current_sqrt_price, upper_sqrt_price, amounts.token_a)?;
        let from_b =
            estimate_liquidity_for_token_b(current_sqrt_price, lower_sqrt_price, amounts.token_b)?;
        Ok(from_a.min(from_b))
    }
}

// L * (√Pu - √Pl) * 2^64 / (√Pl * √Pu)
pub(crate) fn token_a_delta(
    liquidity: Liquidity,
    lower: SqrtPriceX64,
    upper: SqrtPriceX64,
    round_up: bool,
) -> Result<u64> {
    let numerator =
        (WideUint::from(liquidity) << 64) * WideUint::from(upper - lower);
    let denominator = WideUint::from(lower) * WideUint::from(upper);
    if denominator == WideUint::ZERO {
        return Err(QuoterError::DivisionByZero("token_a_delta"));
    }
    let amount = if round_up {
        div_round_up(numerator, denominator)?
    } else {
        numerator / denominator
    };
    narrow_u64(amount, "token_a_delta")
}

// L * (√Pu - √Pl) / 2^64
pub(crate) fn token_b_delta(
    liquidity: Liquidity,
    lower: SqrtPriceX64,
    upper: SqrtPriceX64,
    round_up: bool,
) -> Result<u64> {
    let product = WideUint::from(liquidity) * WideUint::from(upper - lower);
    let amount = if round_up {
        shift_right_round_up(product)
    } else {
        product >> 64
    };
    narrow_u64(amount, "token_b_delta")
}

/// Token amounts represented by `liquidity` at `current_sqrt_price`.
///
/// `round_up = true` is for deposits (the pool is never short-changed),
/// `round_up = false` for withdrawals (the pool never pays out more than it holds).
pub fn get_token_amounts_from_liquidity(
    liquidity: Liquidity,
    current_sqrt_price: SqrtPriceX64,
    lower_sqrt_price: SqrtPriceX64,
    upper_sqrt_price: SqrtPriceX64,
    round_up: bool,
) -> Result<TokenAmounts> {
    if upper_sqrt_price <= lower_sqrt_price {
        return Err(QuoterError::InvalidRange(format!(
            "upper sqrt price {upper_sqrt_price} must exceed lower sqrt price {lower_sqrt_price}"
        )));
    }

    if current_sqrt_price < lower_sqrt_price {
        Ok(TokenAmounts::new(
            token_a_delta(liquidity, lower_sqrt_price, upper_sqrt_price, round_up)?,
            0,
        ))
    } else if current_sqrt_price < upper_sqrt_price {
        Ok(TokenAmounts::new(
            token_a_delta(liquidity, current_sqrt_price, upper_sqrt_price, round_up)?,
            token_b_delta(liquidity, lower_sqrt_price, current_sqrt_price, round_up)?,
        ))
    } else {
        Ok(TokenAmounts::new(
            0,
            token_b_delta(liquidity, lower_sqrt_price, upper_sqrt_price, round_up)?,
        ))
    }
}
