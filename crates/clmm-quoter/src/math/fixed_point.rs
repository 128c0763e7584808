//! Q64.64 conversions and rounding primitives.
//!
//! Integer paths never touch floating point. Intermediates that can exceed 128 bits
//! (sqrt price x amount x 2^64) are carried in [`WideUint`].

use alloy_primitives::aliases::U512;
use num_bigint::BigUint;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::math::constants::ONE_X64;
use crate::types::{QuoterError, Result};

/// 512-bit unsigned integer for intermediates.
pub type WideUint = U512;

const X64_FRACTION_MASK: u128 = ONE_X64 - 1;

/// floor(value * 2^64).
pub fn to_x64(value: Decimal) -> Result<u128> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(QuoterError::InvalidRange(format!(
            "cannot represent negative value {value} in Q64.64"
        )));
    }
    let mantissa = BigUint::from(value.mantissa().unsigned_abs());
    let scale = BigUint::from(10u32).pow(value.scale());
    ((mantissa << 64u32) / scale)
        .to_u128()
        .ok_or(QuoterError::Overflow("to_x64"))
}

/// value / 2^64. The integer part is exact; the fraction is rounded to Decimal precision.
pub fn from_x64(value: u128) -> Result<Decimal> {
    let whole = Decimal::from((value >> 64) as u64);
    let fraction = Decimal::from((value & X64_FRACTION_MASK) as u64);
    let denominator = Decimal::from_u128(ONE_X64).ok_or(QuoterError::Overflow("from_x64"))?;
    let fraction = fraction
        .checked_div(denominator)
        .ok_or(QuoterError::Overflow("from_x64"))?;
    whole
        .checked_add(fraction)
        .ok_or(QuoterError::Overflow("from_x64"))
}

/// ceil(n / 2^64).
pub fn shift_right_round_up(n: WideUint) -> WideUint {
    let truncated = n >> 64;
    if n & WideUint::from(X64_FRACTION_MASK) == WideUint::ZERO {
        truncated
    } else {
        // cannot wrap: the shift freed the top 64 bits
        truncated + WideUint::from(1u8)
    }
}

/// ceil(n0 / n1).
pub fn div_round_up(n0: WideUint, n1: WideUint) -> Result<WideUint> {
    if n1 == WideUint::ZERO {
        return Err(QuoterError::DivisionByZero("div_round_up"));
    }
    let (quotient, remainder) = n0.div_rem(n1);
    if remainder == WideUint::ZERO {
        Ok(quotient)
    } else {
        Ok(quotient + WideUint::from(1u8))
    }
}

/// floor(a * b / denominator) with a 512-bit product.
pub fn mul_div_floor(a: u128, b: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(QuoterError::DivisionByZero("mul_div_floor"));
    }
    let product = WideUint::from(a) * WideUint::from(b);
    narrow_u128(product / WideUint::from(denominator), "mul_div_floor")
}

/// ceil(a * b / denominator) with a 512-bit product.
pub fn mul_div_ceil(a: u128, b: u128, denominator: u128) -> Result<u128> {
    let product = WideUint::from(a) * WideUint::from(b);
    narrow_u128(
        div_round_up(product, WideUint::from(denominator))?,
        "mul_div_ceil",
    )
}

pub(crate) fn narrow_u128(value: WideUint, context: &'static str) -> Result<u128> {
    u128::try_from(value).map_err(|_| QuoterError::Overflow(context))
}

pub(crate) fn narrow_u64(value: WideUint, context: &'static str) -> Result<u64> {
    u64::try_from(value).map_err(|_| QuoterError::Overflow(context))
}
