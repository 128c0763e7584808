//! Tick index <-> sqrt price conversion in Q64.64.

use rust_decimal::Decimal;

use crate::math::constants::{MAX_SQRT_PRICE_X64, MAX_TICK, MIN_SQRT_PRICE_X64, MIN_TICK, ONE_X64};
use crate::math::fixed_point::{from_x64, narrow_u128, WideUint};
use crate::types::{QuoterError, Result, SqrtPriceX64, TickIndex};

// sqrt(1.0001)^(2^i) in Q32.96, floored, i = 0..=18
const POSITIVE_TICK_FACTORS: [u128; 19] = [
    79232123823359799118286999567,
    79236085330515764027303304731,
    79244008939048815603706035061,
    79259858533276714757314932305,
    79291567232598584799939703904,
    79355022692464371645785046466,
    79482085999252804386437311141,
    79736823300114093921829183326,
    80248749790819932309965073892,
    81282483887344747381513967011,
    83390072131320151908154831281,
    87770609709833776024991924138,
    97234110755111693312479820773,
    119332217159966728226237229890,
    179736315981702064433883588727,
    407748233172238350107850275304,
    2098478828474011932436660412517,
    55581415166113811149459800483533,
    38992368544603139932233054999993551,
];

// sqrt(1.0001)^-(2^i) in Q64.64, floored, i = 0..=18
const NEGATIVE_TICK_FACTORS: [u128; 19] = [
    18445821805675392311,
    18444899583751176498,
    18443055278223354162,
    18439367220385604838,
    18431993317065449817,
    18417254355718160513,
    18387811781193591352,
    18329067761203520168,
    18212142134806087854,
    17980523815641551639,
    17526086738831147013,
    16651378430235024244,
    15030750278693429944,
    12247334978882834399,
    8131365268884726200,
    3584323654723342297,
    696457651847595233,
    26294789957452057,
    37481735321082,
];

fn check_tick(tick: TickIndex) -> Result<()> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(QuoterError::OutOfBounds(format!(
            "tick {tick} outside [{MIN_TICK}, {MAX_TICK}]"
        )));
    }
    Ok(())
}

fn sqrt_price_positive_tick(tick: u32) -> Result<SqrtPriceX64> {
    // Q32.96 accumulator, floored after every step
    let mut ratio = WideUint::from(1u8) << 96;
    for (bit, factor) in POSITIVE_TICK_FACTORS.iter().enumerate() {
        if tick & (1 << bit) != 0 {
            ratio = (ratio * WideUint::from(*factor)) >> 96;
        }
    }
    narrow_u128(ratio >> 32, "sqrt_price_from_tick_index")
}

fn sqrt_price_negative_tick(abs_tick: u32) -> SqrtPriceX64 {
    // ratio <= 2^64 and every factor < 2^64, so the product stays within u128
    let mut ratio = ONE_X64;
    for (bit, factor) in NEGATIVE_TICK_FACTORS.iter().enumerate() {
        if abs_tick & (1 << bit) != 0 {
            ratio = (ratio * factor) >> 64;
        }
    }
    ratio
}

/// sqrt(1.0001^tick) * 2^64, bit-exact with the on-chain program.
///
/// Both branches floor; `MIN_TICK` and `MAX_TICK` land exactly on
/// `MIN_SQRT_PRICE_X64` and `MAX_SQRT_PRICE_X64`.
pub fn sqrt_price_from_tick_index(tick: TickIndex) -> Result<SqrtPriceX64> {
    check_tick(tick)?;
    if tick >= 0 {
        sqrt_price_positive_tick(tick.unsigned_abs())
    } else {
        Ok(sqrt_price_negative_tick(tick.unsigned_abs()))
    }
}

/// Largest tick whose sqrt price does not exceed `sqrt_price`.
pub fn tick_index_from_sqrt_price(sqrt_price: SqrtPriceX64) -> Result<TickIndex> {
    if !(MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price) {
        return Err(QuoterError::OutOfBounds(format!(
            "sqrt price {sqrt_price} outside [{MIN_SQRT_PRICE_X64}, {MAX_SQRT_PRICE_X64}]"
        )));
    }

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if sqrt_price_from_tick_index(mid)? <= sqrt_price {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    Ok(low)
}

/// Human price of token A in token B, adjusted for mint decimals.
pub fn price_from_sqrt_price_x64(
    sqrt_price: SqrtPriceX64,
    decimals_a: u8,
    decimals_b: u8,
) -> Result<Decimal> {
    let sqrt = from_x64(sqrt_price)?;
    let raw = sqrt
        .checked_mul(sqrt)
        .ok_or(QuoterError::Overflow("price_from_sqrt_price_x64"))?;
    let shift = i32::from(decimals_a) - i32::from(decimals_b);
    let scale = 10u64
        .checked_pow(shift.unsigned_abs())
        .map(Decimal::from)
        .ok_or(QuoterError::Overflow("price_from_sqrt_price_x64"))?;
    let adjusted = if shift >= 0 {
        raw.checked_mul(scale)
    } else {
        raw.checked_div(scale)
    };
    adjusted.ok_or(QuoterError::Overflow("price_from_sqrt_price_x64"))
}

pub fn price_from_tick_index(tick: TickIndex, decimals_a: u8, decimals_b: u8) -> Result<Decimal> {
    price_from_sqrt_price_x64(sqrt_price_from_tick_index(tick)?, decimals_a, decimals_b)
}

/// Round `tick` toward negative infinity to a multiple of `tick_spacing`.
pub fn initializable_tick_index(tick: TickIndex, tick_spacing: u16) -> Result<TickIndex> {
    if tick_spacing == 0 {
        return Err(QuoterError::InvalidRange("tick spacing must be positive".into()));
    }
    let spacing = i32::from(tick_spacing);
    Ok(tick - tick.rem_euclid(spacing))
}
