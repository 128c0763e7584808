//! Exact on-chain arithmetic: Q64.64 fixed point, tick math, liquidity conversion.

pub mod constants;
pub mod fixed_point;
pub mod liquidity;
pub mod tick_math;

pub use constants::*;
pub use fixed_point::{
    div_round_up, from_x64, mul_div_ceil, mul_div_floor, shift_right_round_up, to_x64, WideUint,
};
pub use liquidity::{
    estimate_liquidity_for_token_a, estimate_liquidity_for_token_b,
    estimate_liquidity_from_token_amounts, get_token_amounts_from_liquidity,
};
pub use tick_math::{
    initializable_tick_index, price_from_sqrt_price_x64, price_from_tick_index,
    sqrt_price_from_tick_index, tick_index_from_sqrt_price,
};
