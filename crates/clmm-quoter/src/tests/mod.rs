mod test_accounts;
mod test_graph;
mod test_price;

use crate::math::constants::ONE_X64;
use crate::types::{PoolSnapshot, Pubkey};

pub(crate) fn key(byte: u8) -> Pubkey {
    Pubkey::repeat_byte(byte)
}

/// Pool at price 1.0 between `mint_a` and `mint_b`.
pub(crate) fn pool(address: u8, mint_a: u8, mint_b: u8, liquidity: u128) -> PoolSnapshot {
    PoolSnapshot {
        address: key(address),
        token_mint_a: key(mint_a),
        token_mint_b: key(mint_b),
        tick_current_index: 0,
        sqrt_price: ONE_X64,
        liquidity,
        tick_spacing: 64,
        fee_rate: 0,
    }
}
