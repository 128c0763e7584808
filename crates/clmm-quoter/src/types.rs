//! Common types, error handling, and data models shared across modules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 32-byte account address (pool, mint, oracle).
pub type Pubkey = alloy_primitives::B256;

/// Discrete log-scale price coordinate, price = 1.0001^tick.
pub type TickIndex = i32;

/// Square root of price in unsigned Q64.64 fixed point.
pub type SqrtPriceX64 = u128;

/// Per-range liquidity invariant.
pub type Liquidity = u128;

/// Common error type for the quoting engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoterError {
    /// Malformed tick or price bounds.
    #[error("invalid range: {0}")]
    InvalidRange(String),
    /// A computed or supplied tick lies outside the protocol tick bounds.
    #[error("value out of bounds: {0}")]
    OutOfBounds(String),
    /// The requested window predates the oldest oracle observation.
    #[error("insufficient oracle history: target {target} predates oldest observation {oldest}")]
    InsufficientHistory { target: i64, oldest: i64 },
    /// Arithmetic would exceed the representable width.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    #[error("division by zero in {0}")]
    DivisionByZero(&'static str),
    /// Walks exist for the pair but every candidate was excluded.
    #[error("no viable route: {0} candidate(s) excluded")]
    NoViableRoute(usize),
    #[error("account decode error: {0}")]
    Decode(String),
}

impl QuoterError {
    /// Only a too-wide oracle window can be fixed by retrying (with a smaller window).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, QuoterError::InsufficientHistory { .. })
    }
}

pub type Result<T> = std::result::Result<T, QuoterError>;

/// Pair of token amounts, A then B.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmounts {
    pub token_a: u64,
    pub token_b: u64,
}

impl TokenAmounts {
    pub fn new(token_a: u64, token_b: u64) -> Self {
        Self { token_a, token_b }
    }
}

/// Read-only view of a pool as seen by the quoting engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub address: Pubkey,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
    pub tick_current_index: TickIndex,
    pub sqrt_price: SqrtPriceX64,
    pub liquidity: Liquidity,
    pub tick_spacing: u16,
    /// Hundredths of a basis point, 1_000_000 = 100%.
    pub fee_rate: u32,
}

impl PoolSnapshot {
    /// The mint on the other side of `mint`, if this pool trades it.
    pub fn other_mint(&self, mint: &Pubkey) -> Option<Pubkey> {
        if *mint == self.token_mint_a {
            Some(self.token_mint_b)
        } else if *mint == self.token_mint_b {
            Some(self.token_mint_a)
        } else {
            None
        }
    }
}

/// Request for an exact-in quote between two mints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub token_in: Pubkey,
    pub token_out: Pubkey,
    pub amount_in: u64,
}
