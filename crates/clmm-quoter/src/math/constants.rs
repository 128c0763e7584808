//! Protocol constants. These mirror the on-chain program and must not drift.

use crate::types::{SqrtPriceX64, TickIndex};

pub const MIN_TICK: TickIndex = -443_636;
pub const MAX_TICK: TickIndex = 443_636;

/// sqrt(1.0001^MIN_TICK) in Q64.64.
pub const MIN_SQRT_PRICE_X64: SqrtPriceX64 = 4_295_048_016;
/// sqrt(1.0001^MAX_TICK) in Q64.64.
pub const MAX_SQRT_PRICE_X64: SqrtPriceX64 = 79_226_673_515_401_279_992_447_579_055;

/// 1.0 in Q64.64.
pub const ONE_X64: u128 = 1 << 64;

/// Slots in an oracle observation account.
pub const OBSERVATION_CAPACITY: usize = 100;

/// Fee rates are expressed in hundredths of a basis point.
pub const FEE_RATE_DENOMINATOR: u32 = 1_000_000;

/// Deepest walk the route enumerator will produce.
pub const MAX_SUPPORTED_HOPS: usize = 2;
