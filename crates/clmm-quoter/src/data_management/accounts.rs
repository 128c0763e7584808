//! Fixed-layout account decoders for pool and oracle snapshots.
//!
//! Callers pick the decoder for the account type they fetched; nothing here inspects a
//! discriminator to guess the type.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::oracle::{Observation, ObservationBuffer};
use crate::math::constants::OBSERVATION_CAPACITY;
use crate::types::{PoolSnapshot, Pubkey, QuoterError, Result, TickIndex};

/// Decode one account type from its raw bytes; `None` when the bytes do not fit the layout.
pub trait AccountDecoder: Sized {
    fn try_decode(data: &[u8]) -> Option<Self>;
}

/// Like [`AccountDecoder::try_decode`] but reporting which account failed.
pub fn decode_account<T: AccountDecoder>(address: &Pubkey, data: &[u8]) -> Result<T> {
    T::try_decode(data).ok_or_else(|| {
        QuoterError::Decode(format!(
            "account {address} ({} bytes) does not match the {} layout",
            data.len(),
            std::any::type_name::<T>()
        ))
    })
}

fn read_array<const N: usize>(data: &[u8], offset: usize) -> Option<[u8; N]> {
    data.get(offset..offset.checked_add(N)?)?.try_into().ok()
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    read_array(data, offset).map(u16::from_le_bytes)
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    read_array(data, offset).map(u32::from_le_bytes)
}

fn read_i32(data: &[u8], offset: usize) -> Option<i32> {
    read_array(data, offset).map(i32::from_le_bytes)
}

fn read_i64(data: &[u8], offset: usize) -> Option<i64> {
    read_array(data, offset).map(i64::from_le_bytes)
}

fn read_u128(data: &[u8], offset: usize) -> Option<u128> {
    read_array(data, offset).map(u128::from_le_bytes)
}

fn read_pubkey(data: &[u8], offset: usize) -> Option<Pubkey> {
    read_array::<32>(data, offset).map(Pubkey::from)
}

/// Pool account fields the engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhirlpoolAccount {
    pub tick_spacing: u16,
    /// Hundredths of a basis point.
    pub fee_rate: u16,
    pub liquidity: u128,
    pub sqrt_price: u128,
    pub tick_current_index: TickIndex,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
}

impl WhirlpoolAccount {
    pub const LEN: usize = 653;

    const TICK_SPACING: usize = 41;
    const FEE_RATE: usize = 45;
    const LIQUIDITY: usize = 49;
    const SQRT_PRICE: usize = 65;
    const TICK_CURRENT_INDEX: usize = 81;
    const TOKEN_MINT_A: usize = 101;
    const TOKEN_MINT_B: usize = 181;

    pub fn into_snapshot(self, address: Pubkey) -> PoolSnapshot {
        PoolSnapshot {
            address,
            token_mint_a: self.token_mint_a,
            token_mint_b: self.token_mint_b,
            tick_current_index: self.tick_current_index,
            sqrt_price: self.sqrt_price,
            liquidity: self.liquidity,
            tick_spacing: self.tick_spacing,
            fee_rate: u32::from(self.fee_rate),
        }
    }
}

impl AccountDecoder for WhirlpoolAccount {
    fn try_decode(data: &[u8]) -> Option<Self> {
        if data.len() < Self::LEN {
            debug!(len = data.len(), expected = Self::LEN, "pool account too short");
            return None;
        }
        Some(Self {
            tick_spacing: read_u16(data, Self::TICK_SPACING)?,
            fee_rate: read_u16(data, Self::FEE_RATE)?,
            liquidity: read_u128(data, Self::LIQUIDITY)?,
            sqrt_price: read_u128(data, Self::SQRT_PRICE)?,
            tick_current_index: read_i32(data, Self::TICK_CURRENT_INDEX)?,
            token_mint_a: read_pubkey(data, Self::TOKEN_MINT_A)?,
            token_mint_b: read_pubkey(data, Self::TOKEN_MINT_B)?,
        })
    }
}

/// Observation account layout.
pub mod observation_layout {
    pub const LEN: usize = 4483;
    pub const NEWEST_INDEX: usize = 17;
    pub const OBSERVATIONS: usize = 51;
    /// u32 timestamp, i64 tick cumulative, 32 bytes reserved.
    pub const STRIDE: usize = 44;
}

impl AccountDecoder for ObservationBuffer {
    fn try_decode(data: &[u8]) -> Option<Self> {
        use self::observation_layout::{LEN, NEWEST_INDEX, OBSERVATIONS, STRIDE};

        if data.len() < LEN {
            debug!(len = data.len(), expected = LEN, "observation account too short");
            return None;
        }
        let newest_index = read_u16(data, NEWEST_INDEX)?;
        let observations = (0..OBSERVATION_CAPACITY)
            .map(|slot| {
                let base = OBSERVATIONS + slot * STRIDE;
                Some(Observation::new(read_u32(data, base)?, read_i64(data, base + 4)?))
            })
            .collect::<Option<Vec<_>>>()?;
        ObservationBuffer::new(observations, newest_index).ok()
    }
}
