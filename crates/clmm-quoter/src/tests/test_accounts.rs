//! Account layout decoding tests for clmm-quoter.

use super::key;
use crate::data_management::accounts::observation_layout;
use crate::data_management::{decode_account, AccountDecoder, WhirlpoolAccount};
use crate::engine::oracle::{query_tick_at, ObservationBuffer};
use crate::math::constants::ONE_X64;
use crate::types::QuoterError;

fn put(data: &mut [u8], offset: usize, bytes: &[u8]) {
    data[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn whirlpool_bytes() -> Vec<u8> {
    let mut data = vec![0u8; WhirlpoolAccount::LEN];
    put(&mut data, 41, &64u16.to_le_bytes());
    put(&mut data, 45, &3_000u16.to_le_bytes());
    put(&mut data, 49, &123_456_789u128.to_le_bytes());
    put(&mut data, 65, &ONE_X64.to_le_bytes());
    put(&mut data, 81, &(-17i32).to_le_bytes());
    put(&mut data, 101, key(1).as_slice());
    put(&mut data, 181, key(2).as_slice());
    data
}

#[test]
fn test_decode_whirlpool() {
    let account = WhirlpoolAccount::try_decode(&whirlpool_bytes()).unwrap();
    assert_eq!(account.tick_spacing, 64);
    assert_eq!(account.fee_rate, 3_000);
    assert_eq!(account.liquidity, 123_456_789);
    assert_eq!(account.sqrt_price, ONE_X64);
    assert_eq!(account.tick_current_index, -17);

    let snapshot = account.into_snapshot(key(0xa1));
    assert_eq!(snapshot.address, key(0xa1));
    assert_eq!(snapshot.token_mint_a, key(1));
    assert_eq!(snapshot.token_mint_b, key(2));
    assert_eq!(snapshot.fee_rate, 3_000);
}

#[test]
fn test_short_whirlpool_is_rejected() {
    let data = whirlpool_bytes();
    assert!(WhirlpoolAccount::try_decode(&data[..WhirlpoolAccount::LEN - 1]).is_none());
    let err = decode_account::<WhirlpoolAccount>(&key(0xa1), &data[..100]).unwrap_err();
    assert!(matches!(err, QuoterError::Decode(_)));
}

fn observation_bytes(newest_index: u16, samples: &[(u32, i64)]) -> Vec<u8> {
    let mut data = vec![0u8; observation_layout::LEN];
    put(&mut data, observation_layout::NEWEST_INDEX, &newest_index.to_le_bytes());
    for (slot, (timestamp, cumulative)) in samples.iter().enumerate() {
        let base = observation_layout::OBSERVATIONS + slot * observation_layout::STRIDE;
        put(&mut data, base, &timestamp.to_le_bytes());
        put(&mut data, base + 4, &cumulative.to_le_bytes());
    }
    data
}

#[test]
fn test_decode_observations() {
    let data = observation_bytes(1, &[(100, 500), (110, 700)]);
    let buffer = ObservationBuffer::try_decode(&data).unwrap();
    assert_eq!(buffer.newest_index(), 1);
    assert_eq!(buffer.oldest().timestamp, 100);
    assert_eq!(query_tick_at(&buffer, 5, 0, Some(110)).unwrap(), 600);
}

#[test]
fn test_bad_observation_accounts() {
    let data = observation_bytes(100, &[(100, 500)]);
    assert!(ObservationBuffer::try_decode(&data).is_none());
    let data = observation_bytes(0, &[(100, 500)]);
    assert!(ObservationBuffer::try_decode(&data[..observation_layout::LEN - 1]).is_none());
}
