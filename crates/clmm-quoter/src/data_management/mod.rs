pub mod accounts;

pub use accounts::{decode_account, AccountDecoder, WhirlpoolAccount};
