//! Per-block coin-age accumulation.
//!
//! Scans a block's transactions and computes how many coin-seconds (and how
//! much principal) they contribute to a given validator, subject to the
//! fermentation rule. Sums are signed: outgoing transfers deduct.

use crate::params::{CENT_VALUE, COIN_VALUE, DISTRIBUTION_WEIGHT};
use aepos_chain_types::{Address, Block};
use num_bigint::BigInt;
use num_traits::Zero;

/// Signed coin-age contribution of one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockAgeDelta {
    /// Coin-seconds gained or lost.
    pub age: BigInt,
    /// Principal gained or lost, in wei.
    pub value: BigInt,
}

/// Coin-seconds `block` contributes to `validator`, given the block's age
/// `time_diff` (seconds since it was minted).
///
/// Regular transfers only count once older than `fermentation`; grants from
/// the distribution account always count, amplified a hundredfold. A
/// transaction whose sender cannot be recovered is treated as anonymous and
/// only its recipient side applies.
pub fn block_age(
    block: &Block,
    validator: &Address,
    distribution: &Address,
    time_diff: u64,
    fermentation: u64,
) -> BlockAgeDelta {
    let mut delta = BlockAgeDelta::default();
    let fermented = time_diff > fermentation;

    for tx in &block.transactions {
        let sender = tx.sender().ok();
        let value = BigInt::from(tx.value.clone());

        if sender.as_ref() == Some(validator) {
            if fermented {
                delta.age -= &value * time_diff / CENT_VALUE;
                delta.value -= &value;
            }
            continue;
        }

        let to_validator = tx.to.as_ref() == Some(validator);

        if sender.as_ref() == Some(distribution) && to_validator {
            delta.age += &value * time_diff * DISTRIBUTION_WEIGHT / CENT_VALUE;
            delta.value += &value;
            continue;
        }

        if to_validator && fermented {
            delta.age += &value * time_diff / CENT_VALUE;
            delta.value += &value;
        }
    }

    delta
}

/// Convert coin-seconds into coin-days.
pub fn coin_seconds_to_days(coin_seconds: &BigInt) -> BigInt {
    coin_seconds * CENT_VALUE / (COIN_VALUE / (24 * 60 * 60))
}
