//! Coin-age records: the 52-byte header codec and database persistence.
//!
//! A coin-age record is the unit of stake. The header's stake field carries
//! it length-prefixed: age bytes first, a fixed-width timestamp at offset
//! 20, and the underlying principal at offset 32.

use crate::params::{COIN_AGE_KEY_PREFIX, EXTRA_STAKE};
use crate::{ConsensusError, ConsensusResult};
use aepos_chain_types::Address;
use aepos_storage::Database;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// Width of the length-prefixed age field inside the stake encoding.
const AGE_FIELD: usize = 20;
/// Width of the fixed big-endian timestamp field.
const TIME_FIELD: usize = 12;
/// Longest big-endian integer a length-prefixed field can carry.
const MAX_INT_BYTES: usize = AGE_FIELD - 1;

/// A validator's accumulated stake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinAge {
    /// UNIX seconds of the last update.
    pub time: u64,
    /// Accumulated coin-age in coin-days.
    pub age: BigUint,
    /// Principal that produced the age, used to compute rewards.
    #[serde(default)]
    pub value: BigUint,
}

impl CoinAge {
    /// The empty record.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Serialize into the header's 52-byte stake field.
    ///
    /// Layout: `[len | age BE | pad]` over bytes 0..20, the timestamp as
    /// 12-byte big-endian over bytes 20..32, `[len | value BE | pad]` over
    /// bytes 32..52. The zero record encodes to all zeros.
    pub fn to_bytes(&self) -> [u8; EXTRA_STAKE] {
        let mut out = [0u8; EXTRA_STAKE];
        encode_prefixed(&mut out[..AGE_FIELD], &self.age);
        out[AGE_FIELD..AGE_FIELD + TIME_FIELD].copy_from_slice(&time_bytes(self.time));
        encode_prefixed(&mut out[AGE_FIELD + TIME_FIELD..], &self.value);
        out
    }

    /// Parse a stake field back into a record.
    ///
    /// Fails with [`ConsensusError::InvalidStake`] on any length mismatch.
    pub fn parse(bytes: &[u8]) -> ConsensusResult<Self> {
        if bytes.len() != EXTRA_STAKE {
            return Err(ConsensusError::InvalidStake);
        }
        let age = decode_prefixed(&bytes[..AGE_FIELD])?;
        let time_field = &bytes[AGE_FIELD..AGE_FIELD + TIME_FIELD];
        if time_field[..TIME_FIELD - 8].iter().any(|&b| b != 0) {
            return Err(ConsensusError::InvalidStake);
        }
        let mut time_be = [0u8; 8];
        time_be.copy_from_slice(&time_field[TIME_FIELD - 8..]);
        let value = decode_prefixed(&bytes[AGE_FIELD + TIME_FIELD..])?;
        Ok(Self {
            time: u64::from_be_bytes(time_be),
            age,
            value,
        })
    }
}

fn encode_prefixed(out: &mut [u8], value: &BigUint) {
    if value.is_zero() {
        return;
    }
    let mut bytes = value.to_bytes_be();
    if bytes.len() > MAX_INT_BYTES {
        // Ages are capped upstream; clamping keeps the layout total.
        bytes = vec![0xff; MAX_INT_BYTES];
    }
    out[0] = bytes.len() as u8;
    out[1..1 + bytes.len()].copy_from_slice(&bytes);
}

fn decode_prefixed(field: &[u8]) -> ConsensusResult<BigUint> {
    let len = field[0] as usize;
    if len > MAX_INT_BYTES {
        return Err(ConsensusError::InvalidStake);
    }
    Ok(BigUint::from_bytes_be(&field[1..1 + len]))
}

fn time_bytes(time: u64) -> [u8; TIME_FIELD] {
    let mut out = [0u8; TIME_FIELD];
    out[TIME_FIELD - 8..].copy_from_slice(&time.to_be_bytes());
    out
}

/// Database key of the coin-age record for `addr`.
pub fn coin_age_key(addr: &Address) -> Vec<u8> {
    let mut key = COIN_AGE_KEY_PREFIX.to_vec();
    key.extend_from_slice(addr.as_bytes());
    key
}

/// Load the persisted coin-age of `addr`; `None` when no record exists yet.
pub fn load_coin_age<D: Database>(db: &D, addr: &Address) -> ConsensusResult<Option<CoinAge>> {
    match db.get(&coin_age_key(addr)) {
        Ok(blob) => serde_json::from_slice(&blob)
            .map(Some)
            .map_err(|e| ConsensusError::Codec(e.to_string())),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Persist the coin-age of `addr`.
pub fn save_coin_age<D: Database>(db: &D, addr: &Address, record: &CoinAge) -> ConsensusResult<()> {
    let blob = serde_json::to_vec(record).map_err(|e| ConsensusError::Codec(e.to_string()))?;
    db.put(&coin_age_key(addr), blob)?;
    Ok(())
}

/// Deduct the stake consumed by a finalized block from the minter's stored
/// coin-age, flooring at zero.
pub fn reduce_coin_age<D: Database>(
    db: &D,
    coinbase: &Address,
    consumed: &BigUint,
    now: u64,
) -> ConsensusResult<()> {
    let stored = load_coin_age(db, coinbase)?.unwrap_or_default();
    let age = if stored.age >= *consumed {
        &stored.age - consumed
    } else {
        BigUint::zero()
    };
    save_coin_age(
        db,
        coinbase,
        &CoinAge {
            time: now,
            age,
            value: stored.value,
        },
    )
}
