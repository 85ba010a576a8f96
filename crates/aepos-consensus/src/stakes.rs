//! Duplicate-stake detection over a persistent stake map.
//!
//! Every accepted seal records its `(age, time, kernel)` triple under the
//! block hash. A later header presenting the same triple is a replayed
//! stake and is rejected.

use crate::coin_age::CoinAge;
use crate::extra::extract_kernel;
use crate::params::{EXTRA_KERNEL, MAPPED_STAKES_KEY};
use crate::{ConsensusError, ConsensusResult};
use aepos_chain_types::{Hash256, Header};
use aepos_storage::Database;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A recorded stake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    /// Block number of the staking header.
    pub number: u64,
    /// Hash of the staking header.
    pub hash: Hash256,
    /// Timestamp of the stake, i.e. the stake field's `time`.
    pub timestamp: u64,
    /// Kernel bytes published by the header.
    #[serde(with = "hex::serde")]
    pub kernel: Vec<u8>,
    /// Staked coin-age.
    pub stake: BigUint,
}

/// In-memory view of the persistent duplicate-stake map.
#[derive(Debug, Clone, Default)]
pub struct StakeMap {
    records: HashMap<Hash256, StakeRecord>,
}

impl StakeMap {
    /// Load the map from the database; a missing record yields an empty map.
    pub fn load<D: Database>(db: &D) -> ConsensusResult<Self> {
        let blob = match db.get(MAPPED_STAKES_KEY) {
            Ok(blob) => blob,
            Err(e) if e.is_not_found() => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let records: Vec<StakeRecord> =
            serde_json::from_slice(&blob).map_err(|e| ConsensusError::Codec(e.to_string()))?;
        Ok(Self {
            records: records.into_iter().map(|r| (r.hash, r)).collect(),
        })
    }

    /// Persist the map.
    pub fn store<D: Database>(&self, db: &D) -> ConsensusResult<()> {
        let records: Vec<&StakeRecord> = self.records.values().collect();
        let blob =
            serde_json::to_vec(&records).map_err(|e| ConsensusError::Codec(e.to_string()))?;
        db.put(MAPPED_STAKES_KEY, blob)?;
        Ok(())
    }

    /// Whether a prior record carries the same `(age, time, kernel)` triple.
    pub fn is_duplicate(&self, stake: &CoinAge, kernel: &[u8]) -> bool {
        self.records.values().any(|r| {
            r.stake == stake.age && r.timestamp == stake.time && r.kernel == kernel
        })
    }

    /// Record the stake published by `header`.
    pub fn insert(&mut self, header: &Header, stake: &CoinAge) -> ConsensusResult<()> {
        let mut kernel = vec![0u8; EXTRA_KERNEL];
        kernel.copy_from_slice(extract_kernel(header)?);
        self.records.insert(
            header.hash(),
            StakeRecord {
                number: header.number,
                hash: header.hash(),
                timestamp: stake.time,
                kernel,
                stake: stake.age.clone(),
            },
        );
        Ok(())
    }

    /// Whether a record exists for the given block hash.
    pub fn contains(&self, hash: &Hash256) -> bool {
        self.records.contains_key(hash)
    }

    /// Number of recorded stakes.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{EXTRA_LENGTH, EXTRA_SEAL, EXTRA_STAKE};
    use aepos_storage::MemoryDb;

    fn header_with_kernel(number: u64, fill: u8) -> Header {
        let mut header = Header {
            number,
            time: 1_513_083_600 + number,
            extra: vec![0u8; EXTRA_LENGTH],
            ..Default::default()
        };
        let end = EXTRA_LENGTH - EXTRA_SEAL - EXTRA_STAKE;
        header.extra[end - EXTRA_KERNEL..end].fill(fill);
        header
    }

    fn stake(time: u64, age: u64) -> CoinAge {
        CoinAge {
            time,
            age: BigUint::from(age),
            value: BigUint::default(),
        }
    }

    #[test]
    fn duplicate_is_value_equality() {
        let db = MemoryDb::new();
        let mut map = StakeMap::load(&db).unwrap();
        let header = header_with_kernel(5, 0xab);
        map.insert(&header, &stake(1000, 77)).unwrap();

        let kernel = vec![0xab; EXTRA_KERNEL];
        // Same triple, freshly-constructed values.
        assert!(map.is_duplicate(&stake(1000, 77), &kernel));
        // Any differing component breaks the match.
        assert!(!map.is_duplicate(&stake(1000, 78), &kernel));
        assert!(!map.is_duplicate(&stake(1001, 77), &kernel));
        assert!(!map.is_duplicate(&stake(1000, 77), &vec![0xac; EXTRA_KERNEL]));
    }

    #[test]
    fn persistence_roundtrip() {
        let db = MemoryDb::new();
        let mut map = StakeMap::load(&db).unwrap();
        assert!(map.is_empty());

        let header = header_with_kernel(9, 0xcd);
        map.insert(&header, &stake(2000, 31)).unwrap();
        map.store(&db).unwrap();

        let reloaded = StakeMap::load(&db).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.contains(&header.hash()));
        assert!(reloaded.is_duplicate(&stake(2000, 31), &vec![0xcd; EXTRA_KERNEL]));
    }

    #[test]
    fn missing_map_loads_empty() {
        let db = MemoryDb::new();
        assert!(StakeMap::load(&db).unwrap().is_empty());
    }
}
