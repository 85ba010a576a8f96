//! Header signing hash and minter recovery.
//!
//! The seal is a clique-style signature: the header is RLP-encoded with the
//! 65-byte seal suffix stripped from the extra region, keccak-hashed, and
//! signed with the minter's key. Recovery memoizes per header hash.

use crate::params::{EXTRA_LENGTH, EXTRA_SEAL, IN_MEMORY_SIGNATURES};
use crate::{ConsensusError, ConsensusResult};
use aepos_chain_types::{keccak256, recover_address, Address, Hash256, Header};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Hash signed over by the minter: the header RLP with the seal removed.
///
/// Requires the extra region to hold at least the seal, so that a header
/// can never be hashed ambiguously with and without its signature.
pub fn sig_hash(header: &Header) -> ConsensusResult<Hash256> {
    let len = header.extra.len();
    if len < EXTRA_SEAL {
        return Err(ConsensusError::MissingSignature);
    }
    Ok(keccak256(
        &header.rlp_with_extra(&header.extra[..len - EXTRA_SEAL]),
    ))
}

/// Recovered-minter cache keyed by header hash.
pub struct SignatureCache {
    recovered: Mutex<LruCache<Hash256, Address>>,
}

impl SignatureCache {
    /// Create a cache holding the most recent `IN_MEMORY_SIGNATURES`
    /// recoveries.
    pub fn new() -> Self {
        Self::with_capacity(IN_MEMORY_SIGNATURES)
    }

    /// Create a cache with a custom capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            recovered: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Extract the minter address from a sealed header.
    pub fn ecrecover(&self, header: &Header) -> ConsensusResult<Address> {
        let hash = header.hash();
        if let Some(addr) = self.recovered.lock().get(&hash) {
            return Ok(*addr);
        }

        if header.extra.len() < EXTRA_LENGTH {
            return Err(ConsensusError::MissingSignature);
        }
        let signature = &header.extra[header.extra.len() - EXTRA_SEAL..];
        let signer = recover_address(&sig_hash(header)?, signature)?;

        self.recovered.lock().put(hash, signer);
        Ok(signer)
    }
}

impl Default for SignatureCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extra::{init_extra, write_seal};
    use aepos_chain_types::{sign_recoverable, SigningKey};

    fn test_key() -> SigningKey {
        SigningKey::from_slice(
            &hex::decode("b71c71a67e1177ad4e901695e1b4b9ee17ae16c6668d313eac2f96dbcda3f291")
                .unwrap(),
        )
        .unwrap()
    }

    fn key_address(key: &SigningKey) -> Address {
        let point = key.verifying_key().to_encoded_point(false);
        let digest = keccak256(&point.as_bytes()[1..]);
        Address::from_slice(&digest.as_bytes()[12..]).unwrap()
    }

    fn sealed_header(key: &SigningKey) -> Header {
        let mut header = Header {
            number: 3,
            time: 1_513_083_630,
            ..Default::default()
        };
        init_extra(&mut header);
        let hash = sig_hash(&header).unwrap();
        let signature = sign_recoverable(key, &hash).unwrap();
        write_seal(&mut header, &signature);
        header
    }

    #[test]
    fn sig_hash_ignores_the_seal() {
        let key = test_key();
        let sealed = sealed_header(&key);
        let mut unsealed = sealed.clone();
        let len = unsealed.extra.len();
        unsealed.extra[len - EXTRA_SEAL..].fill(0);

        assert_eq!(sig_hash(&sealed).unwrap(), sig_hash(&unsealed).unwrap());
        // The block hash, in contrast, covers the seal.
        assert_ne!(sealed.hash(), unsealed.hash());
    }

    #[test]
    fn sig_hash_requires_seal_room() {
        let header = Header {
            extra: vec![0u8; EXTRA_SEAL - 1],
            ..Default::default()
        };
        assert!(matches!(
            sig_hash(&header),
            Err(ConsensusError::MissingSignature)
        ));
    }

    #[test]
    fn ecrecover_identifies_the_minter() {
        let key = test_key();
        let header = sealed_header(&key);
        let cache = SignatureCache::new();

        assert_eq!(cache.ecrecover(&header).unwrap(), key_address(&key));
        // Second recovery is served from the cache.
        assert_eq!(cache.ecrecover(&header).unwrap(), key_address(&key));
    }

    #[test]
    fn ecrecover_rejects_short_extra() {
        let header = Header {
            extra: vec![0u8; EXTRA_LENGTH - 1],
            ..Default::default()
        };
        let cache = SignatureCache::new();
        assert!(matches!(
            cache.ecrecover(&header),
            Err(ConsensusError::MissingSignature)
        ));
    }
}
