//! Block header and its canonical RLP encoding.

use crate::crypto::keccak256;
use crate::numeric::big_endian_bytes;
use crate::primitives::{Address, BlockNonce, Bloom, Hash256};
use num_bigint::BigUint;
use rlp::RlpStream;

/// Block header of the host chain.
///
/// The `extra` region carries the consensus payload (reserved bytes, kernel,
/// stake and seal); its internal layout is owned by `aepos-consensus`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Hash of the parent block header.
    pub parent_hash: Hash256,
    /// Hash of the (always empty) uncle list.
    pub uncle_hash: Hash256,
    /// Address of the block minter.
    pub coinbase: Address,
    /// State trie root after executing this block.
    pub root: Hash256,
    /// Transaction trie root.
    pub tx_hash: Hash256,
    /// Receipt trie root.
    pub receipt_hash: Hash256,
    /// Log bloom filter.
    pub bloom: Bloom,
    /// Block difficulty.
    pub difficulty: BigUint,
    /// Block number.
    pub number: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Gas used by the block's transactions.
    pub gas_used: u64,
    /// Block timestamp, UNIX seconds.
    pub time: u64,
    /// Consensus extra-data region.
    pub extra: Vec<u8>,
    /// Mix digest, unused by the engine and kept zero.
    pub mix_digest: Hash256,
    /// Header nonce, kept zero.
    pub nonce: BlockNonce,
}

impl Header {
    /// Keccak-256 of the RLP-encoded empty list: the uncle hash every valid
    /// block must carry.
    pub fn empty_uncle_hash() -> Hash256 {
        keccak256(&rlp::EMPTY_LIST_RLP)
    }

    /// Hash of the fully-encoded header, used as the block identity.
    pub fn hash(&self) -> Hash256 {
        keccak256(&self.rlp_with_extra(&self.extra))
    }

    /// RLP-encode the header with a caller-chosen view of the extra region.
    ///
    /// The signing hash passes `extra` with the seal suffix stripped; the
    /// block hash passes it whole.
    pub fn rlp_with_extra(&self, extra: &[u8]) -> Vec<u8> {
        let mut stream = RlpStream::new_list(15);
        append_bytes(&mut stream, self.parent_hash.as_bytes());
        append_bytes(&mut stream, self.uncle_hash.as_bytes());
        append_bytes(&mut stream, self.coinbase.as_bytes());
        append_bytes(&mut stream, self.root.as_bytes());
        append_bytes(&mut stream, self.tx_hash.as_bytes());
        append_bytes(&mut stream, self.receipt_hash.as_bytes());
        append_bytes(&mut stream, self.bloom.as_bytes());
        append_bytes(&mut stream, &big_endian_bytes(&self.difficulty));
        stream.append(&self.number);
        stream.append(&self.gas_limit);
        stream.append(&self.gas_used);
        stream.append(&self.time);
        append_bytes(&mut stream, extra);
        append_bytes(&mut stream, self.mix_digest.as_bytes());
        append_bytes(&mut stream, self.nonce.as_bytes());
        stream.out().to_vec()
    }
}

fn append_bytes(stream: &mut RlpStream, bytes: &[u8]) {
    stream.append(&bytes.to_vec());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Header {
        Header {
            parent_hash: keccak256(b"parent"),
            coinbase: Address([0x11; 20]),
            difficulty: BigUint::from(100_000u64),
            number: 7,
            gas_limit: 8_000_000,
            time: 1_513_083_605,
            extra: vec![0u8; 213],
            ..Default::default()
        }
    }

    #[test]
    fn empty_uncle_hash_matches_known_value() {
        assert_eq!(
            Header::empty_uncle_hash().to_string(),
            "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347"
        );
    }

    #[test]
    fn hash_changes_with_contents() {
        let header = sample_header();
        let mut other = header.clone();
        other.number += 1;
        assert_ne!(header.hash(), other.hash());
    }

    #[test]
    fn hash_is_stable() {
        let header = sample_header();
        assert_eq!(header.hash(), header.clone().hash());
    }

    #[test]
    fn truncated_extra_changes_encoding() {
        let header = sample_header();
        let full = header.rlp_with_extra(&header.extra);
        let truncated = header.rlp_with_extra(&header.extra[..header.extra.len() - 65]);
        assert_ne!(full, truncated);
    }
}
