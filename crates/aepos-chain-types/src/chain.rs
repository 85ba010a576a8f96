//! Capability traits and chain-level configuration consumed by the engine.

use crate::block::Block;
use crate::header::Header;
use crate::primitives::{Address, Hash256};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Host chain identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainConfig {
    /// EIP-155 chain id.
    pub chain_id: u64,
}

/// Genesis block data the engine needs: the launch timestamp and the
/// pre-allocated balances that earn the premine coin-age bonus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Genesis {
    /// Genesis timestamp, UNIX seconds.
    pub timestamp: u64,
    /// Pre-allocated account balances in wei.
    #[serde(default)]
    pub alloc: HashMap<Address, BigUint>,
}

/// Read access to the canonical chain.
///
/// This is the entire surface the consensus engine needs from the block
/// store; concrete hosts (and test harnesses) implement it over their own
/// storage.
pub trait ChainReader {
    /// Chain configuration.
    fn config(&self) -> &ChainConfig;

    /// Header of the current chain head, if the chain is non-empty.
    fn current_header(&self) -> Option<Header>;

    /// Header with the given hash at the given number.
    fn get_header(&self, hash: Hash256, number: u64) -> Option<Header>;

    /// Canonical header at the given number.
    fn get_header_by_number(&self, number: u64) -> Option<Header>;

    /// Header with the given hash, at any number.
    fn get_header_by_hash(&self, hash: Hash256) -> Option<Header>;

    /// Full block with the given hash at the given number.
    fn get_block(&self, hash: Hash256, number: u64) -> Option<Block>;
}

/// Mutable account state during block finalization.
pub trait State {
    /// Current balance of `addr` in wei.
    fn balance(&self, addr: &Address) -> BigUint;

    /// Credit `amount` wei to `addr`.
    fn add_balance(&mut self, addr: &Address, amount: &BigUint);

    /// Root of the state trie reflecting all mutations so far.
    fn intermediate_root(&mut self) -> Hash256;
}
