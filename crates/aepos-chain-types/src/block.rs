//! Block and receipt containers.

use crate::header::Header;
use crate::transaction::Transaction;

/// A full block: header plus body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    /// Block header.
    pub header: Header,
    /// Transactions included in the block.
    pub transactions: Vec<Transaction>,
    /// Uncle headers; always empty under Aepos consensus.
    pub uncles: Vec<Header>,
}

impl Block {
    /// Assemble a block from a header and body.
    pub fn new(header: Header, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
            uncles: Vec::new(),
        }
    }

    /// Replace the header with a sealed copy, keeping the body.
    pub fn with_seal(&self, header: Header) -> Self {
        Self {
            header,
            transactions: self.transactions.clone(),
            uncles: self.uncles.clone(),
        }
    }

    /// Block hash, i.e. the header hash.
    pub fn hash(&self) -> crate::Hash256 {
        self.header.hash()
    }
}

/// Execution receipt; opaque to the consensus engine and carried through
/// block finalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    /// Cumulative gas used up to and including this transaction.
    pub cumulative_gas_used: u64,
}
