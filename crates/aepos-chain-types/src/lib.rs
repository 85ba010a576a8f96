//! # aepos-chain-types
//!
//! Chain data model consumed by the Aepos consensus engine.
//!
//! This crate provides:
//! - Fixed-width primitives (`Address`, `Hash256`, `Bloom`, `BlockNonce`)
//! - The block `Header` with its canonical RLP encoding and keccak-256 hash
//! - Signed `Transaction`s with EIP-155 / Homestead sender recovery
//! - `Block`, `Receipt` and `Genesis` containers
//! - The `ChainReader` and `State` capability traits the engine consumes
//! - Hashing and secp256k1 recovery helpers shared across the node
//!
//! The engine itself lives in `aepos-consensus`; everything here is the
//! narrow surface it needs from the surrounding host chain.

mod block;
mod chain;
pub mod crypto;
mod error;
mod header;
pub mod numeric;
mod primitives;
mod transaction;

pub use block::{Block, Receipt};
pub use chain::{ChainConfig, ChainReader, Genesis, State};
pub use crypto::{keccak256, recover_address, shake256, sign_recoverable, SigningKey};
pub use error::{TypesError, TypesResult};
pub use header::Header;
pub use primitives::{Address, BlockNonce, Bloom, Hash256};
pub use transaction::Transaction;
