//! Error types for the chain data model.

use thiserror::Error;

/// Errors raised while decoding or recovering chain data.
#[derive(Error, Debug)]
pub enum TypesError {
    /// A byte slice had the wrong length for a fixed-width type.
    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    /// A hex string failed to decode.
    #[error("invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// A secp256k1 signature was malformed or recovery failed.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// A transaction sender could not be derived from its signature.
    #[error("invalid sender: {0}")]
    InvalidSender(String),
}

/// Result type for chain data operations.
pub type TypesResult<T> = Result<T, TypesError>;
