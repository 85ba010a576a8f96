//! Error types for consensus validation and sealing.

use aepos_chain_types::TypesError;
use aepos_storage::StorageError;
use thiserror::Error;

/// Consensus errors.
#[derive(Error, Debug)]
pub enum ConsensusError {
    /// A non-genesis operation was attempted on block number zero.
    #[error("unknown block")]
    UnknownBlock,

    /// The extra-data region is too short to contain the 65-byte seal.
    #[error("extra-data 65 byte suffix signature missing")]
    MissingSignature,

    /// The seal signature (or the extra region carrying it) is invalid.
    #[error("invalid signature")]
    InvalidSignature,

    /// Block timestamp is below the parent's timestamp plus the block period.
    #[error("invalid timestamp")]
    InvalidTimestamp,

    /// Block timestamp lies in the future.
    #[error("block in the future")]
    FutureBlock,

    /// The parent header is missing or does not link up.
    #[error("unknown ancestor")]
    UnknownAncestor,

    /// The block carries uncles, which Aepos forbids.
    #[error("uncles are invalid")]
    UnclesAreInvalid,

    /// No kernel satisfies the stake target yet; the sealer should retry.
    #[error("no kernel found")]
    NoKernel,

    /// The header's kernel commitment does not reproduce.
    #[error("kernel check failed")]
    WrongKernel,

    /// The header replays an already-recorded stake.
    #[error("received duplicate stake")]
    DuplicateStake,

    /// The stake field has an invalid encoding.
    #[error("stake has invalid encoding")]
    InvalidStake,

    /// The sealer refuses to seal an empty block.
    #[error("waiting for transactions")]
    WaitTransactions,

    /// Sealing was attempted before a signer was authorized.
    #[error("signer not authorized")]
    UnauthorizedSigner,

    /// Storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A persisted record failed to encode or decode.
    #[error("codec error: {0}")]
    Codec(String),

    /// Chain data error.
    #[error(transparent)]
    Types(#[from] TypesError),
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
