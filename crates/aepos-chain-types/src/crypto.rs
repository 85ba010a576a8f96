//! Hashing and signature helpers.
//!
//! Keccak-256 is the canonical header/transaction hash, SHAKE-256 produces
//! the kernel's timestamp commitment, and secp256k1 recoverable signatures
//! identify block minters and transaction senders.

use crate::{Address, Hash256, TypesError, TypesResult};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Digest, Keccak256, Shake256};

pub use k256::ecdsa::SigningKey;

/// Length of a recoverable signature: `r || s || recovery id`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Compute the keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> Hash256 {
    let mut hasher = Keccak256::new();
    Digest::update(&mut hasher, data);
    Hash256(hasher.finalize().into())
}

/// Compute a 32-byte SHAKE-256 digest of `data`.
pub fn shake256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Shake256::default();
    hasher.update(data);
    let mut reader = hasher.finalize_xof();
    let mut out = [0u8; 32];
    reader.read(&mut out);
    out
}

/// Recover the signing address from a 65-byte recoverable signature over
/// `prehash`.
///
/// The address is the low 20 bytes of the keccak-256 of the uncompressed
/// public key (tag byte stripped).
pub fn recover_address(prehash: &Hash256, signature: &[u8]) -> TypesResult<Address> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(TypesError::InvalidLength {
            expected: SIGNATURE_LENGTH,
            got: signature.len(),
        });
    }
    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| TypesError::InvalidSignature(e.to_string()))?;
    let recovery_id = RecoveryId::from_byte(signature[64])
        .ok_or_else(|| TypesError::InvalidSignature("recovery id out of range".into()))?;

    let key = VerifyingKey::recover_from_prehash(prehash.as_bytes(), &sig, recovery_id)
        .map_err(|e| TypesError::InvalidSignature(e.to_string()))?;

    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&digest.as_bytes()[12..])
}

/// Produce a 65-byte recoverable signature over `prehash`.
pub fn sign_recoverable(key: &SigningKey, prehash: &Hash256) -> TypesResult<[u8; 65]> {
    let (sig, recovery_id) = key
        .sign_prehash_recoverable(prehash.as_bytes())
        .map_err(|e| TypesError::InvalidSignature(e.to_string()))?;
    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&sig.to_bytes());
    out[64] = recovery_id.to_byte();
    Ok(out)
}
