//! Signed transactions and sender recovery.
//!
//! Sender derivation follows the host chain's two signing schemes: EIP-155
//! replay-protected signatures when the `v` value encodes a chain id, and
//! plain Homestead signatures otherwise.

use crate::crypto::{keccak256, recover_address, sign_recoverable, SigningKey};
use crate::numeric::{big_endian_bytes, big_endian_fixed};
use crate::primitives::{Address, Hash256};
use crate::{TypesError, TypesResult};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rlp::RlpStream;

/// A value-bearing transaction as seen by the consensus engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Sender account nonce.
    pub nonce: u64,
    /// Gas price in wei.
    pub gas_price: BigUint,
    /// Gas limit.
    pub gas_limit: u64,
    /// Recipient; `None` for contract creation.
    pub to: Option<Address>,
    /// Transferred value in wei.
    pub value: BigUint,
    /// Call data.
    pub payload: Vec<u8>,
    /// Signature recovery value.
    pub v: BigUint,
    /// Signature `r` scalar.
    pub r: BigUint,
    /// Signature `s` scalar.
    pub s: BigUint,
}

impl Transaction {
    /// Build an unsigned transfer.
    pub fn new(
        nonce: u64,
        to: Option<Address>,
        value: BigUint,
        gas_limit: u64,
        gas_price: BigUint,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            payload,
            v: BigUint::zero(),
            r: BigUint::zero(),
            s: BigUint::zero(),
        }
    }

    /// Whether the signature is replay-protected (EIP-155).
    pub fn protected(&self) -> bool {
        self.v != BigUint::from(27u8) && self.v != BigUint::from(28u8)
    }

    /// Recover the sender address from the signature.
    ///
    /// Uses the EIP-155 scheme when `v` is non-zero and replay-protected,
    /// the Homestead scheme otherwise. Callers that can tolerate anonymous
    /// transactions should treat the error as "no sender".
    pub fn sender(&self) -> TypesResult<Address> {
        if self.v.is_zero() {
            return Err(TypesError::InvalidSender("nil V field".into()));
        }
        let v = self
            .v
            .to_u64()
            .ok_or_else(|| TypesError::InvalidSender("oversized V field".into()))?;

        let (recovery, hash) = if self.protected() {
            if v < 35 {
                return Err(TypesError::InvalidSender(format!(
                    "replay-protected V out of range: {v}"
                )));
            }
            let chain_id = (v - 35) / 2;
            ((v - 35 - 2 * chain_id) as u8, self.signing_hash(Some(chain_id)))
        } else {
            ((v - 27) as u8, self.signing_hash(None))
        };

        let signature = self.signature_bytes(recovery)?;
        recover_address(&hash, &signature)
            .map_err(|e| TypesError::InvalidSender(e.to_string()))
    }

    /// Sign the transaction in place with `key`.
    ///
    /// `chain_id` selects the EIP-155 scheme; `None` signs Homestead-style.
    pub fn sign(&mut self, key: &SigningKey, chain_id: Option<u64>) -> TypesResult<()> {
        let hash = self.signing_hash(chain_id);
        let signature = sign_recoverable(key, &hash)?;
        self.r = BigUint::from_bytes_be(&signature[..32]);
        self.s = BigUint::from_bytes_be(&signature[32..64]);
        self.v = match chain_id {
            Some(id) => BigUint::from(u64::from(signature[64]) + 35 + 2 * id),
            None => BigUint::from(u64::from(signature[64]) + 27),
        };
        Ok(())
    }

    /// Hash signed over for the chosen scheme.
    fn signing_hash(&self, chain_id: Option<u64>) -> Hash256 {
        let mut stream = RlpStream::new_list(if chain_id.is_some() { 9 } else { 6 });
        stream.append(&self.nonce);
        append_bytes(&mut stream, &big_endian_bytes(&self.gas_price));
        stream.append(&self.gas_limit);
        match &self.to {
            Some(addr) => append_bytes(&mut stream, addr.as_bytes()),
            None => append_bytes(&mut stream, &[]),
        }
        append_bytes(&mut stream, &big_endian_bytes(&self.value));
        append_bytes(&mut stream, &self.payload);
        if let Some(id) = chain_id {
            stream.append(&id);
            stream.append(&0u8);
            stream.append(&0u8);
        }
        keccak256(&stream.out())
    }

    fn signature_bytes(&self, recovery: u8) -> TypesResult<[u8; 65]> {
        let r = big_endian_fixed(&self.r, 32)
            .ok_or_else(|| TypesError::InvalidSender("oversized R scalar".into()))?;
        let s = big_endian_fixed(&self.s, 32)
            .ok_or_else(|| TypesError::InvalidSender("oversized S scalar".into()))?;
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&r);
        out[32..64].copy_from_slice(&s);
        out[64] = recovery;
        Ok(out)
    }
}

fn append_bytes(stream: &mut RlpStream, bytes: &[u8]) {
    stream.append(&bytes.to_vec());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SigningKey {
        SigningKey::from_slice(
            &hex::decode("49a7b37aa6f6645917e7b807e9d1c00d4fa71f18343b0d4122a4d2df64dd6fee")
                .unwrap(),
        )
        .unwrap()
    }

    fn key_address(key: &SigningKey) -> Address {
        let point = key.verifying_key().to_encoded_point(false);
        let digest = keccak256(&point.as_bytes()[1..]);
        Address::from_slice(&digest.as_bytes()[12..]).unwrap()
    }

    fn transfer(value: u64) -> Transaction {
        Transaction::new(
            0,
            Some(Address([0x22; 20])),
            BigUint::from(value),
            1_000_000,
            BigUint::from(1u8),
            Vec::new(),
        )
    }

    #[test]
    fn eip155_sender_roundtrip() {
        let key = test_key();
        let mut tx = transfer(10);
        tx.sign(&key, Some(1337)).unwrap();

        assert!(tx.protected());
        assert_eq!(tx.sender().unwrap(), key_address(&key));
    }

    #[test]
    fn homestead_sender_roundtrip() {
        let key = test_key();
        let mut tx = transfer(10);
        tx.sign(&key, None).unwrap();

        assert!(!tx.protected());
        assert_eq!(tx.sender().unwrap(), key_address(&key));
    }

    #[test]
    fn unsigned_transaction_has_no_sender() {
        let tx = transfer(10);
        assert!(matches!(tx.sender(), Err(TypesError::InvalidSender(_))));
    }

    #[test]
    fn tampered_value_changes_sender() {
        let key = test_key();
        let mut tx = transfer(10);
        tx.sign(&key, Some(1337)).unwrap();

        let mut tampered = tx.clone();
        tampered.value = BigUint::from(11u8);
        // Recovery still succeeds but yields an address that almost surely
        // differs from the true signer.
        match tampered.sender() {
            Ok(addr) => assert_ne!(addr, key_address(&key)),
            Err(_) => {}
        }
    }
}
