//! Fixed-width primitive types shared across the chain data model.

use crate::{TypesError, TypesResult};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 20-byte account identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Byte length of an address.
    pub const LEN: usize = 20;

    /// The all-zero address.
    pub fn zero() -> Self {
        Self([0u8; 20])
    }

    /// View the address as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Build an address from a slice; fails unless it is exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> TypesResult<Self> {
        if bytes.len() != Self::LEN {
            return Err(TypesError::InvalidLength {
                expected: Self::LEN,
                got: bytes.len(),
            });
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Parse a `0x`-prefixed or bare hex string.
    pub fn from_hex(s: &str) -> TypesResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Self::from_slice(&hex::decode(s)?)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

/// 32-byte hash digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// Byte length of a hash.
    pub const LEN: usize = 32;

    /// The all-zero hash.
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// View the hash as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Build a hash from a slice; fails unless it is exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> TypesResult<Self> {
        if bytes.len() != Self::LEN {
            return Err(TypesError::InvalidLength {
                expected: Self::LEN,
                got: bytes.len(),
            });
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Parse a `0x`-prefixed or bare hex string.
    pub fn from_hex(s: &str) -> TypesResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Self::from_slice(&hex::decode(s)?)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

/// 2048-bit log bloom filter carried in every header.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Bloom(pub [u8; 256]);

impl Bloom {
    /// Byte length of the bloom filter.
    pub const LEN: usize = 256;

    /// View the bloom as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for Bloom {
    fn default() -> Self {
        Self([0u8; 256])
    }
}

impl fmt::Debug for Bloom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bloom(0x{})", hex::encode(&self.0[..8]))
    }
}

/// 8-byte header nonce field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockNonce(pub [u8; 8]);

impl BlockNonce {
    /// View the nonce as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_hex_roundtrip() {
        let addr = Address::from_hex("0x00112233445566778899aabbccddeeff00112233").unwrap();
        assert_eq!(addr.to_string(), "0x00112233445566778899aabbccddeeff00112233");
        assert_eq!(Address::from_hex(&addr.to_string()).unwrap(), addr);
    }

    #[test]
    fn address_rejects_wrong_length() {
        assert!(matches!(
            Address::from_slice(&[0u8; 19]),
            Err(TypesError::InvalidLength { expected: 20, got: 19 })
        ));
    }

    #[test]
    fn hash_serde_roundtrip() {
        let hash = Hash256::from_hex(
            "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
        )
        .unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        let back: Hash256 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn zero_values() {
        assert_eq!(Address::zero().as_bytes(), &[0u8; 20]);
        assert_eq!(Hash256::zero().as_bytes(), &[0u8; 32]);
        assert_eq!(Bloom::default().as_bytes(), &[0u8; 256][..]);
    }
}
