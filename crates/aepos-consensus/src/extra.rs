//! Layout of the header extra region.
//!
//! `extra = [ reserved(32) | kernel(64) | stake(52) | seal(65) ]`, addressed
//! from the end so that hosts may prepend their own data to the reserved
//! prefix.

use crate::coin_age::CoinAge;
use crate::params::{EXTRA_KERNEL, EXTRA_LENGTH, EXTRA_SEAL, EXTRA_STAKE};
use crate::{ConsensusError, ConsensusResult};
use aepos_chain_types::Header;

/// Grow or trim the extra region to the prepared-header length.
pub fn init_extra(header: &mut Header) {
    header.extra.resize(EXTRA_LENGTH, 0);
}

/// Parse the stake field out of the extra region.
pub fn extract_stake(header: &Header) -> ConsensusResult<CoinAge> {
    let len = header.extra.len();
    if len < EXTRA_SEAL + EXTRA_STAKE {
        return Err(ConsensusError::InvalidStake);
    }
    CoinAge::parse(&header.extra[len - EXTRA_SEAL - EXTRA_STAKE..len - EXTRA_SEAL])
}

/// Borrow the 64-byte kernel field of the extra region.
pub fn extract_kernel(header: &Header) -> ConsensusResult<&[u8]> {
    let len = header.extra.len();
    if len < EXTRA_SEAL + EXTRA_STAKE + EXTRA_KERNEL {
        return Err(ConsensusError::InvalidSignature);
    }
    Ok(&header.extra[len - EXTRA_SEAL - EXTRA_STAKE - EXTRA_KERNEL..len - EXTRA_SEAL - EXTRA_STAKE])
}

/// Write the stake field.
pub fn write_stake(header: &mut Header, stake: &CoinAge) {
    let len = header.extra.len();
    header.extra[len - EXTRA_SEAL - EXTRA_STAKE..len - EXTRA_SEAL]
        .copy_from_slice(&stake.to_bytes());
}

/// Write the kernel field: the (possibly leading-zero-stripped) hash bytes
/// into the first half, the hashed timestamp into the second.
pub fn write_kernel(header: &mut Header, hash_bytes: &[u8], hashed_timestamp: &[u8; 32]) {
    let len = header.extra.len();
    let start = len - EXTRA_SEAL - EXTRA_STAKE - EXTRA_KERNEL;
    header.extra[start..start + hash_bytes.len()].copy_from_slice(hash_bytes);
    header.extra[start + EXTRA_KERNEL / 2..start + EXTRA_KERNEL]
        .copy_from_slice(hashed_timestamp);
}

/// Write the 65-byte seal suffix.
pub fn write_seal(header: &mut Header, signature: &[u8; EXTRA_SEAL]) {
    let len = header.extra.len();
    header.extra[len - EXTRA_SEAL..].copy_from_slice(signature);
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn prepared_header() -> Header {
        let mut header = Header::default();
        init_extra(&mut header);
        header
    }

    #[test]
    fn init_extra_sizes_region() {
        let mut header = Header::default();
        init_extra(&mut header);
        assert_eq!(header.extra.len(), EXTRA_LENGTH);

        header.extra = vec![0u8; 400];
        init_extra(&mut header);
        assert_eq!(header.extra.len(), EXTRA_LENGTH);
    }

    #[test]
    fn stake_roundtrips_through_extra() {
        let mut header = prepared_header();
        let stake = CoinAge {
            time: 1_516_631_561,
            age: BigUint::from(123_456_789u64),
            value: BigUint::from(1_000u64),
        };
        write_stake(&mut header, &stake);
        assert_eq!(extract_stake(&header).unwrap(), stake);
    }

    #[test]
    fn kernel_roundtrips_through_extra() {
        let mut header = prepared_header();
        let hash_bytes = vec![0x42u8; 31];
        let hashed_timestamp = [0x17u8; 32];
        write_kernel(&mut header, &hash_bytes, &hashed_timestamp);

        let kernel = extract_kernel(&header).unwrap();
        assert_eq!(&kernel[..31], &hash_bytes[..]);
        assert_eq!(kernel[31], 0);
        assert_eq!(&kernel[32..], &hashed_timestamp[..]);
    }

    #[test]
    fn short_extra_is_rejected() {
        let header = Header {
            extra: vec![0u8; EXTRA_SEAL],
            ..Default::default()
        };
        assert!(matches!(
            extract_stake(&header),
            Err(ConsensusError::InvalidStake)
        ));
        assert!(matches!(
            extract_kernel(&header),
            Err(ConsensusError::InvalidSignature)
        ));
    }

    #[test]
    fn seal_occupies_the_suffix() {
        let mut header = prepared_header();
        write_seal(&mut header, &[0x99u8; EXTRA_SEAL]);
        assert!(header.extra[EXTRA_LENGTH - EXTRA_SEAL..]
            .iter()
            .all(|&b| b == 0x99));
        assert!(header.extra[..EXTRA_LENGTH - EXTRA_SEAL]
            .iter()
            .all(|&b| b == 0));
    }
}
