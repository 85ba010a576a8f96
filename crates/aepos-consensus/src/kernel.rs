//! Kernel prover and verifier.
//!
//! The kernel is a bounded hash puzzle: for time offsets `t` from 60 down
//! to 0 the prover derives a double-SHA-256 digest over a preimage tied to
//! the previous block and the masked timestamp, reads its first four bytes
//! as a little-endian candidate, and wins at the first offset whose
//! candidate falls below the stake-weighted target. The published kernel
//! commits to both the digest and (via SHAKE-256) the chosen offset, so a
//! verifier reproduces the search bit for bit.

use crate::coin_age::CoinAge;
use crate::extra::extract_kernel;
use crate::params::{
    COIN_VALUE, HEADER_BINARY_SIZE, KERNEL_TIME_WINDOW, STAKE_MAX_TIME,
};
use crate::{ConsensusError, ConsensusResult};
use aepos_chain_types::numeric::{big_endian_bytes, u64_big_endian_bytes};
use aepos_chain_types::{shake256, Header};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

/// A found kernel: the full digest and the winning time offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    /// Double-SHA-256 digest at the winning offset.
    pub digest: [u8; 32],
    /// Winning time offset in seconds, `0..=60`.
    pub offset: u64,
}

impl Kernel {
    /// Digest bytes with leading zeros stripped, as written into the
    /// header's kernel field.
    pub fn significant_bytes(&self) -> &[u8] {
        let start = self.digest.iter().position(|&b| b != 0).unwrap_or(32);
        &self.digest[start..]
    }

    /// SHAKE-256 commitment to the winning offset.
    pub fn hashed_timestamp(&self) -> [u8; 32] {
        shake256(&u64_big_endian_bytes(self.offset))
    }
}

/// Stake-weighted target for one search step.
pub(crate) fn kernel_target(difficulty: &BigUint, stake_age: &BigUint, time_weight: u64) -> BigUint {
    difficulty * stake_age * time_weight / COIN_VALUE / 86_400u64
}

/// Seconds of stake weight available at `offset`, saturating to the
/// 90-day maximum.
///
/// When the masked timestamp falls at or before the previous block the
/// weight saturates high rather than low, which is what makes the
/// descending `t` search explore the widest weight first.
fn time_weight(header_time: u64, offset: u64, prev_time: u64) -> u64 {
    match header_time.checked_sub(offset).and_then(|t| t.checked_sub(prev_time)) {
        Some(weight) => weight.min(STAKE_MAX_TIME),
        None => STAKE_MAX_TIME,
    }
}

/// Double-SHA-256 kernel digest at the masked timestamp.
fn kernel_digest(prev_time: u64, masked_time: u64) -> [u8; 32] {
    let mut preimage = Vec::with_capacity(64);
    preimage.extend_from_slice(&big_endian_bytes(&crate::params::stake_modifier()));
    preimage.extend_from_slice(&u64_big_endian_bytes(prev_time));
    preimage.extend_from_slice(HEADER_BINARY_SIZE.to_string().as_bytes());
    preimage.extend_from_slice(prev_time.to_string().as_bytes());
    preimage.extend_from_slice(masked_time.to_string().as_bytes());

    let first = Sha256::digest(&preimage);
    Sha256::digest(first).into()
}

/// Search for a kernel proving the minting right of `stake_age` at
/// `header`'s timestamp.
///
/// Offsets are explored from 60 down to 0; the first whose candidate clears
/// the target wins. Fails with [`ConsensusError::NoKernel`] when the stake
/// cannot clear any step of the window yet.
pub fn compute_kernel(
    prev: &Header,
    stake_age: &BigUint,
    header: &Header,
) -> ConsensusResult<Kernel> {
    if header.number < 1 {
        return Err(ConsensusError::NoKernel);
    }

    for offset in (0..=KERNEL_TIME_WINDOW).rev() {
        let weight = time_weight(header.time, offset, prev.time);
        let target = kernel_target(&header.difficulty, stake_age, weight);
        let digest = kernel_digest(prev.time, header.time.saturating_sub(offset));
        let candidate = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);

        trace!(
            number = header.number,
            offset,
            candidate,
            %target,
            weight,
            "kernel attempt"
        );

        if BigUint::from(candidate) < target {
            debug!(number = header.number, offset, "kernel found");
            return Ok(Kernel { digest, offset });
        }
    }

    Err(ConsensusError::NoKernel)
}

/// Verify that `header`'s published kernel reproduces from its declared
/// stake.
pub fn check_kernel_hash(
    prev: &Header,
    header: &Header,
    stake: &CoinAge,
) -> ConsensusResult<()> {
    if header.number == 0 {
        return Err(ConsensusError::UnknownBlock);
    }

    // Minimum one coin-day, mirroring the sealer.
    let age = if stake.age.is_zero() {
        BigUint::one()
    } else {
        stake.age.clone()
    };
    let kernel = match compute_kernel(prev, &age, header) {
        Ok(kernel) => kernel,
        Err(_) => return Err(ConsensusError::WrongKernel),
    };

    let published = extract_kernel(header)?;
    let hash_bytes = kernel.significant_bytes();
    let till = hash_bytes.len().min(crate::params::EXTRA_KERNEL / 2);

    if published[..till] != hash_bytes[..till]
        || published[crate::params::EXTRA_KERNEL / 2..] != kernel.hashed_timestamp()
    {
        return Err(ConsensusError::WrongKernel);
    }

    Ok(())
}
