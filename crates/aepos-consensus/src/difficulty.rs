//! Difficulty retargeting.
//!
//! The retarget nudges difficulty toward a 10-minute spacing using the last
//! two block timestamps, damped over a one-week window of block slots.

use crate::params::{INITIAL_DIFFICULTY, RETARGET_SLOTS, TARGET_SPACING};
use crate::{ConsensusError, ConsensusResult};
use aepos_chain_types::ChainReader;
use num_bigint::BigUint;
use num_traits::One;

/// Difficulty required for block `number`.
///
/// The first three blocks carry the seed difficulty published in genesis.
pub fn compute_difficulty<C: ChainReader>(chain: &C, number: u64) -> ConsensusResult<BigUint> {
    if number < 3 {
        return Ok(BigUint::from(INITIAL_DIFFICULTY));
    }

    let prev = chain
        .get_header_by_number(number - 1)
        .ok_or(ConsensusError::UnknownAncestor)?;
    let before = chain
        .get_header_by_number(number - 2)
        .ok_or(ConsensusError::UnknownAncestor)?;

    Ok(retarget(
        &prev.difficulty,
        prev.time.saturating_sub(before.time),
    ))
}

/// One retarget step:
/// `difficulty · ((N−1)·spacing + 2·Δ) / ((N+1)·spacing)`, clamped to ≥ 1.
pub(crate) fn retarget(prev_difficulty: &BigUint, time_delta: u64) -> BigUint {
    let numerator = (RETARGET_SLOTS - 1) * TARGET_SPACING + 2 * time_delta;
    let denominator = (RETARGET_SLOTS + 1) * TARGET_SPACING;

    let next = prev_difficulty * numerator / denominator;
    if next < BigUint::one() {
        BigUint::one()
    } else {
        next
    }
}
