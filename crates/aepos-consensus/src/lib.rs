//! # aepos-consensus
//!
//! Proof-of-Stake consensus engine for the Aepos blockchain.
//!
//! This crate provides:
//! - Coin-age accounting over recent balance-bearing transactions, with
//!   fermentation, lifetime and holding rules, a premine bonus and a
//!   saturation cap
//! - The kernel prover/verifier: a bounded time-stepped hash puzzle whose
//!   target scales with stake and elapsed time
//! - Difficulty retargeting against a 10-minute block spacing
//! - The header extra-region codec and clique-style seal signing
//! - Duplicate-stake detection over a persistent stake map
//! - The [`Engine`] façade wiring it all into the host chain
//!
//! ## Kernel
//!
//! A minter proves its right to seal by exhibiting a time offset `t` in
//! `[0, 60]` whose double-SHA-256 kernel digest, read as a little-endian
//! 32-bit candidate, falls below `difficulty · stake · time_weight /
//! coin_value / 86 400`. The digest and a SHAKE-256 commitment to `t` are
//! published in the header's extra region and reproduced by every verifier.

mod block_age;
mod coin_age;
mod config;
mod difficulty;
mod engine;
mod error;
mod extra;
mod kernel;
mod signer;
mod stakes;

pub use block_age::{block_age, coin_seconds_to_days, BlockAgeDelta};
pub use coin_age::{load_coin_age, reduce_coin_age, save_coin_age, CoinAge};
pub use config::AeposConfig;
pub use difficulty::compute_difficulty;
pub use engine::{AbortHandle, Engine, SignerFn};
pub use error::{ConsensusError, ConsensusResult};
pub use extra::{extract_kernel, extract_stake};
pub use kernel::{check_kernel_hash, compute_kernel, Kernel};
pub use signer::{sig_hash, SignatureCache};
pub use stakes::{StakeMap, StakeRecord};

/// Aepos network parameters.
pub mod params {
    use num_bigint::BigUint;
    use num_traits::{One, Zero};

    /// Reserved prefix of the header extra region.
    pub const EXTRA_RESERVED: usize = 32;

    /// Bytes reserved for the kernel: hash half plus timestamp half.
    pub const EXTRA_KERNEL: usize = 64;

    /// Bytes reserved for the serialized stake.
    pub const EXTRA_STAKE: usize = 52;

    /// Bytes reserved for the signer seal.
    pub const EXTRA_SEAL: usize = 65;

    /// Total extra-region length of a prepared header.
    pub const EXTRA_LENGTH: usize = EXTRA_RESERVED + EXTRA_KERNEL + EXTRA_STAKE + EXTRA_SEAL;

    /// Number of recent block signatures kept in memory.
    pub const IN_MEMORY_SIGNATURES: usize = 4096;

    /// 1 coin is 10^18 wei, same as 1 ether.
    pub const COIN_VALUE: u64 = 1_000_000_000_000_000_000;

    /// Cents per coin unit used by coin-age scaling.
    pub const CENT_VALUE: u64 = 10_000;

    /// Stake time of full weight: 90 days in seconds.
    pub const STAKE_MAX_TIME: u64 = 90 * 24 * 60 * 60;

    /// Kernel search window in seconds.
    pub const KERNEL_TIME_WINDOW: u64 = 60;

    /// Difficulty published for the first three blocks.
    pub const INITIAL_DIFFICULTY: u64 = 100_000;

    /// Target inter-block spacing in seconds.
    pub const TARGET_SPACING: u64 = 600;

    /// One-week retarget window measured in block slots.
    pub const RETARGET_SLOTS: u64 = 7 * 24 * 60 * 60 / TARGET_SPACING;

    /// Fixed encoded width of a sealed header, fed to the kernel preimage
    /// in ASCII decimal.
    pub const HEADER_BINARY_SIZE: u64 = 753;

    /// How long genesis allocations keep earning the premine bonus.
    pub const PREMINE_WINDOW: u64 = 6 * 30 * 24 * 60 * 60;

    /// Amplification applied to distribution-account grants.
    pub const DISTRIBUTION_WEIGHT: u64 = 100;

    /// Block reward is `stake value · 212 / 10^6`, about 2.12% per coin-year.
    pub const REWARD_RATE_NUMERATOR: u64 = 212;

    /// Denominator of the reward rate.
    pub const REWARD_RATE_DENOMINATOR: u64 = 1_000_000;

    /// Share of the total reward paid to each beneficiary account.
    pub const BENEFICIARY_SHARE_PERCENT: u64 = 8;

    /// Database key prefix for per-validator coin-age records.
    pub const COIN_AGE_KEY_PREFIX: &[u8] = b"coinage";

    /// Database key of the duplicate-stake map.
    pub const MAPPED_STAKES_KEY: &[u8] = b"mappedStakes";

    /// Saturation cap on accumulated coin-age.
    pub fn stake_max_age() -> BigUint {
        BigUint::one() << 149u32
    }

    /// Multiplier boosting genesis-allocated balances while the premine
    /// window is open.
    pub fn prealloc_coefficient() -> BigUint {
        BigUint::one() << 56u32
    }

    /// Chain-global stake modifier mixed into the kernel preimage.
    /// Starts at zero; reserved for future modulation.
    pub fn stake_modifier() -> BigUint {
        BigUint::zero()
    }
}
