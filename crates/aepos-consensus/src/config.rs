//! Engine configuration.

use aepos_chain_types::Address;
use serde::{Deserialize, Serialize};

/// Aepos consensus configuration.
///
/// All durations are seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AeposConfig {
    /// Minimum spacing between a block and its parent.
    pub block_period: u64,
    /// How long a persisted coin-age record stays fresh before the engine
    /// recalculates it from the chain.
    pub coin_age_period: u64,
    /// Maximum age of a transaction that may still contribute coin-age.
    pub coin_age_lifetime: u64,
    /// Minimum age of a transaction before it contributes coin-age.
    pub coin_age_fermentation: u64,
    /// Interval after a successful stake during which the staked amount
    /// stays locked.
    pub coin_age_holding_period: u64,
    /// Account whose outgoing grants always count toward coin-age, with
    /// amplification.
    pub distribution_account: Address,
    /// Charity beneficiary account.
    pub rewards_charity_account: Address,
    /// Research-and-development beneficiary account.
    pub rewards_rd_account: Address,
}

impl Default for AeposConfig {
    fn default() -> Self {
        Self {
            block_period: 10,
            coin_age_period: 60 * 60,
            coin_age_lifetime: 60 * 60 * 24 * 30 * 12,
            coin_age_fermentation: 60 * 60 * 24 * 7,
            coin_age_holding_period: 60 * 60 * 24,
            distribution_account: Address::zero(),
            rewards_charity_account: Address::zero(),
            rewards_rd_account: Address::zero(),
        }
    }
}
