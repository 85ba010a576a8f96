//! Consensus engine façade.
//!
//! The [`Engine`] is a long-lived shared object wiring the coin-age
//! machinery, the kernel prover and the duplicate-stake map into the host
//! chain's prepare/seal/finalize/verify lifecycle.

use crate::block_age::{block_age, coin_seconds_to_days};
use crate::coin_age::{load_coin_age, reduce_coin_age, save_coin_age, CoinAge};
use crate::config::AeposConfig;
use crate::difficulty::compute_difficulty;
use crate::extra::{extract_kernel, extract_stake, init_extra, write_kernel, write_seal, write_stake};
use crate::kernel::{check_kernel_hash, compute_kernel};
use crate::params::{
    prealloc_coefficient, stake_max_age, BENEFICIARY_SHARE_PERCENT, EXTRA_KERNEL, EXTRA_SEAL,
    EXTRA_STAKE, PREMINE_WINDOW, REWARD_RATE_DENOMINATOR, REWARD_RATE_NUMERATOR,
};
use crate::signer::{sig_hash, SignatureCache};
use crate::stakes::StakeMap;
use crate::{ConsensusError, ConsensusResult};
use aepos_chain_types::{
    Address, Block, BlockNonce, ChainReader, Genesis, Hash256, Header, Receipt, State, Transaction,
};
use aepos_storage::Database;
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Callback signing a 32-byte hash on behalf of an account.
pub type SignerFn =
    Arc<dyn Fn(Address, &Hash256) -> ConsensusResult<[u8; 65]> + Send + Sync>;

#[derive(Default)]
struct SignerState {
    address: Address,
    sign_fn: Option<SignerFn>,
}

/// Handle aborting a running [`Engine::verify_headers`] batch.
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    /// Stop the background worker; results already published remain valid.
    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

/// Aepos Proof-of-Stake consensus engine.
#[derive(Clone)]
pub struct Engine<D: Database> {
    config: AeposConfig,
    genesis: Genesis,
    db: D,
    signatures: Arc<SignatureCache>,
    signer: Arc<RwLock<SignerState>>,
}

impl<D: Database> Engine<D> {
    /// Create an engine over the given configuration, genesis data and
    /// database.
    pub fn new(config: AeposConfig, genesis: Genesis, db: D) -> Self {
        Self {
            config,
            genesis,
            db,
            signatures: Arc::new(SignatureCache::new()),
            signer: Arc::new(RwLock::new(SignerState::default())),
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &AeposConfig {
        &self.config
    }

    /// Inject the minting key into the engine.
    pub fn authorize(&self, signer: Address, sign_fn: SignerFn) {
        let mut guard = self.signer.write();
        guard.address = signer;
        guard.sign_fn = Some(sign_fn);
        info!(%signer, "authorized block minter");
    }

    /// Address of the account that minted `header`.
    pub fn author(&self, header: &Header) -> ConsensusResult<Address> {
        self.signatures.ecrecover(header)
    }

    /// Check a single header against the consensus rules.
    pub fn verify_header<C: ChainReader>(
        &self,
        chain: &C,
        header: &Header,
    ) -> ConsensusResult<()> {
        self.verify_header_ancestry(chain, header, &[])
    }

    /// Verify a batch of headers on a background worker.
    ///
    /// Results are delivered in input order on the returned channel, one
    /// slot per header. The [`AbortHandle`] releases the worker early; it
    /// is honored on every iteration.
    pub fn verify_headers<C>(
        &self,
        chain: C,
        headers: Vec<Header>,
    ) -> (AbortHandle, Receiver<ConsensusResult<()>>)
    where
        C: ChainReader + Send + 'static,
        D: Clone + 'static,
    {
        let flag = Arc::new(AtomicBool::new(false));
        let worker_flag = Arc::clone(&flag);
        let (sender, receiver) = sync_channel(headers.len().max(1));
        let engine = self.clone();

        thread::Builder::new()
            .name("aepos-header-verifier".into())
            .spawn(move || {
                for index in 0..headers.len() {
                    if worker_flag.load(Ordering::SeqCst) {
                        return;
                    }
                    let result =
                        engine.verify_header_ancestry(&chain, &headers[index], &headers[..index]);
                    if worker_flag.load(Ordering::SeqCst) {
                        return;
                    }
                    if sender.send(result).is_err() {
                        return;
                    }
                }
            })
            .expect("failed to spawn header verifier thread");

        (AbortHandle { flag }, receiver)
    }

    /// Reject any block carrying uncles.
    pub fn verify_uncles(&self, block: &Block) -> ConsensusResult<()> {
        if block.uncles.is_empty() {
            Ok(())
        } else {
            Err(ConsensusError::UnclesAreInvalid)
        }
    }

    /// Check the stake seal of a header and record it in the duplicate
    /// map.
    ///
    /// The write is durable on first success; aborted batch verification
    /// does not roll it back.
    pub fn verify_seal<C: ChainReader>(
        &self,
        _chain: &C,
        header: &Header,
    ) -> ConsensusResult<()> {
        if header.number == 0 {
            return Err(ConsensusError::UnknownBlock);
        }
        let stake = extract_stake(header)?;
        let kernel = extract_kernel(header)?.to_vec();

        let mut stakes = StakeMap::load(&self.db)?;
        if stakes.is_duplicate(&stake, &kernel) {
            return Err(ConsensusError::DuplicateStake);
        }
        stakes.insert(header, &stake)?;
        stakes.store(&self.db)?;
        Ok(())
    }

    /// Initialize the consensus fields of a new header.
    pub fn prepare<C: ChainReader>(&self, chain: &C, header: &mut Header) -> ConsensusResult<()> {
        if header.number == 0 {
            return Err(ConsensusError::UnknownBlock);
        }
        header.coinbase = self.signer.read().address;
        header.nonce = BlockNonce::default();
        header.mix_digest = Hash256::zero();
        header.difficulty = compute_difficulty(chain, header.number)?;
        init_extra(header);

        let parent = chain
            .get_header(header.parent_hash, header.number - 1)
            .ok_or(ConsensusError::UnknownAncestor)?;
        header.time = (parent.time + self.config.block_period).max(unix_now());

        let stake = self.coin_age(chain)?;
        write_stake(header, &stake);
        Ok(())
    }

    /// Seal a prepared block: find a kernel, publish its commitment, and
    /// sign the header.
    ///
    /// Returns `Ok(None)` when the stop flag was raised before sealing
    /// began. The outer mint loop re-enters every second, so the flag is
    /// only honored at entry.
    pub fn seal<C: ChainReader>(
        &self,
        chain: &C,
        block: &Block,
        stop: &AtomicBool,
    ) -> ConsensusResult<Option<Block>> {
        if stop.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let header = block.header.clone();
        if header.number == 0 {
            return Err(ConsensusError::UnknownBlock);
        }
        if block.transactions.is_empty() {
            return Err(ConsensusError::WaitTransactions);
        }

        let stake = extract_stake(&header)?;
        // Block coin-age is at least one coin-day.
        let age = if stake.age.is_zero() {
            BigUint::one()
        } else {
            stake.age.clone()
        };

        let prev = chain
            .get_header_by_number(header.number - 1)
            .ok_or(ConsensusError::UnknownAncestor)?;
        let kernel = compute_kernel(&prev, &age, &header)?;

        let mut sealed = header;
        write_kernel(
            &mut sealed,
            kernel.significant_bytes(),
            &kernel.hashed_timestamp(),
        );

        let (address, sign_fn) = {
            let guard = self.signer.read();
            let sign_fn = guard
                .sign_fn
                .clone()
                .ok_or(ConsensusError::UnauthorizedSigner)?;
            (guard.address, sign_fn)
        };
        let signature = sign_fn(address, &sig_hash(&sealed)?)?;
        write_seal(&mut sealed, &signature);

        debug!(number = sealed.number, offset = kernel.offset, "sealed block");
        Ok(Some(block.with_seal(sealed)))
    }

    /// Apply block rewards, settle the state root, consume the stake and
    /// assemble the final block.
    pub fn finalize<C: ChainReader, S: State>(
        &self,
        _chain: &C,
        header: &mut Header,
        state: &mut S,
        transactions: Vec<Transaction>,
        _receipts: &[Receipt],
    ) -> ConsensusResult<Block> {
        header.uncle_hash = Header::empty_uncle_hash();
        accumulate_rewards(&self.config, header, state);
        header.root = state.intermediate_root();

        let consumed = extract_stake(header).map(|s| s.age).unwrap_or_default();
        reduce_coin_age(&self.db, &header.coinbase, &consumed, unix_now())?;

        Ok(Block::new(header.clone(), transactions))
    }

    /// Current aggregate stake of the authorized validator.
    ///
    /// Served from the persisted record while it is younger than the
    /// recalculation interval; otherwise rebuilt by walking recent headers
    /// back to the lifetime horizon.
    pub fn coin_age<C: ChainReader>(&self, chain: &C) -> ConsensusResult<CoinAge> {
        let validator = self.signer.read().address;
        let now = unix_now();

        if let Some(stored) = load_coin_age(&self.db, &validator)? {
            if now.saturating_sub(stored.time) <= self.config.coin_age_period {
                return Ok(stored);
            }
        }

        let mut age = BigInt::zero();
        let mut value = BigInt::zero();
        let horizon = now.saturating_sub(self.config.coin_age_lifetime);

        let mut number = chain.current_header().map(|h| h.number).unwrap_or(0);
        if number > 0 {
            number -= 1;
        }

        while number > 0 {
            let header = match chain.get_header_by_number(number) {
                Some(header) => header,
                None => break,
            };
            if header.time < horizon {
                break;
            }
            let elapsed = now.saturating_sub(header.time);

            if let Some(block) = chain.get_block(header.hash(), number) {
                if block.header.coinbase == validator {
                    if let Ok(stake) = extract_stake(&block.header) {
                        if elapsed < self.config.coin_age_holding_period {
                            // The staked amount is still locked.
                            age -= BigInt::from(stake.age);
                        }
                    }
                    // Minted rewards accrue coin-age immediately.
                    let (_, netto) = split_rewards(&estimate_block_reward(&block.header));
                    let credit = BigInt::from(netto) * elapsed;
                    age += &credit;
                    value += &credit;
                }

                let delta = block_age(
                    &block,
                    &validator,
                    &self.config.distribution_account,
                    elapsed,
                    self.config.coin_age_fermentation,
                );
                age += delta.age;
                value += delta.value;
            }
            number -= 1;
        }

        // Premine keeps minting possible even while recent stakes are held.
        age += BigInt::from(self.premine_coin_age(&validator, now));

        let age = coin_seconds_to_days(&age);
        let mut age = age.to_biguint().unwrap_or_default();
        if age > stake_max_age() {
            age = stake_max_age();
        }

        let record = CoinAge {
            time: now,
            age,
            value: value.to_biguint().unwrap_or_default(),
        };
        save_coin_age(&self.db, &validator, &record)?;
        Ok(record)
    }

    /// Coin-age earned by genesis allocations while the premine window is
    /// open.
    fn premine_coin_age(&self, validator: &Address, now: u64) -> BigUint {
        if self.genesis.timestamp < now.saturating_sub(PREMINE_WINDOW) {
            return BigUint::zero();
        }
        match self.genesis.alloc.get(validator) {
            Some(balance) => balance * prealloc_coefficient(),
            None => BigUint::zero(),
        }
    }

    fn verify_header_ancestry<C: ChainReader>(
        &self,
        chain: &C,
        header: &Header,
        parents: &[Header],
    ) -> ConsensusResult<()> {
        // Genesis is taken on faith.
        if header.number == 0 {
            return Ok(());
        }
        if header.time > unix_now() {
            return Err(ConsensusError::FutureBlock);
        }
        if header.uncle_hash != Header::empty_uncle_hash() {
            return Err(ConsensusError::UnclesAreInvalid);
        }
        if header.extra.len() < EXTRA_SEAL + EXTRA_KERNEL + EXTRA_STAKE {
            return Err(ConsensusError::InvalidSignature);
        }

        let parent = match parents.last() {
            Some(parent) => parent.clone(),
            None => chain
                .get_header(header.parent_hash, header.number - 1)
                .ok_or(ConsensusError::UnknownAncestor)?,
        };
        if parent.number != header.number - 1 || parent.hash() != header.parent_hash {
            return Err(ConsensusError::UnknownAncestor);
        }
        if parent.time + self.config.block_period > header.time {
            return Err(ConsensusError::InvalidTimestamp);
        }

        let stake = extract_stake(header)?;
        check_kernel_hash(&parent, header, &stake)?;
        self.verify_seal(chain, header)
    }
}

/// Total reward for a block: `stake value · 212 / 10^6`.
pub fn estimate_block_reward(header: &Header) -> BigUint {
    let stake = match extract_stake(header) {
        Ok(stake) => stake,
        Err(e) => {
            warn!(number = header.number, error = %e, "cannot estimate block reward");
            return BigUint::zero();
        }
    };
    stake.value * REWARD_RATE_NUMERATOR / REWARD_RATE_DENOMINATOR
}

/// Split a total reward into the per-beneficiary brutto share and the
/// minter's netto remainder.
pub fn split_rewards(total: &BigUint) -> (BigUint, BigUint) {
    let brutto = total * BENEFICIARY_SHARE_PERCENT / 100u64;
    let netto = total - &brutto - &brutto;
    (brutto, netto)
}

/// Credit the minter and the two beneficiary accounts.
pub fn accumulate_rewards<S: State>(config: &AeposConfig, header: &Header, state: &mut S) {
    let reward = estimate_block_reward(header);
    let (brutto, netto) = split_rewards(&reward);

    state.add_balance(&header.coinbase, &netto);
    state.add_balance(&config.rewards_charity_account, &brutto);
    state.add_balance(&config.rewards_rd_account, &brutto);
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extra::init_extra;

    #[test]
    fn reward_split_exact() {
        let (brutto, netto) = split_rewards(&BigUint::from(212u64));
        assert_eq!(brutto, BigUint::from(16u64));
        assert_eq!(netto, BigUint::from(180u64));

        let (zero_brutto, zero_netto) = split_rewards(&BigUint::zero());
        assert!(zero_brutto.is_zero());
        assert!(zero_netto.is_zero());
    }

    #[test]
    fn reward_follows_staked_value() {
        let mut header = Header {
            number: 4,
            ..Default::default()
        };
        init_extra(&mut header);
        write_stake(
            &mut header,
            &CoinAge {
                time: 1_516_631_561,
                age: BigUint::from(5u8),
                value: BigUint::from(1_000_000u64),
            },
        );

        assert_eq!(estimate_block_reward(&header), BigUint::from(212u64));
    }

    #[test]
    fn malformed_stake_earns_nothing() {
        let header = Header::default();
        assert!(estimate_block_reward(&header).is_zero());
    }
}
