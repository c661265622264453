//! Staking Ledger
//!
//! Holds staked pUSD and distributes captured appreciation to stakers with an
//! accumulated-rate algorithm (see [`crate::accrual`]).
//!
//! Key mechanics:
//! - Updaters (vaults) call `distribute` after minting a reward to this contract
//! - The share attributable to minted-but-unstaked supply goes to the reserve
//! - Every stake/unstake/restake/claim settles the caller before touching the stake
//! - Unstaking requires `min_lock_period` to have passed since the lock was armed;
//!   stake and unstake re-arm it, restake does not
//! - Up to five reward schemes are notified on every stake change and
//!   distribution. A reverting scheme reverts the whole call.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::access_control::{authorize, Role, Roles};
use crate::accrual::{available_reward, distribution, finalize_checkpoint, settle};
use crate::errors::{LedgerError, LedgerResult};
use crate::events::{
    Claimed, ReserveSet, Restaked, RewardDistributed, SchemeAdded, SchemeRemoved, Staked,
    Unstaked,
};
use crate::fixed_point::{checked_add, checked_sub};
use crate::reward_scheme::RewardSchemeContractRef;
use crate::token::Cep18TokenContractRef;
use crate::types::{zero_address, StakeAccount, StakingStats};

/// Maximum number of registered reward schemes
pub const MAX_REWARD_SCHEMES: usize = 5;

/// Entry point vaults use to hand over captured rewards
#[odra::external_contract]
pub trait RewardDistributor {
    fn distribute(&mut self, new_reward: U256);
}

/// Staking Ledger
#[odra::module(events = [
    Staked,
    Unstaked,
    Restaked,
    Claimed,
    RewardDistributed,
    SchemeAdded,
    SchemeRemoved,
    ReserveSet
])]
pub struct StakingLedger {
    /// Capability book
    roles: SubModule<Roles>,
    /// pUSD ledger
    stablecoin: Var<Address>,
    /// Per-account staking records
    accounts: Mapping<Address, StakeAccount>,
    /// Sum of all staked amounts
    total_staked: Var<U256>,
    /// Global accumulated reward rate (RATE_PRECISION scale)
    global_rate: Var<U256>,
    /// Account credited with the unstaked supply's share
    reserve: Var<Address>,
    /// Vaults allowed to distribute
    updaters: Mapping<Address, bool>,
    /// Registered reward schemes, in registration order
    schemes: Var<Vec<Address>>,
    /// Minimum lock period in ms
    min_lock_period: Var<u64>,
    /// Cumulative reward distributed
    total_distributed: Var<U256>,
}

#[odra::module]
impl StakingLedger {
    pub fn init(&mut self, admin: Address, stablecoin: Address, reserve: Address, min_lock_period: u64) {
        if reserve == zero_address() {
            self.env().revert(LedgerError::ZeroAddress);
        }
        self.roles.init(admin);
        self.stablecoin.set(stablecoin);
        self.reserve.set(reserve);
        self.min_lock_period.set(min_lock_period);
        self.total_staked.set(U256::zero());
        self.global_rate.set(U256::zero());
        self.total_distributed.set(U256::zero());
        self.schemes.set(Vec::new());
    }

    // ========== User Operations ==========

    /// Stake pUSD. Arms the lock.
    #[odra(non_reentrant)]
    pub fn stake(&mut self, amount: U256) {
        let caller = self.env().caller();
        if amount.is_zero() {
            self.env().revert(LedgerError::ZeroAmount);
        }

        let mut token = self.token();
        if token.balance_of(caller) < amount {
            self.env().revert(LedgerError::InsufficientBalance);
        }

        let global_rate = self.global_rate();
        let mut account = self.account(caller);
        self.or_revert(settle(&mut account, global_rate));
        account.staked = self.or_revert(checked_add(account.staked, amount));
        account.lock_start = self.env().get_block_time();
        finalize_checkpoint(&mut account, global_rate);

        token.transfer_from(caller, self.env().self_address(), amount);

        let total_staked = self.or_revert(checked_add(self.total_staked(), amount));
        self.total_staked.set(total_staked);
        let staked = account.staked;
        self.accounts.set(&caller, account);

        self.notify_stake_change(caller, staked);
        self.env().emit_event(Staked {
            account: caller,
            amount,
            total_staked,
        });
    }

    /// Unstake pUSD once the lock has passed. Re-arms the lock for what remains.
    #[odra(non_reentrant)]
    pub fn unstake(&mut self, amount: U256) {
        let caller = self.env().caller();
        if amount.is_zero() {
            self.env().revert(LedgerError::ZeroAmount);
        }

        let mut account = self.account(caller);
        if amount > account.staked {
            self.env().revert(LedgerError::InsufficientStake);
        }
        let now = self.env().get_block_time();
        if now < self.unlock_time(caller) {
            self.env().revert(LedgerError::LockPeriodActive);
        }

        let global_rate = self.global_rate();
        self.or_revert(settle(&mut account, global_rate));
        account.staked -= amount;
        account.lock_start = now;
        finalize_checkpoint(&mut account, global_rate);

        let total_staked = self.or_revert(checked_sub(self.total_staked(), amount));
        self.total_staked.set(total_staked);
        let staked = account.staked;
        self.accounts.set(&caller, account);

        self.token().transfer(caller, amount);

        self.notify_stake_change(caller, staked);
        self.env().emit_event(Unstaked {
            account: caller,
            amount,
            total_staked,
        });
    }

    /// Move earned reward into the stake. The lock is left as is.
    #[odra(non_reentrant)]
    pub fn restake(&mut self, amount: U256) {
        let caller = self.env().caller();
        if amount.is_zero() {
            self.env().revert(LedgerError::ZeroAmount);
        }

        let global_rate = self.global_rate();
        let mut account = self.account(caller);
        self.or_revert(settle(&mut account, global_rate));
        if amount > account.stored_reward {
            self.env().revert(LedgerError::InsufficientReward);
        }
        account.stored_reward -= amount;
        account.staked = self.or_revert(checked_add(account.staked, amount));
        finalize_checkpoint(&mut account, global_rate);

        let total_staked = self.or_revert(checked_add(self.total_staked(), amount));
        self.total_staked.set(total_staked);
        let staked = account.staked;
        self.accounts.set(&caller, account);

        self.notify_stake_change(caller, staked);
        self.env().emit_event(Restaked {
            account: caller,
            amount,
            total_staked,
        });
    }

    /// Withdraw earned reward
    #[odra(non_reentrant)]
    pub fn claim(&mut self, amount: U256) {
        let caller = self.env().caller();
        if amount.is_zero() {
            self.env().revert(LedgerError::ZeroAmount);
        }

        let global_rate = self.global_rate();
        let mut account = self.account(caller);
        self.or_revert(settle(&mut account, global_rate));
        if amount > account.stored_reward {
            self.env().revert(LedgerError::InsufficientReward);
        }
        account.stored_reward -= amount;
        finalize_checkpoint(&mut account, global_rate);
        self.accounts.set(&caller, account);

        self.token().transfer(caller, amount);

        self.env().emit_event(Claimed {
            account: caller,
            amount,
        });
    }

    // ========== Distribution ==========

    /// Spread a reward already minted to this contract over the pUSD supply
    /// (updaters only).
    #[odra(non_reentrant)]
    pub fn distribute(&mut self, new_reward: U256) {
        let vault = self.env().caller();
        if !self.is_updater(vault) {
            self.env().revert(LedgerError::NotUpdater);
        }

        let supply = self.token().total_supply();
        let split = self.or_revert(distribution(new_reward, supply, self.total_staked()));

        let global_rate = self.or_revert(checked_add(self.global_rate(), split.rate_increment));
        self.global_rate.set(global_rate);

        let reserve = self.reserve();
        let mut reserve_account = self.account(reserve);
        reserve_account.stored_reward =
            self.or_revert(checked_add(reserve_account.stored_reward, split.reserve_share));
        self.accounts.set(&reserve, reserve_account);

        let distributed = self.or_revert(checked_add(self.total_distributed(), new_reward));
        self.total_distributed.set(distributed);

        for scheme in self.reward_schemes() {
            let mut scheme = RewardSchemeContractRef::new(self.env().clone(), scheme);
            if scheme.is_active() {
                scheme.update();
            }
        }

        self.env().emit_event(RewardDistributed {
            vault,
            reward: new_reward,
            rate_increment: split.rate_increment,
            reserve_share: split.reserve_share,
            global_rate,
        });
    }

    // ========== Queries ==========

    /// Stored plus pending reward, without settling
    pub fn reward_of(&self, account: Address) -> U256 {
        self.or_revert(available_reward(&self.account(account), self.global_rate()))
    }

    pub fn staked_of(&self, account: Address) -> U256 {
        self.account(account).staked
    }

    pub fn account(&self, account: Address) -> StakeAccount {
        self.accounts.get(&account).unwrap_or_default()
    }

    /// Earliest block time at which `account` may unstake
    pub fn unlock_time(&self, account: Address) -> u64 {
        self.account(account)
            .lock_start
            .saturating_add(self.min_lock_period())
    }

    pub fn global_rate(&self) -> U256 {
        self.global_rate.get_or_default()
    }

    pub fn total_staked(&self) -> U256 {
        self.total_staked.get_or_default()
    }

    pub fn total_distributed(&self) -> U256 {
        self.total_distributed.get_or_default()
    }

    pub fn min_lock_period(&self) -> u64 {
        self.min_lock_period.get_or_default()
    }

    pub fn reserve(&self) -> Address {
        match self.reserve.get() {
            Some(reserve) => reserve,
            None => self.env().revert(LedgerError::InvalidConfig),
        }
    }

    pub fn stablecoin(&self) -> Address {
        match self.stablecoin.get() {
            Some(stablecoin) => stablecoin,
            None => self.env().revert(LedgerError::InvalidConfig),
        }
    }

    pub fn reward_schemes(&self) -> Vec<Address> {
        self.schemes.get_or_default()
    }

    pub fn is_updater(&self, account: Address) -> bool {
        self.updaters.get(&account).unwrap_or(false)
    }

    pub fn stats(&self) -> StakingStats {
        let reserve = self.reserve();
        StakingStats {
            total_staked: self.total_staked(),
            global_rate: self.global_rate(),
            reserve,
            reserve_reward: self.account(reserve).stored_reward,
            total_distributed: self.total_distributed(),
            min_lock_period: self.min_lock_period(),
            scheme_count: self.reward_schemes().len() as u32,
        }
    }

    // ========== Admin Functions ==========

    #[odra(non_reentrant)]
    pub fn add_reward_scheme(&mut self, scheme: Address) {
        authorize(&self.roles, Role::Admin);
        if scheme == zero_address() {
            self.env().revert(LedgerError::ZeroAddress);
        }
        let mut schemes = self.reward_schemes();
        let index = self.or_revert(register_scheme(&mut schemes, scheme));
        self.schemes.set(schemes);
        self.env().emit_event(SchemeAdded { scheme, index });
    }

    #[odra(non_reentrant)]
    pub fn remove_reward_scheme(&mut self, scheme: Address) {
        authorize(&self.roles, Role::Admin);
        let mut schemes = self.reward_schemes();
        let index = self.or_revert(unregister_scheme(&mut schemes, scheme));
        self.schemes.set(schemes);
        self.env().emit_event(SchemeRemoved { scheme, index });
    }

    /// Hand the reserve role to `new_reserve`, carrying the accrued reserve
    /// reward along. The new reserve must hold no reward of its own.
    #[odra(non_reentrant)]
    pub fn set_reserve(&mut self, new_reserve: Address) {
        authorize(&self.roles, Role::Admin);
        if new_reserve == zero_address() {
            self.env().revert(LedgerError::ZeroAddress);
        }
        let previous = self.reserve();
        if new_reserve == previous {
            self.env().revert(LedgerError::InvalidConfig);
        }
        if !self.reward_of(new_reserve).is_zero() {
            self.env().revert(LedgerError::ReserveHasReward);
        }

        let mut old_account = self.account(previous);
        let carried_reward = old_account.stored_reward;
        old_account.stored_reward = U256::zero();
        self.accounts.set(&previous, old_account);

        let mut new_account = self.account(new_reserve);
        new_account.stored_reward = carried_reward;
        self.accounts.set(&new_reserve, new_account);

        self.reserve.set(new_reserve);
        self.env().emit_event(ReserveSet {
            previous,
            current: new_reserve,
            carried_reward,
        });
    }

    #[odra(non_reentrant)]
    pub fn add_updater(&mut self, vault: Address) {
        authorize(&self.roles, Role::Admin);
        if vault == zero_address() {
            self.env().revert(LedgerError::ZeroAddress);
        }
        self.updaters.set(&vault, true);
    }

    #[odra(non_reentrant)]
    pub fn remove_updater(&mut self, vault: Address) {
        authorize(&self.roles, Role::Admin);
        self.updaters.set(&vault, false);
    }

    #[odra(non_reentrant)]
    pub fn set_min_lock_period(&mut self, min_lock_period: u64) {
        authorize(&self.roles, Role::Admin);
        self.min_lock_period.set(min_lock_period);
    }

    #[odra(non_reentrant)]
    pub fn grant_role(&mut self, role: Role, account: Address) {
        self.roles.grant_role(role, account);
    }

    #[odra(non_reentrant)]
    pub fn revoke_role(&mut self, role: Role, account: Address) {
        self.roles.revoke_role(role, account);
    }

    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.roles.has_role(role, account)
    }

    // ========== Internal Functions ==========

    fn notify_stake_change(&self, user: Address, new_staked_amount: U256) {
        for scheme in self.reward_schemes() {
            let mut scheme = RewardSchemeContractRef::new(self.env().clone(), scheme);
            if scheme.is_active() {
                scheme.update_user_internal_state(user, new_staked_amount);
            }
        }
    }

    fn token(&self) -> Cep18TokenContractRef {
        Cep18TokenContractRef::new(self.env().clone(), self.stablecoin())
    }

    fn or_revert<T>(&self, result: LedgerResult<T>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => self.env().revert(error),
        }
    }
}

/// Append `scheme`, returning its index
fn register_scheme(schemes: &mut Vec<Address>, scheme: Address) -> LedgerResult<u32> {
    if schemes.contains(&scheme) {
        return Err(LedgerError::SchemeAlreadyRegistered);
    }
    if schemes.len() >= MAX_REWARD_SCHEMES {
        return Err(LedgerError::TooManySchemes);
    }
    schemes.push(scheme);
    Ok((schemes.len() - 1) as u32)
}

/// Remove `scheme` keeping the others in order, returning its former index
fn unregister_scheme(schemes: &mut Vec<Address>, scheme: Address) -> LedgerResult<u32> {
    let index = schemes
        .iter()
        .position(|registered| *registered == scheme)
        .ok_or(LedgerError::SchemeNotRegistered)?;
    schemes.remove(index);
    Ok(index as u32)
}
