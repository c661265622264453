//! Reward scheme extension point.
//!
//! The staking ledger notifies each registered, active scheme when a user's
//! stake changes and after every distribution. [`StakePointsScheme`] uses the
//! hooks to integrate stake over time into loyalty points.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::access_control::{authorize, Role, Roles};
use crate::errors::{LedgerError, LedgerResult};
use crate::fixed_point::{checked_add, checked_sub};

/// Hooks a scheme exposes to the staking ledger
#[odra::external_contract]
pub trait RewardScheme {
    fn is_active(&self) -> bool;
    fn update(&mut self);
    fn update_user_internal_state(&mut self, user: Address, new_staked_amount: U256);
}

/// Per-user points record
#[odra::odra_type]
#[derive(Default)]
pub struct PointsAccount {
    /// Stake as last reported by the ledger
    pub staked: U256,
    /// Points accrued up to `last_update`
    pub points: U256,
    /// Block time (ms) of the last accrual
    pub last_update: u64,
}

/// Stake-weighted loyalty points: one point per pUSD unit staked per ms
#[odra::module]
pub struct StakePointsScheme {
    roles: SubModule<Roles>,
    /// The only caller allowed to invoke hooks
    staking_ledger: Var<Address>,
    active: Var<bool>,
    accounts: Mapping<Address, PointsAccount>,
    /// Global record: all stake reported so far
    global: Var<PointsAccount>,
    /// Number of distributions observed
    update_count: Var<u64>,
}

#[odra::module]
impl StakePointsScheme {
    pub fn init(&mut self, admin: Address, staking_ledger: Address) {
        self.roles.init(admin);
        self.staking_ledger.set(staking_ledger);
        self.active.set(true);
        self.global.set(PointsAccount {
            last_update: self.env().get_block_time(),
            ..Default::default()
        });
        self.update_count.set(0);
    }

    pub fn is_active(&self) -> bool {
        self.active.get().unwrap_or(false)
    }

    /// Distribution hook
    pub fn update(&mut self) {
        self.require_staking_ledger();
        let now = self.env().get_block_time();
        let global = self.or_revert(accrue(self.global.get_or_default(), now));
        self.global.set(global);
        self.update_count.set(self.update_count() + 1);
    }

    /// Stake-change hook
    pub fn update_user_internal_state(&mut self, user: Address, new_staked_amount: U256) {
        self.require_staking_ledger();
        let now = self.env().get_block_time();

        let mut account = self.or_revert(accrue(self.accounts.get(&user).unwrap_or_default(), now));
        let mut global = self.or_revert(accrue(self.global.get_or_default(), now));

        let without_user = self.or_revert(checked_sub(global.staked, account.staked));
        global.staked = self.or_revert(checked_add(without_user, new_staked_amount));
        account.staked = new_staked_amount;

        self.accounts.set(&user, account);
        self.global.set(global);
    }

    /// Points of `user` up to now
    pub fn points_of(&self, user: Address) -> U256 {
        let account = self.accounts.get(&user).unwrap_or_default();
        self.or_revert(accrue(account, self.env().get_block_time())).points
    }

    /// Points of all users up to now
    pub fn total_points(&self) -> U256 {
        self.or_revert(accrue(self.global.get_or_default(), self.env().get_block_time()))
            .points
    }

    pub fn update_count(&self) -> u64 {
        self.update_count.get_or_default()
    }

    pub fn staking_ledger(&self) -> Option<Address> {
        self.staking_ledger.get()
    }

    pub fn set_active(&mut self, active: bool) {
        authorize(&self.roles, Role::Admin);
        self.active.set(active);
    }

    pub fn set_staking_ledger(&mut self, staking_ledger: Address) {
        authorize(&self.roles, Role::Admin);
        self.staking_ledger.set(staking_ledger);
    }

    pub fn grant_role(&mut self, role: Role, account: Address) {
        self.roles.grant_role(role, account);
    }

    pub fn revoke_role(&mut self, role: Role, account: Address) {
        self.roles.revoke_role(role, account);
    }

    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.roles.has_role(role, account)
    }

    fn require_staking_ledger(&self) {
        if self.staking_ledger() != Some(self.env().caller()) {
            self.env().revert(LedgerError::Unauthorized);
        }
        if !self.is_active() {
            self.env().revert(LedgerError::SchemeInactive);
        }
    }

    fn or_revert<T>(&self, result: LedgerResult<T>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => self.env().revert(error),
        }
    }
}

/// Bring `record` forward to `now`
fn accrue(mut record: PointsAccount, now: u64) -> LedgerResult<PointsAccount> {
    let elapsed = now.saturating_sub(record.last_update);
    let earned = record
        .staked
        .checked_mul(U256::from(elapsed))
        .ok_or(LedgerError::Overflow)?;
    record.points = checked_add(record.points, earned)?;
    record.last_update = now;
    Ok(record)
}
