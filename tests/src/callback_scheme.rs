//! Reward scheme whose stake hook calls back into the staking ledger.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;
use pegged_yield_contracts::staking::StakingLedgerContractRef;

#[odra::module]
pub struct CallbackScheme {
    staking_ledger: Var<Address>,
}

#[odra::module]
impl CallbackScheme {
    pub fn init(&mut self, staking_ledger: Address) {
        self.staking_ledger.set(staking_ledger);
    }

    pub fn is_active(&self) -> bool {
        true
    }

    pub fn update(&mut self) {}

    pub fn update_user_internal_state(&mut self, user: Address, new_staked_amount: U256) {
        if let Some(staking_ledger) = self.staking_ledger.get() {
            StakingLedgerContractRef::new(self.env().clone(), staking_ledger).stake(new_staked_amount);
        }
    }
}
