//! CEP-18 token interface for cross-contract calls.
//!
//! Used for the collateral asset held by the vault, for the pUSD ledger as
//! seen by the staking ledger, and for foreign tokens recovered by `rescue`.

use odra::prelude::*;
use odra::casper_types::U256;

#[odra::external_contract]
pub trait Cep18Token {
    fn transfer(&mut self, recipient: Address, amount: U256);
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256);
    fn allowance(&self, owner: Address, spender: Address) -> U256;
    fn balance_of(&self, address: Address) -> U256;
    fn total_supply(&self) -> U256;
}

/// The privileged surface of the pUSD ledger that the vault drives
#[odra::external_contract]
pub trait PeggedLedger {
    fn execute_mint_by_tx(&mut self, tx_id: U256, amount: U256, to: Address);
    fn execute_burn_by_tx(&mut self, tx_id: U256, amount: U256, from: Address);
    fn mint_privileged(&mut self, amount: U256, to: Address);
    fn protocol_transfer(&mut self, from: Address, to: Address, amount: U256);
    fn total_supply(&self) -> U256;
}
