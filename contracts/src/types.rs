//! Common types used across the ledger contracts.

use odra::prelude::*;
use odra::casper_types::account::AccountHash;
use odra::casper_types::U256;

/// Authorization record identifier (big-endian blake2b digest)
pub type TxId = U256;

/// The all-zero account, never a valid mint target or burn source
pub fn zero_address() -> Address {
    Address::Account(AccountHash::new([0u8; 32]))
}

/// Lifecycle of a two-phase mint/burn authorization record
#[odra::odra_type]
#[derive(Copy, Default)]
pub enum TxState {
    /// Never touched
    #[default]
    Unset = 0,
    /// Approved and waiting for the executor
    Approved = 1,
    /// Consumed by the executor
    Executed = 2,
    /// Withdrawn by an approver before execution
    Canceled = 3,
}

/// Which record book an authorization lives in
#[odra::odra_type]
#[derive(Copy)]
pub enum TxKind {
    Mint,
    Burn,
}

/// Swap direction through the collateral vault
#[odra::odra_type]
#[derive(Copy)]
pub enum SwapDirection {
    /// collateral -> pUSD
    Mint,
    /// pUSD -> collateral
    Redeem,
}

/// Per-account staking record
#[odra::odra_type]
#[derive(Default)]
pub struct StakeAccount {
    /// Staked pUSD
    pub staked: U256,
    /// Global accumulated rate at the last settlement
    pub entry_rate: U256,
    /// Settled, unclaimed reward
    pub stored_reward: U256,
    /// Block time (ms) the lock was last armed
    pub lock_start: u64,
}

/// Preview of a vault swap
#[odra::odra_type]
#[derive(Default)]
pub struct SwapQuote {
    /// Amount the caller puts in (collateral for mint, pUSD for redeem)
    pub amount_in: U256,
    /// Fee in pUSD
    pub fee: U256,
    /// Amount the recipient receives (pUSD for mint, collateral for redeem)
    pub amount_out: U256,
    /// Price used for the quote
    pub price: U256,
}

/// Vault statistics
#[odra::odra_type]
pub struct VaultStats {
    /// Collateral in custody
    pub total_collateral: U256,
    /// Last price at which appreciation was captured
    pub last_observed_price: U256,
    /// Mint fee rate (1e18 = 100%)
    pub mint_fee_rate: U256,
    /// Redeem fee rate (1e18 = 100%)
    pub redeem_fee_rate: U256,
    /// Cumulative reward captured and distributed
    pub total_reward_captured: U256,
    /// Cumulative fees collected, in pUSD
    pub total_fees_collected: U256,
}

/// Staking ledger statistics
#[odra::odra_type]
pub struct StakingStats {
    /// Sum of all staked amounts
    pub total_staked: U256,
    /// Global accumulated reward rate
    pub global_rate: U256,
    /// Reserve account address
    pub reserve: Address,
    /// Reserve's settled reward
    pub reserve_reward: U256,
    /// Cumulative reward distributed by updaters
    pub total_distributed: U256,
    /// Minimum lock period in ms
    pub min_lock_period: u64,
    /// Number of registered reward schemes
    pub scheme_count: u32,
}

/// A single reported oracle price
#[odra::odra_type]
#[derive(Default)]
pub struct PriceRound {
    /// Price scaled by 1e18
    pub price: U256,
    /// Block time (ms) of the report
    pub timestamp: u64,
    /// Monotonic round counter
    pub round: u64,
}
