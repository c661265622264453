//! Pegged Yield Contracts
//!
//! Collateral-backed pUSD with appreciation-funded staking rewards on Casper.
//!
//! ## Architecture
//!
//! - **StablecoinLedger (pUSD)**: CEP-18 ledger with two-phase mint/burn records,
//!   denylist, pause, delegated approvals and rescue
//! - **CollateralVault**: Swaps collateral for pUSD at the oracle price and
//!   captures collateral appreciation as staking rewards
//! - **StakingLedger**: Accumulated-rate reward accounting with lock periods,
//!   a reserve account for unstaked supply and pluggable reward schemes
//! - **PriceFeed**: Governed 18-decimal price source
//! - **StakePointsScheme**: Reward scheme integrating stake over time
//!
//! ## Reward Flow
//!
//! PriceFeed -> CollateralVault::reward_capture -> StablecoinLedger::mint_privileged
//! -> StakingLedger::distribute -> RewardScheme::update
//!
//! Swaps are rejected while the oracle price is above the vault's last
//! observed price, so appreciation is always captured before the supply moves.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod fixed_point;
pub mod accrual;
pub mod authorization;
pub mod access_control;
pub mod events;
pub mod token;

// Contract modules
pub mod oracle;
pub mod stablecoin;
pub mod vault;
pub mod staking;
pub mod reward_scheme;
