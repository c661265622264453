//! Accumulated-rate reward accounting.
//!
//! The staking ledger keeps one global counter, `global_rate`, scaled by
//! `RATE_PRECISION`. Every distribution of `R` pUSD over a supply `S` bumps it
//! by `R * RATE_PRECISION / S`. An account's unsettled reward is
//! `staked * (global_rate - entry_rate) / RATE_PRECISION`, and settling moves
//! that amount into `stored_reward` and re-checkpoints the account.
//!
//! Supply that is minted but not staked earns through the reserve account,
//! credited directly at distribution time.

use odra::casper_types::U256;
use crate::errors::{LedgerError, LedgerResult};
use crate::fixed_point::{checked_add, checked_sub, mul_div, RATE_PRECISION};
use crate::types::StakeAccount;

/// Result of splitting a reward across the supply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Distribution {
    /// Added to the global accumulated rate
    pub rate_increment: U256,
    /// Credited to the reserve for the unstaked part of the supply
    pub reserve_share: U256,
}

/// Reward accrued since the account's checkpoint, without mutating it
pub fn pending_reward(account: &StakeAccount, global_rate: U256) -> LedgerResult<U256> {
    if account.entry_rate > global_rate {
        return Err(LedgerError::RateRegression);
    }
    if account.staked.is_zero() {
        return Ok(U256::zero());
    }
    mul_div(
        account.staked,
        global_rate - account.entry_rate,
        U256::from(RATE_PRECISION),
    )
}

/// Move pending reward into `stored_reward` and checkpoint at `global_rate`.
///
/// Returns the amount settled. Calling it twice without an intervening
/// distribution settles zero the second time.
pub fn settle(account: &mut StakeAccount, global_rate: U256) -> LedgerResult<U256> {
    let pending = pending_reward(account, global_rate)?;
    account.stored_reward = checked_add(account.stored_reward, pending)?;
    account.entry_rate = global_rate;
    Ok(pending)
}

/// Fix the checkpoint after the staked amount changed. An emptied position
/// drops its checkpoint and lock; stored reward stays.
pub fn finalize_checkpoint(account: &mut StakeAccount, global_rate: U256) {
    if account.staked.is_zero() {
        account.entry_rate = U256::zero();
        account.lock_start = 0;
    } else {
        account.entry_rate = global_rate;
    }
}

/// Total reward an account could claim right now
pub fn available_reward(account: &StakeAccount, global_rate: U256) -> LedgerResult<U256> {
    checked_add(account.stored_reward, pending_reward(account, global_rate)?)
}

/// Split `reward` between stakers (through the rate) and the reserve.
pub fn distribution(
    reward: U256,
    total_supply: U256,
    total_staked: U256,
) -> LedgerResult<Distribution> {
    if reward.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }
    if total_supply < total_staked {
        return Err(LedgerError::SupplyBelowStaked);
    }
    let rate_increment = mul_div(reward, U256::from(RATE_PRECISION), total_supply)?;
    let unstaked_supply = checked_sub(total_supply, total_staked)?;
    let reserve_share = mul_div(unstaked_supply, rate_increment, U256::from(RATE_PRECISION))?;
    Ok(Distribution {
        rate_increment,
        reserve_share,
    })
}
