//! Structured event records.
//!
//! Field order is part of the public interface: indexers decode these records
//! positionally, so fields are only ever appended, never reordered.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::types::{SwapDirection, TxId, TxKind};

/// pUSD minted, either through an executed record or the privileged path (`tx_id` = 0)
#[odra::event]
pub struct Mint {
    pub tx_id: TxId,
    pub to: Address,
    pub amount: U256,
}

/// pUSD burned through an executed record
#[odra::event]
pub struct Burn {
    pub tx_id: TxId,
    pub from: Address,
    pub amount: U256,
}

#[odra::event]
pub struct TxApproved {
    pub tx_id: TxId,
    pub kind: TxKind,
}

#[odra::event]
pub struct TxCanceled {
    pub tx_id: TxId,
    pub kind: TxKind,
}

#[odra::event]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}

#[odra::event]
pub struct Approval {
    pub owner: Address,
    pub spender: Address,
    pub amount: U256,
}

#[odra::event]
pub struct DenylistUpdated {
    pub account: Address,
    pub denylisted: bool,
}

#[odra::event]
pub struct Rescued {
    pub token: Address,
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}

#[odra::event]
pub struct PauseChanged {
    pub paused: bool,
    pub by: Address,
}

#[odra::event]
pub struct Swapped {
    pub initiator: Address,
    pub recipient: Address,
    pub direction: SwapDirection,
    pub amount_in: U256,
    pub amount_out: U256,
}

#[odra::event]
pub struct FeeCollected {
    pub receiver: Address,
    pub direction: SwapDirection,
    pub amount: U256,
}

#[odra::event]
pub struct RewardCaptured {
    pub previous_price: U256,
    pub current_price: U256,
    pub reward: U256,
}

#[odra::event]
pub struct Staked {
    pub account: Address,
    pub amount: U256,
    pub total_staked: U256,
}

#[odra::event]
pub struct Unstaked {
    pub account: Address,
    pub amount: U256,
    pub total_staked: U256,
}

#[odra::event]
pub struct Restaked {
    pub account: Address,
    pub amount: U256,
    pub total_staked: U256,
}

#[odra::event]
pub struct Claimed {
    pub account: Address,
    pub amount: U256,
}

#[odra::event]
pub struct RewardDistributed {
    pub vault: Address,
    pub reward: U256,
    pub rate_increment: U256,
    pub reserve_share: U256,
    pub global_rate: U256,
}

#[odra::event]
pub struct SchemeAdded {
    pub scheme: Address,
    pub index: u32,
}

#[odra::event]
pub struct SchemeRemoved {
    pub scheme: Address,
    pub index: u32,
}

#[odra::event]
pub struct ReserveSet {
    pub previous: Address,
    pub current: Address,
    pub carried_reward: U256,
}

#[odra::event]
pub struct PriceReported {
    pub price: U256,
    pub round: u64,
}
