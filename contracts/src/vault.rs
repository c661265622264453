//! Collateral Vault
//!
//! Swaps the collateral asset for pUSD and back at the oracle price, and turns
//! collateral appreciation into pUSD rewards for the staking ledger.
//!
//! Key mechanics:
//! - Swaps only run at `last_observed_price`. When the oracle has moved above
//!   it, `reward_capture` must run first, otherwise the swap fails with
//!   `StalePrice` and the appreciation stays with existing stakers.
//! - Every swap consumes a pre-approved record on the ledger whose id commits
//!   to (network id, vault, initiator, amount, recipient, timestamp).
//! - Fees are taken in pUSD: minted to the receiver on mint, moved from the
//!   initiator on redeem.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::access_control::{authorize, Role, Roles};
use crate::authorization::{tx_id_from_digest, AuthorizationRequest};
use crate::errors::{LedgerError, LedgerResult};
use crate::events::{FeeCollected, RewardCaptured, Swapped};
use crate::fixed_point::{
    appreciation_value, checked_add, collateral_to_stable, split_fee,
    stable_to_collateral, validate_fee_rate,
};
use crate::oracle::PriceOracleContractRef;
use crate::staking::RewardDistributorContractRef;
use crate::token::{Cep18TokenContractRef, PeggedLedgerContractRef};
use crate::types::{zero_address, SwapDirection, SwapQuote, TxId, VaultStats};

/// Collateral Vault
#[odra::module(events = [Swapped, FeeCollected, RewardCaptured])]
pub struct CollateralVault {
    /// Capability book
    roles: SubModule<Roles>,
    /// Collateral CEP-18 token
    collateral_token: Var<Address>,
    /// pUSD ledger
    stablecoin: Var<Address>,
    /// Staking ledger receiving captured rewards
    staking_ledger: Var<Address>,
    /// Price oracle
    oracle: Var<Address>,
    /// Network id committed to by authorization ids
    network_id: Var<u64>,
    /// Price at which appreciation was last captured
    last_observed_price: Var<U256>,
    /// Mint fee rate (1e18 = 100%)
    mint_fee_rate: Var<U256>,
    /// Redeem fee rate (1e18 = 100%)
    redeem_fee_rate: Var<U256>,
    /// Fee receiver, required before any non-zero fee rate
    fee_receiver: Var<Option<Address>>,
    /// Collateral in custody
    total_collateral: Var<U256>,
    /// Cumulative reward minted to the staking ledger
    total_reward_captured: Var<U256>,
    /// Cumulative fees, in pUSD
    total_fees_collected: Var<U256>,
}

#[odra::module]
impl CollateralVault {
    /// Initialize the vault. The first observed price is read from the oracle.
    pub fn init(
        &mut self,
        admin: Address,
        collateral_token: Address,
        stablecoin: Address,
        staking_ledger: Address,
        oracle: Address,
        network_id: u64,
    ) {
        self.roles.init(admin);
        self.collateral_token.set(collateral_token);
        self.stablecoin.set(stablecoin);
        self.staking_ledger.set(staking_ledger);
        self.oracle.set(oracle);
        self.network_id.set(network_id);
        self.mint_fee_rate.set(U256::zero());
        self.redeem_fee_rate.set(U256::zero());
        self.fee_receiver.set(None);
        self.total_collateral.set(U256::zero());
        self.total_reward_captured.set(U256::zero());
        self.total_fees_collected.set(U256::zero());

        let price = self.current_price();
        self.last_observed_price.set(price);
    }

    // ========== Swaps ==========

    /// Deposit collateral and receive pUSD at the current price, minus the mint fee.
    #[odra(non_reentrant)]
    pub fn mint(&mut self, tx_id: TxId, collateral_amount: U256, recipient: Address, timestamp: u64) {
        let initiator = self.env().caller();
        self.require_authorization(tx_id, initiator, collateral_amount, recipient, timestamp);
        let price = self.synced_price();

        let gross = self.or_revert(collateral_to_stable(collateral_amount, price));
        let split = self.or_revert(split_fee(gross, self.mint_fee_rate()));
        if split.net.is_zero() {
            self.env().revert(LedgerError::ZeroAmount);
        }

        let self_address = self.env().self_address();
        self.collateral().transfer_from(initiator, self_address, collateral_amount);
        let total = self.or_revert(checked_add(self.total_collateral(), collateral_amount));
        self.total_collateral.set(total);

        let mut ledger = self.ledger();
        ledger.execute_mint_by_tx(tx_id, split.net, recipient);

        if !split.fee.is_zero() {
            let receiver = self.require_fee_receiver();
            ledger.mint_privileged(split.fee, receiver);
            self.record_fee(receiver, SwapDirection::Mint, split.fee);
        }

        self.env().emit_event(Swapped {
            initiator,
            recipient,
            direction: SwapDirection::Mint,
            amount_in: collateral_amount,
            amount_out: split.net,
        });
    }

    /// Burn pUSD and receive collateral at the current price. The redeem fee
    /// is deducted from the pUSD amount before conversion.
    #[odra(non_reentrant)]
    pub fn redeem(&mut self, tx_id: TxId, stable_amount: U256, recipient: Address, timestamp: u64) {
        let initiator = self.env().caller();
        self.require_authorization(tx_id, initiator, stable_amount, recipient, timestamp);
        let price = self.synced_price();

        let split = self.or_revert(split_fee(stable_amount, self.redeem_fee_rate()));
        let collateral_out = self.or_revert(stable_to_collateral(split.net, price));
        if collateral_out.is_zero() {
            self.env().revert(LedgerError::ZeroAmount);
        }
        let total_collateral = self.total_collateral();
        if total_collateral < collateral_out {
            self.env().revert(LedgerError::InsufficientCollateral);
        }

        let mut ledger = self.ledger();
        ledger.execute_burn_by_tx(tx_id, split.net, initiator);

        if !split.fee.is_zero() {
            let receiver = self.require_fee_receiver();
            ledger.protocol_transfer(initiator, receiver, split.fee);
            self.record_fee(receiver, SwapDirection::Redeem, split.fee);
        }

        self.total_collateral.set(total_collateral - collateral_out);
        self.collateral().transfer(recipient, collateral_out);

        self.env().emit_event(Swapped {
            initiator,
            recipient,
            direction: SwapDirection::Redeem,
            amount_in: stable_amount,
            amount_out: collateral_out,
        });
    }

    /// Convert collateral appreciation since the last capture into pUSD for
    /// stakers. Callable by anyone; returns the reward minted (zero when the
    /// price has not moved up).
    #[odra(non_reentrant)]
    pub fn reward_capture(&mut self) -> U256 {
        let price = self.current_price();
        let previous = self.last_observed_price();
        if price <= previous {
            return U256::zero();
        }

        let collateral = self.total_collateral();
        let reward = self.or_revert(appreciation_value(previous, price, collateral));

        if !collateral.is_zero() && !reward.is_zero() {
            let staking_ledger = self.staking_ledger();
            self.ledger().mint_privileged(reward, staking_ledger);
            RewardDistributorContractRef::new(self.env().clone(), staking_ledger).distribute(reward);

            let captured = self.or_revert(checked_add(self.total_reward_captured(), reward));
            self.total_reward_captured.set(captured);

            self.env().emit_event(RewardCaptured {
                previous_price: previous,
                current_price: price,
                reward,
            });
        }

        self.last_observed_price.set(price);
        reward
    }

    // ========== Queries ==========

    /// Authorization id approvers sign off on for a swap
    pub fn compute_tx_id(
        &self,
        initiator: Address,
        amount: U256,
        recipient: Address,
        timestamp: u64,
    ) -> TxId {
        let request = AuthorizationRequest {
            network_id: self.network_id(),
            vault: self.env().self_address(),
            initiator,
            amount,
            recipient,
            timestamp,
        };
        let preimage = self.or_revert(request.preimage());
        tx_id_from_digest(self.env().hash(preimage))
    }

    /// Preview a mint of `collateral_amount`
    pub fn quote_mint(&self, collateral_amount: U256) -> SwapQuote {
        let price = self.synced_price();
        self.or_revert(mint_quote(collateral_amount, price, self.mint_fee_rate()))
    }

    /// Preview a redeem of `stable_amount`
    pub fn quote_redeem(&self, stable_amount: U256) -> SwapQuote {
        let price = self.synced_price();
        self.or_revert(redeem_quote(stable_amount, price, self.redeem_fee_rate()))
    }

    pub fn stats(&self) -> VaultStats {
        VaultStats {
            total_collateral: self.total_collateral(),
            last_observed_price: self.last_observed_price(),
            mint_fee_rate: self.mint_fee_rate(),
            redeem_fee_rate: self.redeem_fee_rate(),
            total_reward_captured: self.total_reward_captured(),
            total_fees_collected: self.total_fees_collected(),
        }
    }

    pub fn last_observed_price(&self) -> U256 {
        self.last_observed_price.get_or_default()
    }

    pub fn total_collateral(&self) -> U256 {
        self.total_collateral.get_or_default()
    }

    pub fn total_reward_captured(&self) -> U256 {
        self.total_reward_captured.get_or_default()
    }

    pub fn total_fees_collected(&self) -> U256 {
        self.total_fees_collected.get_or_default()
    }

    pub fn mint_fee_rate(&self) -> U256 {
        self.mint_fee_rate.get_or_default()
    }

    pub fn redeem_fee_rate(&self) -> U256 {
        self.redeem_fee_rate.get_or_default()
    }

    pub fn fee_receiver(&self) -> Option<Address> {
        self.fee_receiver.get().flatten()
    }

    pub fn network_id(&self) -> u64 {
        self.network_id.get_or_default()
    }

    pub fn collateral_token(&self) -> Address {
        self.config_address(&self.collateral_token)
    }

    pub fn stablecoin(&self) -> Address {
        self.config_address(&self.stablecoin)
    }

    pub fn staking_ledger(&self) -> Address {
        self.config_address(&self.staking_ledger)
    }

    pub fn oracle(&self) -> Address {
        self.config_address(&self.oracle)
    }

    // ========== Admin Functions ==========

    /// Set or clear the fee receiver (admin only). Clearing it while any
    /// fee rate is non-zero fails.
    #[odra(non_reentrant)]
    pub fn set_fee_receiver(&mut self, receiver: Option<Address>) {
        authorize(&self.roles, Role::Admin);
        match receiver {
            Some(address) if address == zero_address() => {
                self.env().revert(LedgerError::ZeroAddress);
            }
            None if !self.mint_fee_rate().is_zero() || !self.redeem_fee_rate().is_zero() => {
                self.env().revert(LedgerError::FeeReceiverNotSet);
            }
            _ => {}
        }
        self.fee_receiver.set(receiver);
    }

    #[odra(non_reentrant)]
    pub fn set_mint_fee_rate(&mut self, rate: U256) {
        authorize(&self.roles, Role::Admin);
        self.require_valid_fee_rate(rate);
        self.mint_fee_rate.set(rate);
    }

    #[odra(non_reentrant)]
    pub fn set_redeem_fee_rate(&mut self, rate: U256) {
        authorize(&self.roles, Role::Admin);
        self.require_valid_fee_rate(rate);
        self.redeem_fee_rate.set(rate);
    }

    /// Point the vault at a new oracle. `last_observed_price` is kept.
    #[odra(non_reentrant)]
    pub fn set_oracle(&mut self, oracle: Address) {
        authorize(&self.roles, Role::Admin);
        if oracle == zero_address() {
            self.env().revert(LedgerError::ZeroAddress);
        }
        self.oracle.set(oracle);
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

    fn require_authorization(
        &self,
        tx_id: TxId,
        initiator: Address,
        amount: U256,
        recipient: Address,
        timestamp: u64,
    ) {
        if amount.is_zero() {
            self.env().revert(LedgerError::ZeroAmount);
        }
        if recipient == zero_address() {
            self.env().revert(LedgerError::ZeroAddress);
        }
        if self.compute_tx_id(initiator, amount, recipient, timestamp) != tx_id {
            self.env().revert(LedgerError::MalformedAuthorization);
        }
    }

    /// Oracle price, which must equal the last observed price
    fn synced_price(&self) -> U256 {
        let price = self.current_price();
        let last_observed = self.last_observed_price();
        if price > last_observed {
            self.env().revert(LedgerError::StalePrice);
        }
        if price < last_observed {
            self.env().revert(LedgerError::PriceRegression);
        }
        price
    }

    fn current_price(&self) -> U256 {
        let price = PriceOracleContractRef::new(self.env().clone(), self.oracle()).get_latest_price();
        if price.is_zero() {
            self.env().revert(LedgerError::ZeroPrice);
        }
        price
    }

    fn require_valid_fee_rate(&self, rate: U256) {
        self.or_revert(validate_fee_rate(rate));
        if !rate.is_zero() && self.fee_receiver().is_none() {
            self.env().revert(LedgerError::FeeReceiverNotSet);
        }
    }

    fn require_fee_receiver(&self) -> Address {
        match self.fee_receiver() {
            Some(receiver) => receiver,
            None => self.env().revert(LedgerError::FeeReceiverNotSet),
        }
    }

    fn record_fee(&mut self, receiver: Address, direction: SwapDirection, amount: U256) {
        let total = self.or_revert(checked_add(self.total_fees_collected(), amount));
        self.total_fees_collected.set(total);
        self.env().emit_event(FeeCollected { receiver, direction, amount });
    }

    fn collateral(&self) -> Cep18TokenContractRef {
        Cep18TokenContractRef::new(self.env().clone(), self.collateral_token())
    }

    fn ledger(&self) -> PeggedLedgerContractRef {
        PeggedLedgerContractRef::new(self.env().clone(), self.stablecoin())
    }

    fn config_address(&self, slot: &Var<Address>) -> Address {
        match slot.get() {
            Some(address) => address,
            None => self.env().revert(LedgerError::InvalidConfig),
        }
    }

    fn or_revert<T>(&self, result: LedgerResult<T>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => self.env().revert(error),
        }
    }
}

fn mint_quote(collateral_amount: U256, price: U256, fee_rate: U256) -> LedgerResult<SwapQuote> {
    let gross = collateral_to_stable(collateral_amount, price)?;
    let split = split_fee(gross, fee_rate)?;
    Ok(SwapQuote {
        amount_in: collateral_amount,
        fee: split.fee,
        amount_out: split.net,
        price,
    })
}

fn redeem_quote(stable_amount: U256, price: U256, fee_rate: U256) -> LedgerResult<SwapQuote> {
    let split = split_fee(stable_amount, fee_rate)?;
    Ok(SwapQuote {
        amount_in: stable_amount,
        fee: split.fee,
        amount_out: stable_to_collateral(split.net, price)?,
        price,
    })
}
