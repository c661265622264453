//! Collateral vault swaps, reward capture and fee configuration.

use crate::fixture::{percent, units, Protocol, ONE};
use odra::casper_types::U256;
use pegged_yield_contracts::errors::LedgerError;
use pegged_yield_contracts::types::TxState;
use pretty_assertions::assert_eq;

#[test]
fn test_mint_with_one_percent_fee() {
    let mut p = Protocol::deploy();
    p.enable_fees(percent(1), U256::zero());
    let user = p.account(1);
    let recipient = p.account(2);

    p.fund_collateral(user, units(100));
    let tx_id = p.approve_mint(user, units(100), recipient, 1);
    p.env.set_caller(user);
    p.vault.mint(tx_id, units(100), recipient, 1);

    assert_eq!(p.ledger.balance_of(recipient), units(198));
    assert_eq!(p.ledger.balance_of(p.fee_receiver), units(2));
    assert_eq!(p.ledger.total_supply(), units(200));
    assert_eq!(p.vault.total_collateral(), units(100));
    assert_eq!(p.collateral.balance_of(&p.vault_address()), units(100));
    assert_eq!(p.ledger.mint_state(tx_id), TxState::Executed);
    assert_eq!(p.vault.total_fees_collected(), units(2));
}

#[test]
fn test_quote_matches_mint() {
    let mut p = Protocol::deploy();
    p.enable_fees(percent(1), U256::zero());

    let quote = p.vault.quote_mint(units(100));
    assert_eq!(quote.amount_in, units(100));
    assert_eq!(quote.fee, units(2));
    assert_eq!(quote.amount_out, units(198));
    assert_eq!(quote.price, units(2));
}

#[test]
fn test_redeem_routes_fee_and_returns_collateral() {
    let mut p = Protocol::deploy();
    let user = p.account(1);
    let recipient = p.account(3);
    p.swap_in(user, units(100), 1);
    assert_eq!(p.ledger.balance_of(user), units(200));

    p.enable_fees(U256::zero(), percent(1));
    let tx_id = p.approve_burn(user, units(100), recipient, 2);
    p.env.set_caller(user);
    p.vault.redeem(tx_id, units(100), recipient, 2);

    // fee 1, net 99 burned, 99 / 2.0 = 49.5 collateral out
    let collateral_out = U256::from(49u64) * U256::from(ONE) + U256::from(ONE / 2);
    assert_eq!(p.ledger.balance_of(user), units(100));
    assert_eq!(p.ledger.balance_of(p.fee_receiver), units(1));
    assert_eq!(p.ledger.total_supply(), units(101));
    assert_eq!(p.collateral.balance_of(&recipient), collateral_out);
    assert_eq!(p.vault.total_collateral(), units(100) - collateral_out);
    assert_eq!(p.ledger.burn_state(tx_id), TxState::Executed);
}

#[test]
fn test_redeem_beyond_custody_fails() {
    let mut p = Protocol::deploy();
    let user = p.account(1);
    p.swap_in(user, units(10), 1);
    // pUSD from outside the vault cannot drain more collateral than it holds
    p.mint_pusd(user, units(1000));

    let tx_id = p.approve_burn(user, units(1000), user, 2);
    p.env.set_caller(user);
    assert_eq!(
        p.vault.try_redeem(tx_id, units(1000), user, 2),
        Err(LedgerError::InsufficientCollateral.into())
    );
}

#[test]
fn test_reward_capture_mints_to_staking_ledger() {
    let mut p = Protocol::deploy();
    let user = p.account(1);
    p.swap_in(user, units(100), 1);
    p.report_price(units(3));

    let reward = p.vault.reward_capture();

    // 100 collateral x (3.0 - 2.0) = 100 pUSD
    assert_eq!(reward, units(100));
    assert_eq!(p.ledger.balance_of(p.staking_address()), units(100));
    assert_eq!(p.ledger.total_supply(), units(300));
    assert_eq!(p.vault.last_observed_price(), units(3));
    assert_eq!(p.vault.total_reward_captured(), units(100));

    let increment = units(100) * U256::from(ONE) / units(300);
    assert_eq!(p.staking.global_rate(), increment);
    // nothing staked: the whole reward belongs to the reserve, up to rounding
    assert_eq!(
        p.staking.reward_of(p.reserve),
        units(300) * increment / U256::from(ONE)
    );
}

#[test]
fn test_reward_capture_is_noop_without_price_increase() {
    let mut p = Protocol::deploy();
    let user = p.account(1);
    p.swap_in(user, units(100), 1);

    assert_eq!(p.vault.reward_capture(), U256::zero());
    assert_eq!(p.ledger.total_supply(), units(200));
    assert_eq!(p.staking.global_rate(), U256::zero());
}

#[test]
fn test_reward_capture_without_collateral_only_moves_price() {
    let mut p = Protocol::deploy();
    p.report_price(units(5));

    assert_eq!(p.vault.reward_capture(), U256::zero());
    assert_eq!(p.vault.last_observed_price(), units(5));
    assert_eq!(p.ledger.total_supply(), U256::zero());
}

#[test]
fn test_stale_price_blocks_swaps() {
    let mut p = Protocol::deploy();
    let user = p.account(1);
    p.fund_collateral(user, units(10));
    p.report_price(units(5) / U256::from(2u64));

    let tx_id = p.approve_mint(user, units(10), user, 1);
    p.env.set_caller(user);
    assert_eq!(
        p.vault.try_mint(tx_id, units(10), user, 1),
        Err(LedgerError::StalePrice.into())
    );

    // capture first, then the same record goes through at the new price
    p.vault.reward_capture();
    p.vault.mint(tx_id, units(10), user, 1);
    assert_eq!(p.ledger.balance_of(user), units(25));
}

#[test]
fn test_malformed_authorization_rejected() {
    let mut p = Protocol::deploy();
    let user = p.account(1);
    p.fund_collateral(user, units(10));
    let tx_id = p.approve_mint(user, units(10), user, 1);

    p.env.set_caller(user);
    // amount differs from the one the id commits to
    assert_eq!(
        p.vault.try_mint(tx_id, units(9), user, 1),
        Err(LedgerError::MalformedAuthorization.into())
    );
    // another initiator replaying the id
    let other = p.account(2);
    p.env.set_caller(other);
    assert_eq!(
        p.vault.try_mint(tx_id, units(10), user, 1),
        Err(LedgerError::MalformedAuthorization.into())
    );
}

#[test]
fn test_mint_requires_approved_record() {
    let mut p = Protocol::deploy();
    let user = p.account(1);
    p.fund_collateral(user, units(10));
    let tx_id = p.vault.compute_tx_id(user, units(10), user, 1);

    p.env.set_caller(user);
    assert_eq!(
        p.vault.try_mint(tx_id, units(10), user, 1),
        Err(LedgerError::InvalidTxState.into())
    );
    // the failed call left no collateral behind
    assert_eq!(p.vault.total_collateral(), U256::zero());
    assert_eq!(p.collateral.balance_of(&user), units(10));
}

#[test]
fn test_authorization_is_single_use() {
    let mut p = Protocol::deploy();
    let user = p.account(1);
    p.fund_collateral(user, units(20));
    let tx_id = p.approve_mint(user, units(10), user, 1);

    p.env.set_caller(user);
    p.vault.mint(tx_id, units(10), user, 1);
    assert_eq!(
        p.vault.try_mint(tx_id, units(10), user, 1),
        Err(LedgerError::InvalidTxState.into())
    );

    p.env.set_caller(p.admin);
    assert_eq!(p.ledger.try_approve_mint(tx_id), Err(LedgerError::InvalidTxState.into()));
    assert_eq!(p.ledger.try_cancel_mint(tx_id), Err(LedgerError::InvalidTxState.into()));
    assert_eq!(p.ledger.balance_of(user), units(20));
}

#[test]
fn test_canceled_record_cannot_execute() {
    let mut p = Protocol::deploy();
    let user = p.account(1);
    p.fund_collateral(user, units(10));
    let tx_id = p.approve_mint(user, units(10), user, 1);

    p.env.set_caller(p.admin);
    p.ledger.cancel_mint(tx_id);
    assert_eq!(p.ledger.mint_state(tx_id), TxState::Canceled);
    assert_eq!(p.ledger.try_approve_mint(tx_id), Err(LedgerError::InvalidTxState.into()));

    p.env.set_caller(user);
    assert_eq!(
        p.vault.try_mint(tx_id, units(10), user, 1),
        Err(LedgerError::InvalidTxState.into())
    );
}

#[test]
fn test_fee_configuration_rules() {
    let mut p = Protocol::deploy();
    p.env.set_caller(p.admin);

    assert_eq!(
        p.vault.try_set_mint_fee_rate(percent(1)),
        Err(LedgerError::FeeReceiverNotSet.into())
    );

    p.vault.set_fee_receiver(Some(p.fee_receiver));
    assert_eq!(
        p.vault.try_set_redeem_fee_rate(U256::from(ONE) + U256::one()),
        Err(LedgerError::FeeRateOutOfRange.into())
    );

    p.vault.set_mint_fee_rate(U256::from(ONE));
    assert_eq!(p.vault.mint_fee_rate(), U256::from(ONE));
    assert_eq!(
        p.vault.try_set_fee_receiver(None),
        Err(LedgerError::FeeReceiverNotSet.into())
    );

    p.vault.set_mint_fee_rate(U256::zero());
    p.vault.set_fee_receiver(None);
    assert_eq!(p.vault.fee_receiver(), None);
}

#[test]
fn test_fee_configuration_is_admin_only() {
    let mut p = Protocol::deploy();
    let stranger = p.account(4);
    p.env.set_caller(stranger);
    assert_eq!(
        p.vault.try_set_fee_receiver(Some(stranger)),
        Err(LedgerError::Unauthorized.into())
    );
}

#[test]
fn test_redeem_more_than_balance_keeps_record_approved() {
    let mut p = Protocol::deploy();
    let user = p.account(1);
    // custody holds 30 collateral (60 pUSD worth), the user only 40 pUSD
    p.swap_in(user, units(20), 1);
    p.swap_in(p.account(2), units(10), 2);
    let tx_id = p.approve_burn(user, units(50), user, 3);

    p.env.set_caller(user);
    assert_eq!(
        p.vault.try_redeem(tx_id, units(50), user, 3),
        Err(LedgerError::InsufficientBalance.into())
    );
    assert_eq!(p.ledger.burn_state(tx_id), TxState::Approved);
    assert_eq!(p.ledger.balance_of(user), units(40));
    assert_eq!(p.vault.total_collateral(), units(30));
}

#[test]
fn test_redeem_by_denylisted_initiator_rejected() {
    let mut p = Protocol::deploy();
    let user = p.account(1);
    let recipient = p.account(3);
    p.swap_in(user, units(20), 1);
    let tx_id = p.approve_burn(user, units(10), recipient, 2);

    p.env.set_caller(p.admin);
    p.ledger.set_denylisted(user, true);
    p.env.set_caller(user);
    assert_eq!(
        p.vault.try_redeem(tx_id, units(10), recipient, 2),
        Err(LedgerError::Denylisted.into())
    );
    assert_eq!(p.ledger.burn_state(tx_id), TxState::Approved);
    assert_eq!(p.ledger.balance_of(user), units(40));
    assert_eq!(p.collateral.balance_of(&recipient), U256::zero());
}
