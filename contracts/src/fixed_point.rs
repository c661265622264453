//! Scaled-integer arithmetic for prices, fee rates and the accumulated reward rate.
//!
//! All values are `U256` integers carrying an implicit scale:
//! - prices: `PRICE_PRECISION` (1e18 = 1.0 pUSD per collateral unit)
//! - fee rates: `FEE_PRECISION` (1e18 = 100%)
//! - accumulated reward rate: `RATE_PRECISION`
//!
//! Every operation is overflow-checked and reports `LedgerError::Overflow` or
//! `LedgerError::DivisionByZero` instead of wrapping. Division truncates toward zero.

use odra::casper_types::U256;
use crate::errors::{LedgerError, LedgerResult};

/// Price scale (1e18)
pub const PRICE_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Fee rate scale (1e18 = 1.0)
pub const FEE_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Accumulated reward rate scale (1e18)
pub const RATE_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Fee deducted from a gross amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub fee: U256,
    pub net: U256,
}

pub fn checked_add(a: U256, b: U256) -> LedgerResult<U256> {
    a.checked_add(b).ok_or(LedgerError::Overflow)
}

pub fn checked_sub(a: U256, b: U256) -> LedgerResult<U256> {
    a.checked_sub(b).ok_or(LedgerError::Overflow)
}

/// `a * b / denominator` with a checked intermediate product
pub fn mul_div(a: U256, b: U256, denominator: U256) -> LedgerResult<U256> {
    if denominator.is_zero() {
        return Err(LedgerError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(LedgerError::Overflow)?;
    Ok(product / denominator)
}

/// Collateral amount -> pUSD at `price`
pub fn collateral_to_stable(collateral: U256, price: U256) -> LedgerResult<U256> {
    mul_div(collateral, price, U256::from(PRICE_PRECISION))
}

/// pUSD amount -> collateral at `price`
pub fn stable_to_collateral(stable: U256, price: U256) -> LedgerResult<U256> {
    if price.is_zero() {
        return Err(LedgerError::ZeroPrice);
    }
    mul_div(stable, U256::from(PRICE_PRECISION), price)
}

/// Fee rates live in `[0, FEE_PRECISION]`
pub fn validate_fee_rate(rate: U256) -> LedgerResult<()> {
    if rate > U256::from(FEE_PRECISION) {
        return Err(LedgerError::FeeRateOutOfRange);
    }
    Ok(())
}

/// Split `gross` into fee and net at `rate`
pub fn split_fee(gross: U256, rate: U256) -> LedgerResult<FeeSplit> {
    validate_fee_rate(rate)?;
    let fee = mul_div(gross, rate, U256::from(FEE_PRECISION))?;
    let net = checked_sub(gross, fee)?;
    Ok(FeeSplit { fee, net })
}

/// Stablecoin value of a price move over the collateral held.
///
/// Returns zero when the price did not strictly increase.
pub fn appreciation_value(
    previous_price: U256,
    current_price: U256,
    collateral: U256,
) -> LedgerResult<U256> {
    if current_price <= previous_price {
        return Ok(U256::zero());
    }
    mul_div(current_price - previous_price, collateral, U256::from(PRICE_PRECISION))
}
