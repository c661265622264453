//! Price oracle interface and a governed price feed.
//!
//! The vault only depends on [`PriceOracle`]; [`PriceFeed`] is the feed this
//! workspace deploys, where Oracle-role reporters push 18-decimal prices.
//! Reports are monotonic unless the admin disables that check, matching the
//! appreciation-only collateral the vault is designed around.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::access_control::{authorize, Role, Roles};
use crate::errors::LedgerError;
use crate::events::PriceReported;
use crate::types::PriceRound;

/// Price source consumed by the vault
#[odra::external_contract]
pub trait PriceOracle {
    /// Latest collateral price in pUSD, scaled by 1e18
    fn get_latest_price(&self) -> U256;
}

/// Governed price feed
#[odra::module(events = [PriceReported])]
pub struct PriceFeed {
    /// Capability book
    roles: SubModule<Roles>,
    /// Latest report
    latest: Var<PriceRound>,
    /// Reject reports below the latest price
    monotonic: Var<bool>,
}

#[odra::module]
impl PriceFeed {
    /// Initialize the feed with an admin and a first price
    pub fn init(&mut self, admin: Address, initial_price: U256) {
        if initial_price.is_zero() {
            self.env().revert(LedgerError::ZeroPrice);
        }
        self.roles.init(admin);
        self.monotonic.set(true);
        self.latest.set(PriceRound {
            price: initial_price,
            timestamp: self.env().get_block_time(),
            round: 1,
        });
    }

    /// Latest price (18 decimals)
    pub fn get_latest_price(&self) -> U256 {
        self.latest.get_or_default().price
    }

    /// Latest full round
    pub fn latest_round(&self) -> PriceRound {
        self.latest.get_or_default()
    }

    /// Push a new price (oracle role)
    pub fn report_price(&mut self, price: U256) {
        authorize(&self.roles, Role::Oracle);
        if price.is_zero() {
            self.env().revert(LedgerError::ZeroPrice);
        }

        let previous = self.latest.get_or_default();
        if self.is_monotonic() && price < previous.price {
            self.env().revert(LedgerError::PriceRegression);
        }

        let round = previous.round + 1;
        self.latest.set(PriceRound {
            price,
            timestamp: self.env().get_block_time(),
            round,
        });
        self.env().emit_event(PriceReported { price, round });
    }

    /// Enable or disable the monotonic-report check (admin only)
    pub fn set_monotonic(&mut self, monotonic: bool) {
        authorize(&self.roles, Role::Admin);
        self.monotonic.set(monotonic);
    }

    pub fn is_monotonic(&self) -> bool {
        self.monotonic.get().unwrap_or(true)
    }

    // ========== Roles ==========

    pub fn grant_role(&mut self, role: Role, account: Address) {
        self.roles.grant_role(role, account);
    }

    pub fn revoke_role(&mut self, role: Role, account: Address) {
        self.roles.revoke_role(role, account);
    }

    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.roles.has_role(role, account)
    }
}
