//! Capability bookkeeping embedded in every ledger contract.
//!
//! Roles:
//! - Admin: grants/revokes roles, configures the contract
//! - Approver: approves and cancels two-phase mint/burn records
//! - Minter: executes approved records and mints through the privileged path
//! - Rescuer: recovers balances held by denylisted accounts or the contract itself
//! - Pauser: toggles the global pause
//! - Oracle: reports prices to a price feed
//!
//! Handlers never consult roles implicitly: they take a [`Grant`] obtained
//! from [`authorize`], which reverts unless the caller holds the role.

use odra::prelude::*;
use crate::errors::LedgerError;

/// Capability identifiers
#[odra::odra_type]
#[derive(Copy)]
pub enum Role {
    Admin,
    Approver,
    Minter,
    Rescuer,
    Pauser,
    Oracle,
}

/// Proof that `holder` held `role` when the current call began
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    pub role: Role,
    pub holder: Address,
}

/// Check the caller against `roles` and hand back a grant for `role`
pub fn authorize(roles: &Roles, role: Role) -> Grant {
    let holder = roles.require_role(role);
    Grant { role, holder }
}

/// Role book
#[odra::module]
pub struct Roles {
    /// Role assignments: (role, account) -> bool
    members: Mapping<(Role, Address), bool>,
    /// Number of accounts holding each role
    member_count: Mapping<Role, u32>,
}

#[odra::module]
impl Roles {
    /// Seed the book with its first admin
    pub fn init(&mut self, initial_admin: Address) {
        self.set_role_internal(Role::Admin, initial_admin, true);
    }

    /// Check if account has a specific role
    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.members.get(&(role, account)).unwrap_or(false)
    }

    /// Number of accounts holding a role
    pub fn member_count(&self, role: Role) -> u32 {
        self.member_count.get(&role).unwrap_or(0)
    }

    /// Revert unless the caller holds `role`; returns the caller
    pub fn require_role(&self, role: Role) -> Address {
        let caller = self.env().caller();
        if !self.has_role(role, caller) {
            self.env().revert(LedgerError::Unauthorized);
        }
        caller
    }

    /// Grant a role (admin only)
    pub fn grant_role(&mut self, role: Role, account: Address) {
        self.require_role(Role::Admin);
        if self.has_role(role, account) {
            return;
        }
        self.set_role_internal(role, account, true);
    }

    /// Revoke a role (admin only). The last admin cannot be removed.
    pub fn revoke_role(&mut self, role: Role, account: Address) {
        self.require_role(Role::Admin);
        if !self.has_role(role, account) {
            return;
        }
        if role == Role::Admin && self.member_count(Role::Admin) <= 1 {
            self.env().revert(LedgerError::LastAdmin);
        }
        self.set_role_internal(role, account, false);
    }

    fn set_role_internal(&mut self, role: Role, account: Address, value: bool) {
        let had_role = self.has_role(role, account);
        self.members.set(&(role, account), value);

        let count = self.member_count(role);
        if value && !had_role {
            self.member_count.set(&role, count + 1);
        } else if !value && had_role && count > 0 {
            self.member_count.set(&role, count - 1);
        }
    }
}
