//! pUSD Stablecoin Ledger
//!
//! CEP-18 compatible ledger for the pegged unit of account. Supply changes go
//! through one of two doors:
//! - two-phase records: an Approver approves a content-derived tx id, then a
//!   Minter (the vault) executes it exactly once
//! - the privileged path (`mint_privileged`) used by the vault for fees and
//!   captured rewards
//!
//! Every balance-moving entrypoint honours the global pause and the denylist.

use odra::prelude::*;
use odra::casper_types::bytesrepr::{Bytes, ToBytes};
use odra::casper_types::{Key, PublicKey, U256};
use odra::ContractRef;
use crate::access_control::{authorize, Grant, Role, Roles};
use crate::authorization::{transition, TxCommand};
use crate::errors::{LedgerError, LedgerResult};
use crate::events::{
    Approval, Burn, DenylistUpdated, Mint, PauseChanged, Rescued, Transfer, TxApproved,
    TxCanceled,
};
use crate::fixed_point::{checked_add, checked_sub};
use crate::token::Cep18TokenContractRef;
use crate::types::{zero_address, TxId, TxKind, TxState};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

const TOKEN_NAME: &str = "Pegged USD";
const TOKEN_SYMBOL: &str = "pUSD";
const TOKEN_DECIMALS: u8 = 18;
const CEP18_NAME_KEY: &str = "name";
const CEP18_SYMBOL_KEY: &str = "symbol";
const CEP18_DECIMALS_KEY: &str = "decimals";
const CEP18_TOTAL_SUPPLY_KEY: &str = "total_supply";
const CEP18_BALANCES_DICT: &str = "balances";
const CEP18_ALLOWANCES_DICT: &str = "allowances";

/// Domain tag for delegated approval messages
const APPROVAL_DOMAIN: &str = "pUSD:delegated-approve";

/// pUSD Stablecoin Ledger
#[odra::module(events = [
    Mint,
    Burn,
    TxApproved,
    TxCanceled,
    Transfer,
    Approval,
    DenylistUpdated,
    Rescued,
    PauseChanged
])]
pub struct StablecoinLedger {
    /// Capability book
    roles: SubModule<Roles>,
    /// Total supply
    total_supply: Var<U256>,
    /// Balance mapping
    balances: Mapping<Address, U256>,
    /// Allowance mapping (owner, spender) -> amount
    allowances: Mapping<(Address, Address), U256>,
    /// Denylisted accounts
    denylist: Mapping<Address, bool>,
    /// Delegated approval nonces
    nonces: Mapping<Address, u64>,
    /// Global pause
    paused: Var<bool>,
    /// Two-phase mint records
    mint_records: Mapping<TxId, TxState>,
    /// Two-phase burn records
    burn_records: Mapping<TxId, TxState>,
}

#[odra::module]
impl StablecoinLedger {
    /// Initialize the ledger with its first admin
    pub fn init(&mut self, admin: Address) {
        self.roles.init(admin);
        self.total_supply.set(U256::zero());
        self.paused.set(false);
        self.env().init_dictionary(CEP18_BALANCES_DICT);
        self.env().init_dictionary(CEP18_ALLOWANCES_DICT);
        self.env().set_named_value(CEP18_NAME_KEY, String::from(TOKEN_NAME));
        self.env().set_named_value(CEP18_SYMBOL_KEY, String::from(TOKEN_SYMBOL));
        self.env().set_named_value(CEP18_DECIMALS_KEY, TOKEN_DECIMALS);
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, U256::zero());
    }

    // ========== CEP-18 Standard Functions ==========

    pub fn name(&self) -> String {
        String::from(TOKEN_NAME)
    }

    pub fn symbol(&self) -> String {
        String::from(TOKEN_SYMBOL)
    }

    pub fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get().unwrap_or(U256::zero())
    }

    pub fn balance_of(&self, address: Address) -> U256 {
        self.balances.get(&address).unwrap_or(U256::zero())
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or(U256::zero())
    }

    /// Transfer tokens to recipient
    #[odra(non_reentrant)]
    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        let sender = self.env().caller();
        self.require_not_paused();
        self.require_clean(&[sender, recipient]);
        self.transfer_internal(sender, recipient, amount);
    }

    /// Approve spender to spend tokens
    #[odra(non_reentrant)]
    pub fn approve(&mut self, spender: Address, amount: U256) {
        let owner = self.env().caller();
        self.require_not_paused();
        self.require_clean(&[owner, spender]);
        self.approve_internal(owner, spender, amount);
    }

    /// Transfer tokens from owner to recipient (requires allowance)
    #[odra(non_reentrant)]
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        let spender = self.env().caller();
        self.require_not_paused();
        self.require_clean(&[spender, owner, recipient]);

        let current_allowance = self.allowance(owner, spender);
        if current_allowance < amount {
            self.env().revert(LedgerError::InsufficientAllowance);
        }

        self.transfer_internal(owner, recipient, amount);
        self.approve_internal(owner, spender, current_allowance - amount);
    }

    // ========== Delegated Approval ==========

    /// Current delegated-approval nonce of `owner`
    pub fn nonce_of(&self, owner: Address) -> u64 {
        self.nonces.get(&owner).unwrap_or(0)
    }

    /// Message `owner` signs to approve `spender` without sending a deploy
    pub fn approval_message(
        &self,
        owner: Address,
        spender: Address,
        amount: U256,
        deadline: u64,
    ) -> Bytes {
        let digest = self.or_revert(self.approval_digest(owner, spender, amount, deadline));
        Bytes::from(digest.to_vec())
    }

    /// Apply an approval signed by `owner_key`
    #[odra(non_reentrant)]
    pub fn delegated_approve(
        &mut self,
        owner_key: PublicKey,
        spender: Address,
        amount: U256,
        deadline: u64,
        signature: Bytes,
    ) {
        self.require_not_paused();
        if self.env().get_block_time() > deadline {
            self.env().revert(LedgerError::SignatureExpired);
        }

        let owner = Address::Account(owner_key.to_account_hash());
        self.require_clean(&[owner, spender]);

        let message = self.approval_message(owner, spender, amount, deadline);
        if !self.env().verify_signature(&message, &signature, &owner_key) {
            self.env().revert(LedgerError::InvalidSignature);
        }

        self.nonces.set(&owner, self.nonce_of(owner) + 1);
        self.approve_internal(owner, spender, amount);
    }

    // ========== Two-Phase Records ==========

    pub fn mint_state(&self, tx_id: TxId) -> TxState {
        self.mint_records.get(&tx_id).unwrap_or_default()
    }

    pub fn burn_state(&self, tx_id: TxId) -> TxState {
        self.burn_records.get(&tx_id).unwrap_or_default()
    }

    #[odra(non_reentrant)]
    pub fn approve_mint(&mut self, tx_id: TxId) {
        let grant = authorize(&self.roles, Role::Approver);
        self.advance_record(&grant, TxKind::Mint, tx_id, TxCommand::Approve);
        self.env().emit_event(TxApproved { tx_id, kind: TxKind::Mint });
    }

    #[odra(non_reentrant)]
    pub fn approve_burn(&mut self, tx_id: TxId) {
        let grant = authorize(&self.roles, Role::Approver);
        self.advance_record(&grant, TxKind::Burn, tx_id, TxCommand::Approve);
        self.env().emit_event(TxApproved { tx_id, kind: TxKind::Burn });
    }

    #[odra(non_reentrant)]
    pub fn cancel_mint(&mut self, tx_id: TxId) {
        let grant = authorize(&self.roles, Role::Approver);
        self.advance_record(&grant, TxKind::Mint, tx_id, TxCommand::Cancel);
        self.env().emit_event(TxCanceled { tx_id, kind: TxKind::Mint });
    }

    #[odra(non_reentrant)]
    pub fn cancel_burn(&mut self, tx_id: TxId) {
        let grant = authorize(&self.roles, Role::Approver);
        self.advance_record(&grant, TxKind::Burn, tx_id, TxCommand::Cancel);
        self.env().emit_event(TxCanceled { tx_id, kind: TxKind::Burn });
    }

    /// Execute an approved mint record (minter only)
    #[odra(non_reentrant)]
    pub fn execute_mint_by_tx(&mut self, tx_id: TxId, amount: U256, to: Address) {
        let grant = authorize(&self.roles, Role::Minter);
        self.advance_record(&grant, TxKind::Mint, tx_id, TxCommand::Execute);
        self.mint_internal(tx_id, to, amount);
    }

    /// Execute an approved burn record (minter only)
    #[odra(non_reentrant)]
    pub fn execute_burn_by_tx(&mut self, tx_id: TxId, amount: U256, from: Address) {
        let grant = authorize(&self.roles, Role::Minter);
        self.advance_record(&grant, TxKind::Burn, tx_id, TxCommand::Execute);
        self.burn_internal(tx_id, from, amount);
    }

    // ========== Protocol Functions (Restricted) ==========

    /// Mint without a record, for fees and captured rewards (minter only)
    #[odra(non_reentrant)]
    pub fn mint_privileged(&mut self, amount: U256, to: Address) {
        authorize(&self.roles, Role::Minter);
        self.mint_internal(U256::zero(), to, amount);
    }

    /// Move pUSD between accounts on behalf of the protocol (minter only)
    #[odra(non_reentrant)]
    pub fn protocol_transfer(&mut self, from: Address, to: Address, amount: U256) {
        authorize(&self.roles, Role::Minter);
        self.require_not_paused();
        self.require_clean(&[from, to]);
        self.transfer_internal(from, to, amount);
    }

    /// Recover funds held by a denylisted account or by the ledger itself.
    ///
    /// `token` is this ledger for pUSD, or a foreign CEP-18 token the ledger holds.
    #[odra(non_reentrant)]
    pub fn rescue(&mut self, token: Address, from: Address, to: Address, amount: U256) {
        authorize(&self.roles, Role::Rescuer);
        if amount.is_zero() {
            self.env().revert(LedgerError::ZeroAmount);
        }
        if to == zero_address() {
            self.env().revert(LedgerError::ZeroAddress);
        }
        if self.is_denylisted(to) {
            self.env().revert(LedgerError::Denylisted);
        }

        let this = self.env().self_address();
        if token == this {
            if from != this && !self.is_denylisted(from) {
                self.env().revert(LedgerError::RescueNotAllowed);
            }
            self.transfer_internal(from, to, amount);
        } else {
            if from != this {
                self.env().revert(LedgerError::RescueNotAllowed);
            }
            let mut foreign = Cep18TokenContractRef::new(self.env().clone(), token);
            foreign.transfer(to, amount);
        }

        self.env().emit_event(Rescued { token, from, to, amount });
    }

    // ========== Admin Functions ==========

    #[odra(non_reentrant)]
    pub fn set_denylisted(&mut self, account: Address, denylisted: bool) {
        authorize(&self.roles, Role::Admin);
        self.denylist.set(&account, denylisted);
        self.env().emit_event(DenylistUpdated { account, denylisted });
    }

    pub fn is_denylisted(&self, account: Address) -> bool {
        self.denylist.get(&account).unwrap_or(false)
    }

    #[odra(non_reentrant)]
    pub fn pause(&mut self) {
        let grant = authorize(&self.roles, Role::Pauser);
        self.paused.set(true);
        self.env().emit_event(PauseChanged { paused: true, by: grant.holder });
    }

    #[odra(non_reentrant)]
    pub fn unpause(&mut self) {
        let grant = authorize(&self.roles, Role::Pauser);
        self.paused.set(false);
        self.env().emit_event(PauseChanged { paused: false, by: grant.holder });
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get().unwrap_or(false)
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

    fn advance_record(&mut self, grant: &Grant, kind: TxKind, tx_id: TxId, command: TxCommand) {
        let current = match kind {
            TxKind::Mint => self.mint_state(tx_id),
            TxKind::Burn => self.burn_state(tx_id),
        };
        let next = self.or_revert(transition(grant, current, command));
        match kind {
            TxKind::Mint => self.mint_records.set(&tx_id, next),
            TxKind::Burn => self.burn_records.set(&tx_id, next),
        }
    }

    fn mint_internal(&mut self, tx_id: TxId, to: Address, amount: U256) {
        self.require_not_paused();
        if amount.is_zero() {
            self.env().revert(LedgerError::ZeroAmount);
        }
        if to == zero_address() {
            self.env().revert(LedgerError::ZeroAddress);
        }
        if to == self.env().self_address() {
            self.env().revert(LedgerError::SelfMint);
        }
        self.require_clean(&[to]);

        let new_supply = self.or_revert(checked_add(self.total_supply(), amount));
        let new_balance = self.or_revert(checked_add(self.balance_of(to), amount));

        self.balances.set(&to, new_balance);
        self.set_balance_cep18(to, new_balance);
        self.total_supply.set(new_supply);
        self.set_total_supply_cep18(new_supply);

        self.env().emit_event(Mint { tx_id, to, amount });
    }

    fn burn_internal(&mut self, tx_id: TxId, from: Address, amount: U256) {
        self.require_not_paused();
        if amount.is_zero() {
            self.env().revert(LedgerError::ZeroAmount);
        }
        if from == zero_address() {
            self.env().revert(LedgerError::ZeroAddress);
        }
        self.require_clean(&[from]);

        let current_balance = self.balance_of(from);
        if current_balance < amount {
            self.env().revert(LedgerError::InsufficientBalance);
        }

        let new_balance = current_balance - amount;
        let new_supply = self.or_revert(checked_sub(self.total_supply(), amount));

        self.balances.set(&from, new_balance);
        self.set_balance_cep18(from, new_balance);
        self.total_supply.set(new_supply);
        self.set_total_supply_cep18(new_supply);

        self.env().emit_event(Burn { tx_id, from, amount });
    }

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        if to == zero_address() {
            self.env().revert(LedgerError::ZeroAddress);
        }
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(LedgerError::InsufficientBalance);
        }

        let new_from_balance = from_balance - amount;
        self.balances.set(&from, new_from_balance);
        self.set_balance_cep18(from, new_from_balance);

        let new_to_balance = self.or_revert(checked_add(self.balance_of(to), amount));
        self.balances.set(&to, new_to_balance);
        self.set_balance_cep18(to, new_to_balance);

        self.env().emit_event(Transfer { from, to, amount });
    }

    fn approve_internal(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
        self.set_allowance_cep18(owner, spender, amount);
        self.env().emit_event(Approval { owner, spender, amount });
    }

    fn approval_digest(
        &self,
        owner: Address,
        spender: Address,
        amount: U256,
        deadline: u64,
    ) -> LedgerResult<[u8; 32]> {
        let mut preimage = Vec::new();
        let parts = [
            String::from(APPROVAL_DOMAIN).to_bytes(),
            self.env().self_address().to_bytes(),
            owner.to_bytes(),
            spender.to_bytes(),
            amount.to_bytes(),
            self.nonce_of(owner).to_bytes(),
            deadline.to_bytes(),
        ];
        for part in parts {
            let bytes = part.map_err(|_| LedgerError::InvalidSignature)?;
            preimage.extend_from_slice(&bytes);
        }
        Ok(self.env().hash(preimage))
    }

    fn require_not_paused(&self) {
        if self.is_paused() {
            self.env().revert(LedgerError::Paused);
        }
    }

    fn require_clean(&self, parties: &[Address]) {
        if parties.iter().any(|party| self.is_denylisted(*party)) {
            self.env().revert(LedgerError::Denylisted);
        }
    }

    fn or_revert<T>(&self, result: LedgerResult<T>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => self.env().revert(error),
        }
    }

    fn set_balance_cep18(&self, owner: Address, amount: U256) {
        let key = Self::cep18_balance_key(owner);
        self.env().set_dictionary_value(CEP18_BALANCES_DICT, key.as_bytes(), amount);
    }

    fn set_allowance_cep18(&self, owner: Address, spender: Address, amount: U256) {
        let key = Self::cep18_allowance_key(owner, spender);
        self.env().set_dictionary_value(CEP18_ALLOWANCES_DICT, key.as_bytes(), amount);
    }

    fn set_total_supply_cep18(&self, amount: U256) {
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, amount);
    }

    fn cep18_balance_key(owner: Address) -> String {
        let key = Key::from(owner);
        let bytes = key.to_bytes().unwrap_or_default();
        BASE64_STANDARD.encode(bytes)
    }

    fn cep18_allowance_key(owner: Address, spender: Address) -> String {
        let owner_key = Key::from(owner);
        let spender_key = Key::from(spender);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&owner_key.to_bytes().unwrap_or_default());
        bytes.extend_from_slice(&spender_key.to_bytes().unwrap_or_default());
        BASE64_STANDARD.encode(bytes)
    }
}
