//! Deployed protocol used by the integration tests.

use odra::casper_types::U256;
use odra::host::{Deployer, HostEnv, HostRef};
use odra::prelude::*;
use odra_modules::cep18_token::{Cep18, Cep18HostRef, Cep18InitArgs};
use pegged_yield_contracts::access_control::Role;
use pegged_yield_contracts::oracle::{PriceFeed, PriceFeedHostRef, PriceFeedInitArgs};
use pegged_yield_contracts::stablecoin::{
    StablecoinLedger, StablecoinLedgerHostRef, StablecoinLedgerInitArgs,
};
use pegged_yield_contracts::staking::{StakingLedger, StakingLedgerHostRef, StakingLedgerInitArgs};
use pegged_yield_contracts::types::TxId;
use pegged_yield_contracts::vault::{CollateralVault, CollateralVaultHostRef, CollateralVaultInitArgs};

pub const NETWORK_ID: u64 = 7;
pub const DAY_MS: u64 = 86_400_000;
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// `n` whole tokens (18 decimals)
pub fn units(n: u64) -> U256 {
    U256::from(n) * U256::from(ONE)
}

/// `n` percent as a 1e18-scaled rate
pub fn percent(n: u64) -> U256 {
    U256::from(ONE) * U256::from(n) / U256::from(100u64)
}

pub struct Protocol {
    pub env: HostEnv,
    pub admin: Address,
    pub reserve: Address,
    pub fee_receiver: Address,
    pub ledger: StablecoinLedgerHostRef,
    pub collateral: Cep18HostRef,
    pub feed: PriceFeedHostRef,
    pub staking: StakingLedgerHostRef,
    pub vault: CollateralVaultHostRef,
}

impl Protocol {
    /// Deploy and wire every contract. Price starts at 2.0, the lock at one day.
    pub fn deploy() -> Self {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let reserve = env.get_account(9);
        let fee_receiver = env.get_account(8);
        env.set_caller(admin);

        let mut ledger = StablecoinLedger::deploy(&env, StablecoinLedgerInitArgs { admin });
        let collateral = Cep18::deploy(
            &env,
            Cep18InitArgs {
                symbol: String::from("sCOL"),
                name: String::from("Staked Collateral"),
                decimals: 18,
                initial_supply: units(1_000_000),
            },
        );
        let mut feed = PriceFeed::deploy(
            &env,
            PriceFeedInitArgs {
                admin,
                initial_price: units(2),
            },
        );
        let mut staking = StakingLedger::deploy(
            &env,
            StakingLedgerInitArgs {
                admin,
                stablecoin: ledger.address().clone(),
                reserve,
                min_lock_period: DAY_MS,
            },
        );
        let vault = CollateralVault::deploy(
            &env,
            CollateralVaultInitArgs {
                admin,
                collateral_token: collateral.address().clone(),
                stablecoin: ledger.address().clone(),
                staking_ledger: staking.address().clone(),
                oracle: feed.address().clone(),
                network_id: NETWORK_ID,
            },
        );

        let vault_address = vault.address().clone();
        ledger.grant_role(Role::Minter, vault_address);
        ledger.grant_role(Role::Minter, admin);
        ledger.grant_role(Role::Approver, admin);
        staking.add_updater(vault_address);
        feed.grant_role(Role::Oracle, admin);

        Self {
            env,
            admin,
            reserve,
            fee_receiver,
            ledger,
            collateral,
            feed,
            staking,
            vault,
        }
    }

    pub fn account(&self, index: usize) -> Address {
        self.env.get_account(index)
    }

    pub fn vault_address(&self) -> Address {
        self.vault.address().clone()
    }

    pub fn staking_address(&self) -> Address {
        self.staking.address().clone()
    }

    pub fn ledger_address(&self) -> Address {
        self.ledger.address().clone()
    }

    /// Mint pUSD directly through the privileged path
    pub fn mint_pusd(&mut self, to: Address, amount: U256) {
        self.env.set_caller(self.admin);
        self.ledger.mint_privileged(amount, to);
    }

    /// Give `user` collateral and let the vault pull it
    pub fn fund_collateral(&mut self, user: Address, amount: U256) {
        self.env.set_caller(self.admin);
        self.collateral.transfer(&user, &amount);
        self.env.set_caller(user);
        let vault = self.vault_address();
        self.collateral.approve(&vault, &amount);
    }

    /// Derive and approve a mint record
    pub fn approve_mint(&mut self, initiator: Address, amount: U256, recipient: Address, timestamp: u64) -> TxId {
        let tx_id = self.vault.compute_tx_id(initiator, amount, recipient, timestamp);
        self.env.set_caller(self.admin);
        self.ledger.approve_mint(tx_id);
        tx_id
    }

    /// Derive and approve a burn record
    pub fn approve_burn(&mut self, initiator: Address, amount: U256, recipient: Address, timestamp: u64) -> TxId {
        let tx_id = self.vault.compute_tx_id(initiator, amount, recipient, timestamp);
        self.env.set_caller(self.admin);
        self.ledger.approve_burn(tx_id);
        tx_id
    }

    /// Full collateral -> pUSD swap for `user`, crediting `user`
    pub fn swap_in(&mut self, user: Address, collateral_amount: U256, timestamp: u64) {
        self.fund_collateral(user, collateral_amount);
        let tx_id = self.approve_mint(user, collateral_amount, user, timestamp);
        self.env.set_caller(user);
        self.vault.mint(tx_id, collateral_amount, user, timestamp);
    }

    /// Approve the staking ledger and stake
    pub fn stake(&mut self, user: Address, amount: U256) {
        self.env.set_caller(user);
        let staking = self.staking_address();
        self.ledger.approve(staking, amount);
        self.staking.stake(amount);
    }

    /// Mint `reward` to the staking ledger and distribute it as an updater
    pub fn distribute(&mut self, reward: U256) {
        let staking = self.staking_address();
        self.mint_pusd(staking, reward);
        self.env.set_caller(self.admin);
        if !self.staking.is_updater(self.admin) {
            self.staking.add_updater(self.admin);
        }
        self.staking.distribute(reward);
    }

    pub fn report_price(&mut self, price: U256) {
        self.env.set_caller(self.admin);
        self.feed.report_price(price);
    }

    pub fn enable_fees(&mut self, mint_rate: U256, redeem_rate: U256) {
        self.env.set_caller(self.admin);
        self.vault.set_fee_receiver(Some(self.fee_receiver));
        self.vault.set_mint_fee_rate(mint_rate);
        self.vault.set_redeem_fee_rate(redeem_rate);
    }
}
