//! Deploy contracts to Casper livenet/testnet using Odra livenet environment.
//!
//! Usage:
//!   cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000
//!   PEG_COLLATERAL_TOKEN=hash-...            (CEP-18 collateral contract)
//!
//! Optional protocol parameters:
//!   PEG_NETWORK_ID=1
//!   PEG_INITIAL_PRICE=1000000000000000000    (1e18 = 1.0)
//!   PEG_MINT_FEE_RATE=0                      (1e18 = 100%)
//!   PEG_REDEEM_FEE_RATE=0
//!   PEG_FEE_RECEIVER=account-hash-...        (defaults to the deployer)
//!   PEG_RESERVE=account-hash-...             (defaults to the deployer)
//!   PEG_MIN_LOCK_PERIOD_MS=86400000

use odra::casper_types::U256;
use odra::host::{Deployer, HostRef};
use odra::prelude::*;

use pegged_yield_contracts::access_control::Role;
use pegged_yield_contracts::oracle::{PriceFeed, PriceFeedInitArgs};
use pegged_yield_contracts::reward_scheme::{StakePointsScheme, StakePointsSchemeInitArgs};
use pegged_yield_contracts::stablecoin::{StablecoinLedger, StablecoinLedgerInitArgs};
use pegged_yield_contracts::staking::{StakingLedger, StakingLedgerInitArgs};
use pegged_yield_contracts::vault::{CollateralVault, CollateralVaultInitArgs};

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u256(key: &str, default: U256) -> U256 {
    std::env::var(key)
        .ok()
        .and_then(|v| U256::from_dec_str(&v).ok())
        .unwrap_or(default)
}

fn env_address(key: &str) -> Option<Address> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn main() {
    // Load environment from .env file
    dotenv::dotenv().ok();

    println!("=== Pegged Yield Livenet Deployment ===");
    println!();

    let collateral_token = match env_address("PEG_COLLATERAL_TOKEN") {
        Some(address) => address,
        None => {
            eprintln!("PEG_COLLATERAL_TOKEN must be set to the collateral CEP-18 contract");
            std::process::exit(1);
        }
    };

    // Initialize Odra livenet environment
    let env = odra_casper_livenet_env::env();

    // Configure payment amount for deployments/calls (required for Casper 2.0 txs)
    let payment_amount = env_u64("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT", 200_000_000_000);
    env.set_gas(payment_amount);

    // Get deployer address
    let deployer = env.caller();
    println!("Deployer: {:?}", deployer);
    println!();

    // Protocol parameters
    let one = U256::from(10u64).pow(U256::from(18u64));
    let network_id = env_u64("PEG_NETWORK_ID", 1);
    let initial_price = env_u256("PEG_INITIAL_PRICE", one);
    let mint_fee_rate = env_u256("PEG_MINT_FEE_RATE", U256::zero());
    let redeem_fee_rate = env_u256("PEG_REDEEM_FEE_RATE", U256::zero());
    let fee_receiver = env_address("PEG_FEE_RECEIVER").unwrap_or(deployer);
    let reserve = env_address("PEG_RESERVE").unwrap_or(deployer);
    let min_lock_period = env_u64("PEG_MIN_LOCK_PERIOD_MS", 86_400_000);

    // ==================== Phase 1: Ledgers ====================
    println!("=== Phase 1: Deploying Feed and Ledgers ===");
    println!();

    println!("Deploying PriceFeed...");
    let mut feed = PriceFeed::deploy(
        &env,
        PriceFeedInitArgs {
            admin: deployer,
            initial_price,
        },
    );
    let feed_addr = feed.address().clone();
    println!("PriceFeed deployed at: {:?}", feed_addr);

    println!("Deploying StablecoinLedger (pUSD)...");
    let mut stablecoin = StablecoinLedger::deploy(&env, StablecoinLedgerInitArgs { admin: deployer });
    let stablecoin_addr = stablecoin.address().clone();
    println!("StablecoinLedger deployed at: {:?}", stablecoin_addr);

    println!("Deploying StakingLedger...");
    let mut staking = StakingLedger::deploy(
        &env,
        StakingLedgerInitArgs {
            admin: deployer,
            stablecoin: stablecoin_addr,
            reserve,
            min_lock_period,
        },
    );
    let staking_addr = staking.address().clone();
    println!("StakingLedger deployed at: {:?}", staking_addr);

    println!();

    // ==================== Phase 2: Vault and Schemes ====================
    println!("=== Phase 2: Deploying Vault and Reward Schemes ===");
    println!();

    println!("Deploying CollateralVault...");
    let mut vault = CollateralVault::deploy(
        &env,
        CollateralVaultInitArgs {
            admin: deployer,
            collateral_token,
            stablecoin: stablecoin_addr,
            staking_ledger: staking_addr,
            oracle: feed_addr,
            network_id,
        },
    );
    let vault_addr = vault.address().clone();
    println!("CollateralVault deployed at: {:?}", vault_addr);

    println!("Deploying StakePointsScheme...");
    let scheme = StakePointsScheme::deploy(
        &env,
        StakePointsSchemeInitArgs {
            admin: deployer,
            staking_ledger: staking_addr,
        },
    );
    let scheme_addr = scheme.address().clone();
    println!("StakePointsScheme deployed at: {:?}", scheme_addr);

    println!();

    // ==================== Phase 3: Cross-contract Configuration ====================
    println!("=== Phase 3: Cross-contract Configuration ===");
    println!();

    println!("Granting pUSD roles (vault minter, deployer approver)...");
    stablecoin.grant_role(Role::Minter, vault_addr);
    stablecoin.grant_role(Role::Approver, deployer);
    println!("Done.");

    println!("Authorizing vault as staking updater...");
    staking.add_updater(vault_addr);
    println!("Done.");

    println!("Registering StakePointsScheme...");
    staking.add_reward_scheme(scheme_addr);
    println!("Done.");

    println!("Granting oracle reporter role to deployer...");
    feed.grant_role(Role::Oracle, deployer);
    println!("Done.");

    if !mint_fee_rate.is_zero() || !redeem_fee_rate.is_zero() {
        println!("Configuring fees...");
        vault.set_fee_receiver(Some(fee_receiver));
        vault.set_mint_fee_rate(mint_fee_rate);
        vault.set_redeem_fee_rate(redeem_fee_rate);
        println!("Done.");
    }

    println!();
    println!("=== Deployment Complete ===");
    println!();
    println!("Contract Addresses:");
    println!("  PriceFeed:          {:?}", feed_addr);
    println!("  StablecoinLedger:   {:?}", stablecoin_addr);
    println!("  StakingLedger:      {:?}", staking_addr);
    println!("  CollateralVault:    {:?}", vault_addr);
    println!("  StakePointsScheme:  {:?}", scheme_addr);
    println!("  Collateral token:   {:?}", collateral_token);
}
