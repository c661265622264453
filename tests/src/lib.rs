//! Pegged Yield Integration Tests
//!
//! Deploys the full protocol on the Odra VM and drives it through the public
//! entrypoints. The collateral asset is the stock CEP-18 token from
//! `odra-modules`.

#[cfg(test)]
mod fixture;

#[cfg(test)]
mod callback_scheme;


#[cfg(test)]
mod vault_tests;


#[cfg(test)]
mod type_tests {
    use odra::casper_types::U256;
    use odra::casper_types::RuntimeArgs;
    use odra::CallDef;
    use pegged_yield_contracts::errors::LedgerError;
    use pegged_yield_contracts::types::*;

    #[test]
    fn test_tx_state_variants() {
        let states = [
            TxState::Unset,
            TxState::Approved,
            TxState::Executed,
            TxState::Canceled,
        ];
        assert_eq!(states.len(), 4);
        assert_eq!(TxState::default(), TxState::Unset);
    }

    #[test]
    fn test_error_codes_are_grouped() {
        assert_eq!(LedgerError::ZeroAmount as u16 / 100, 1);
        assert_eq!(LedgerError::Unauthorized as u16 / 100, 2);
        assert_eq!(LedgerError::StalePrice as u16 / 100, 3);
        assert_eq!(LedgerError::RateRegression as u16 / 100, 4);
        assert_eq!(LedgerError::TooManySchemes as u16 / 100, 5);
        assert_eq!(LedgerError::SchemeInactive as u16 / 100, 6);
    }

    /// Entry points the vault and staking ledger call on other contracts
    #[test]
    fn test_cross_contract_call_defs() {
        let call_def = CallDef::new("get_latest_price", false, RuntimeArgs::new());
        assert_eq!(call_def.entry_point(), "get_latest_price");
        assert!(!call_def.is_mut());

        let args = odra::casper_types::runtime_args! {
            "tx_id" => U256::one(),
            "amount" => U256::from(1000u64),
            "to" => odra::prelude::Address::Account(odra::casper_types::account::AccountHash::default())
        };
        let call_def = CallDef::new("execute_mint_by_tx", true, args);
        assert_eq!(call_def.entry_point(), "execute_mint_by_tx");
        assert!(call_def.is_mut());

        let args = odra::casper_types::runtime_args! {
            "new_reward" => U256::from(100u64)
        };
        let call_def = CallDef::new("distribute", true, args);
        assert_eq!(call_def.entry_point(), "distribute");
        assert!(call_def.is_mut());
    }
}
