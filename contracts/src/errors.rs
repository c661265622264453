//! Ledger error definitions.

use odra::prelude::*;

/// Errors shared by the stablecoin ledger, the collateral vault and the staking ledger
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LedgerError {
    // Validation errors (1xx)
    ZeroAmount = 100,
    ZeroAddress = 101,
    MalformedAuthorization = 102,
    SignatureExpired = 103,
    InvalidSignature = 104,
    SelfMint = 105,

    // Authorization errors (2xx)
    Unauthorized = 200,
    Denylisted = 201,
    NotUpdater = 202,

    // State errors (3xx)
    InvalidTxState = 300,
    InsufficientBalance = 301,
    InsufficientAllowance = 302,
    InsufficientStake = 303,
    InsufficientReward = 304,
    LockPeriodActive = 305,
    StalePrice = 306,
    Paused = 307,
    InsufficientCollateral = 308,
    ReserveHasReward = 309,
    SupplyBelowStaked = 310,
    RescueNotAllowed = 311,

    // Arithmetic errors (4xx)
    ZeroPrice = 400,
    PriceRegression = 401,
    RateRegression = 402,
    Overflow = 403,
    DivisionByZero = 404,

    // Configuration errors (5xx)
    FeeRateOutOfRange = 500,
    FeeReceiverNotSet = 501,
    TooManySchemes = 502,
    SchemeAlreadyRegistered = 503,
    SchemeNotRegistered = 504,
    LastAdmin = 505,
    InvalidConfig = 506,

    // Extension errors (6xx)
    SchemeInactive = 600,
}

impl LedgerError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Validation
            LedgerError::ZeroAmount => "Amount must be greater than zero",
            LedgerError::ZeroAddress => "Zero address not allowed",
            LedgerError::MalformedAuthorization => "Authorization id does not match request",
            LedgerError::SignatureExpired => "Signature deadline has passed",
            LedgerError::InvalidSignature => "Signature verification failed",
            LedgerError::SelfMint => "Cannot mint to the ledger itself",

            // Authorization
            LedgerError::Unauthorized => "Unauthorized: caller lacks capability",
            LedgerError::Denylisted => "Address is denylisted",
            LedgerError::NotUpdater => "Unauthorized: caller is not a reward updater",

            // State
            LedgerError::InvalidTxState => "Authorization record in wrong state",
            LedgerError::InsufficientBalance => "Insufficient token balance",
            LedgerError::InsufficientAllowance => "Insufficient allowance",
            LedgerError::InsufficientStake => "Insufficient staked amount",
            LedgerError::InsufficientReward => "Insufficient reward balance",
            LedgerError::LockPeriodActive => "Lock period has not elapsed",
            LedgerError::StalePrice => "Oracle price moved: capture reward first",
            LedgerError::Paused => "Ledger is paused",
            LedgerError::InsufficientCollateral => "Insufficient vault collateral",
            LedgerError::ReserveHasReward => "New reserve already holds reward",
            LedgerError::SupplyBelowStaked => "Total supply below total staked",
            LedgerError::RescueNotAllowed => "Rescue source is not eligible",

            // Arithmetic
            LedgerError::ZeroPrice => "Oracle price is zero",
            LedgerError::PriceRegression => "Oracle price below last observed price",
            LedgerError::RateRegression => "Entry rate above global accumulated rate",
            LedgerError::Overflow => "Arithmetic overflow",
            LedgerError::DivisionByZero => "Division by zero",

            // Config
            LedgerError::FeeRateOutOfRange => "Fee rate above 1.0",
            LedgerError::FeeReceiverNotSet => "Fee receiver must be set first",
            LedgerError::TooManySchemes => "Reward scheme limit reached",
            LedgerError::SchemeAlreadyRegistered => "Reward scheme already registered",
            LedgerError::SchemeNotRegistered => "Reward scheme not registered",
            LedgerError::LastAdmin => "Cannot remove the last admin",
            LedgerError::InvalidConfig => "Invalid configuration parameter",

            // Extension
            LedgerError::SchemeInactive => "Reward scheme is inactive",
        }
    }
}

impl core::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<LedgerError> for OdraError {
    fn from(error: LedgerError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}

/// Result type for the pure accounting helpers
pub type LedgerResult<T> = Result<T, LedgerError>;
