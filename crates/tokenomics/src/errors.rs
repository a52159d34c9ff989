use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while validating parameters or computing issuance.
///
/// Every check in this crate is pure, so none of these are retryable: the
/// caller either rejects the input (governance update, genesis load) or
/// halts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomicsError {
    #[error("invalid parameter type for {param}: expected {expected}, got {actual}")]
    InvalidParameterType {
        param: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{param} must be positive: {value}")]
    InvalidDuration {
        param: &'static str,
        value: String,
    },

    #[error("invalid denom: {0:?}")]
    InvalidDenom(String),

    #[error("epochs per period must be positive: {0}")]
    InvalidEpochsPerPeriod(i64),

    #[error("epoch identifier cannot be empty")]
    EmptyEpochIdentifier,

    #[error("bonded ratio cannot be negative: {0}")]
    NegativeBondedRatio(Decimal),

    #[error("bonded ratio cannot be greater than one: {0}")]
    BondedRatioExceedsOne(Decimal),

    #[error("invalid economics parameter {param}: {reason}")]
    InvalidParameter {
        param: &'static str,
        reason: String,
    },

    #[error("unknown parameter key: {0}")]
    UnknownParameter(String),

    #[error("module account {0:?} has not been set")]
    MissingModuleAccount(String),

    #[error(
        "epoch number {epoch_number} is behind period {period} \
         ({epochs_per_period} epochs per period)"
    )]
    InvalidEpochNumber {
        epoch_number: i64,
        period: u64,
        epochs_per_period: i64,
    },

    #[error("invalid {field} address: {address:?}")]
    InvalidContractAddress {
        field: &'static str,
        address: String,
    },

    #[error("arithmetic overflow while performing economics calculation: {0}")]
    CalculationOverflow(&'static str),
}

/// Result type for economics operations
pub type Result<T> = std::result::Result<T, EconomicsError>;
