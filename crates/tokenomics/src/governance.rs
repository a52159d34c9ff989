//! Single-field parameter changes
//!
//! A governance proposal touches one parameter at a time. Each key has
//! exactly one validator, chosen statically from the key, and a change is
//! staged on a copy and re-validated as a whole before it replaces the
//! stored set. A rejected change never mutates anything.

use crate::claims::{ensure_positive, ClaimsParams};
use crate::denom::validate_denom_syntax;
use crate::errors::{EconomicsError, Result};
use crate::inflation::{ExponentialCalculation, InflationDistribution, InflationParams};
use crate::store::ParamStore;
use crate::types::{duration_serde, Timestamp};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Store key of every updatable parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKey {
    EnableClaims,
    AirdropStartTime,
    DurationUntilDecay,
    DurationOfDecay,
    ClaimsDenom,
    MintDenom,
    ExponentialCalculation,
    InflationDistribution,
    EnableInflation,
}

/// Validator signature shared by every key
pub type Validator = fn(ParamKey, &ParamValue) -> Result<()>;

impl ParamKey {
    pub const ALL: [ParamKey; 9] = [
        ParamKey::EnableClaims,
        ParamKey::AirdropStartTime,
        ParamKey::DurationUntilDecay,
        ParamKey::DurationOfDecay,
        ParamKey::ClaimsDenom,
        ParamKey::MintDenom,
        ParamKey::ExponentialCalculation,
        ParamKey::InflationDistribution,
        ParamKey::EnableInflation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKey::EnableClaims => "EnableClaims",
            ParamKey::AirdropStartTime => "AirdropStartTime",
            ParamKey::DurationUntilDecay => "DurationUntilDecay",
            ParamKey::DurationOfDecay => "DurationOfDecay",
            ParamKey::ClaimsDenom => "ClaimsDenom",
            ParamKey::MintDenom => "MintDenom",
            ParamKey::ExponentialCalculation => "ExponentialCalculation",
            ParamKey::InflationDistribution => "InflationDistribution",
            ParamKey::EnableInflation => "EnableInflation",
        }
    }

    /// Whether the key belongs to [`ClaimsParams`] (otherwise [`InflationParams`])
    pub fn is_claims(&self) -> bool {
        matches!(
            self,
            ParamKey::EnableClaims
                | ParamKey::AirdropStartTime
                | ParamKey::DurationUntilDecay
                | ParamKey::DurationOfDecay
                | ParamKey::ClaimsDenom
        )
    }

    pub fn validator(&self) -> Validator {
        match self {
            ParamKey::EnableClaims | ParamKey::EnableInflation => validate_bool,
            ParamKey::AirdropStartTime => validate_start_date,
            ParamKey::DurationUntilDecay | ParamKey::DurationOfDecay => validate_duration,
            ParamKey::ClaimsDenom | ParamKey::MintDenom => validate_denom,
            ParamKey::ExponentialCalculation => validate_exponential_calculation,
            ParamKey::InflationDistribution => validate_inflation_distribution,
        }
    }

    pub fn validate(self, value: &ParamValue) -> Result<()> {
        (self.validator())(self, value)
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamKey {
    type Err = EconomicsError;

    fn from_str(s: &str) -> Result<Self> {
        ParamKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| EconomicsError::UnknownParameter(s.to_string()))
    }
}

/// A proposed parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ParamValue {
    Bool(bool),
    Time(Timestamp),
    Duration(#[serde(with = "duration_serde")] Duration),
    Denom(String),
    ExponentialCalculation(ExponentialCalculation),
    InflationDistribution(InflationDistribution),
}

impl ParamValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Time(_) => "time",
            ParamValue::Duration(_) => "duration",
            ParamValue::Denom(_) => "denom",
            ParamValue::ExponentialCalculation(_) => "exponential_calculation",
            ParamValue::InflationDistribution(_) => "inflation_distribution",
        }
    }
}

fn wrong_type(key: ParamKey, expected: &'static str, value: &ParamValue) -> EconomicsError {
    EconomicsError::InvalidParameterType {
        param: key.as_str(),
        expected,
        actual: value.kind(),
    }
}

pub fn validate_bool(key: ParamKey, value: &ParamValue) -> Result<()> {
    match value {
        ParamValue::Bool(_) => Ok(()),
        other => Err(wrong_type(key, "bool", other)),
    }
}

pub fn validate_start_date(key: ParamKey, value: &ParamValue) -> Result<()> {
    match value {
        ParamValue::Time(_) => Ok(()),
        other => Err(wrong_type(key, "time", other)),
    }
}

pub fn validate_duration(key: ParamKey, value: &ParamValue) -> Result<()> {
    match value {
        ParamValue::Duration(duration) => ensure_positive(key.as_str(), duration),
        other => Err(wrong_type(key, "duration", other)),
    }
}

pub fn validate_denom(key: ParamKey, value: &ParamValue) -> Result<()> {
    match value {
        ParamValue::Denom(denom) => validate_denom_syntax(denom),
        other => Err(wrong_type(key, "denom", other)),
    }
}

pub fn validate_exponential_calculation(key: ParamKey, value: &ParamValue) -> Result<()> {
    match value {
        ParamValue::ExponentialCalculation(calc) => calc.validate(),
        other => Err(wrong_type(key, "exponential_calculation", other)),
    }
}

pub fn validate_inflation_distribution(key: ParamKey, value: &ParamValue) -> Result<()> {
    match value {
        ParamValue::InflationDistribution(dist) => dist.validate(),
        other => Err(wrong_type(key, "inflation_distribution", other)),
    }
}

/// One field, one new value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamChange {
    pub key: ParamKey,
    pub value: ParamValue,
}

impl ParamChange {
    pub fn new(key: ParamKey, value: ParamValue) -> Self {
        Self { key, value }
    }
}

impl ClaimsParams {
    /// Validate and commit a single-field change. On error `self` is untouched.
    pub fn apply_change(&mut self, change: &ParamChange) -> Result<()> {
        change.key.validate(&change.value)?;

        let mut staged = self.clone();
        match (change.key, &change.value) {
            (ParamKey::EnableClaims, ParamValue::Bool(v)) => staged.enable_claims = *v,
            (ParamKey::AirdropStartTime, ParamValue::Time(v)) => staged.airdrop_start_time = *v,
            (ParamKey::DurationUntilDecay, ParamValue::Duration(v)) => {
                staged.duration_until_decay = *v
            }
            (ParamKey::DurationOfDecay, ParamValue::Duration(v)) => staged.duration_of_decay = *v,
            (ParamKey::ClaimsDenom, ParamValue::Denom(v)) => staged.claims_denom = v.clone(),
            (key, _) if !key.is_claims() => {
                return Err(EconomicsError::UnknownParameter(key.to_string()))
            }
            (key, other) => return Err(wrong_type(key, "matching value", other)),
        }
        staged.validate()?;

        *self = staged;
        Ok(())
    }
}

impl InflationParams {
    /// Validate and commit a single-field change. On error `self` is untouched.
    pub fn apply_change(&mut self, change: &ParamChange) -> Result<()> {
        change.key.validate(&change.value)?;

        let mut staged = self.clone();
        match (change.key, &change.value) {
            (ParamKey::MintDenom, ParamValue::Denom(v)) => staged.mint_denom = v.clone(),
            (ParamKey::ExponentialCalculation, ParamValue::ExponentialCalculation(v)) => {
                staged.exponential_calculation = v.clone()
            }
            (ParamKey::InflationDistribution, ParamValue::InflationDistribution(v)) => {
                staged.inflation_distribution = v.clone()
            }
            (ParamKey::EnableInflation, ParamValue::Bool(v)) => staged.enable_inflation = *v,
            (key, _) if key.is_claims() => {
                return Err(EconomicsError::UnknownParameter(key.to_string()))
            }
            (key, other) => return Err(wrong_type(key, "matching value", other)),
        }
        staged.validate()?;

        *self = staged;
        Ok(())
    }
}

/// Apply a batch of changes to the stored parameters, all or nothing.
///
/// Every change is staged against copies of both parameter sets; the store
/// is written only when all of them validate.
pub fn apply_param_changes<S: ParamStore + ?Sized>(
    store: &mut S,
    changes: &[ParamChange],
) -> Result<()> {
    let mut claims = store.claims_params();
    let mut inflation = store.inflation_params();

    for change in changes {
        let staged = if change.key.is_claims() {
            claims.apply_change(change)
        } else {
            inflation.apply_change(change)
        };
        if let Err(err) = staged {
            warn!(key = %change.key, error = %err, "rejected parameter change");
            return Err(err);
        }
    }

    store.set_claims_params(claims);
    store.set_inflation_params(inflation);
    info!(changes = changes.len(), "committed parameter changes");
    Ok(())
}
