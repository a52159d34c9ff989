//! Host-side state collaborators
//!
//! The chain owns persistent storage; this crate only sees it through
//! [`ParamStore`] and [`AccountKeeper`]. [`MemoryStore`] backs tests and
//! offline tooling.

use crate::claims::ClaimsParams;
use crate::inflation::InflationParams;
use crate::types::Period;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name of the module account that receives minted coins
pub const INFLATION_MODULE_NAME: &str = "inflation";

/// Typed view over the chain's key-value store
pub trait ParamStore {
    fn inflation_params(&self) -> InflationParams;
    fn set_inflation_params(&mut self, params: InflationParams);

    fn claims_params(&self) -> ClaimsParams;
    fn set_claims_params(&mut self, params: ClaimsParams);

    fn period(&self) -> Period;
    fn set_period(&mut self, period: Period);

    fn epoch_identifier(&self) -> String;
    fn set_epoch_identifier(&mut self, identifier: String);

    fn epochs_per_period(&self) -> i64;
    fn set_epochs_per_period(&mut self, epochs: i64);

    fn bonded_ratio(&self) -> Decimal;
    fn set_bonded_ratio(&mut self, ratio: Decimal);

    fn skipped_epochs(&self) -> u64;
    fn set_skipped_epochs(&mut self, skipped: u64);

    fn epoch_mint_provision(&self) -> Decimal;
    fn set_epoch_mint_provision(&mut self, provision: Decimal);
}

/// Module-account existence checks
pub trait AccountKeeper {
    fn has_module_account(&self, name: &str) -> bool;
}

/// In-memory [`ParamStore`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStore {
    pub inflation: InflationParams,
    pub claims: ClaimsParams,
    pub period: Period,
    pub epoch_identifier: String,
    pub epochs_per_period: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub bonded_ratio: Decimal,
    #[serde(default)]
    pub skipped_epochs: u64,
    #[serde(with = "rust_decimal::serde::str")]
    pub epoch_mint_provision: Decimal,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParamStore for MemoryStore {
    fn inflation_params(&self) -> InflationParams {
        self.inflation.clone()
    }

    fn set_inflation_params(&mut self, params: InflationParams) {
        self.inflation = params;
    }

    fn claims_params(&self) -> ClaimsParams {
        self.claims.clone()
    }

    fn set_claims_params(&mut self, params: ClaimsParams) {
        self.claims = params;
    }

    fn period(&self) -> Period {
        self.period
    }

    fn set_period(&mut self, period: Period) {
        self.period = period;
    }

    fn epoch_identifier(&self) -> String {
        self.epoch_identifier.clone()
    }

    fn set_epoch_identifier(&mut self, identifier: String) {
        self.epoch_identifier = identifier;
    }

    fn epochs_per_period(&self) -> i64 {
        self.epochs_per_period
    }

    fn set_epochs_per_period(&mut self, epochs: i64) {
        self.epochs_per_period = epochs;
    }

    fn bonded_ratio(&self) -> Decimal {
        self.bonded_ratio
    }

    fn set_bonded_ratio(&mut self, ratio: Decimal) {
        self.bonded_ratio = ratio;
    }

    fn skipped_epochs(&self) -> u64 {
        self.skipped_epochs
    }

    fn set_skipped_epochs(&mut self, skipped: u64) {
        self.skipped_epochs = skipped;
    }

    fn epoch_mint_provision(&self) -> Decimal {
        self.epoch_mint_provision
    }

    fn set_epoch_mint_provision(&mut self, provision: Decimal) {
        self.epoch_mint_provision = provision;
    }
}

/// Fixed set of module accounts
#[derive(Debug, Clone, Default)]
pub struct ModuleAccounts {
    names: HashSet<String>,
}

impl ModuleAccounts {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Accounts with the inflation module registered
    pub fn with_inflation() -> Self {
        Self::new([INFLATION_MODULE_NAME])
    }
}

impl AccountKeeper for ModuleAccounts {
    fn has_module_account(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}
