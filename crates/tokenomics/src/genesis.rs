//! Genesis state validation, import and export

use crate::claims::ClaimsParams;
use crate::emission::{calculate_epoch_mint_provision, validate_emission_counters, EmissionState};
use crate::errors::{EconomicsError, Result};
use crate::inflation::InflationParams;
use crate::store::{AccountKeeper, ParamStore, INFLATION_MODULE_NAME};
use crate::types::Period;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default epoch cadence
pub const DEFAULT_EPOCH_IDENTIFIER: &str = "day";

/// Default number of epochs in one period
pub const DEFAULT_EPOCHS_PER_PERIOD: i64 = 365;

/// Full on-chain snapshot of the module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: InflationParams,
    #[serde(default)]
    pub claims: ClaimsParams,
    pub period: Period,
    pub epoch_identifier: String,
    pub epochs_per_period: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub bonded_ratio: Decimal,
    /// Epochs that ended while inflation was disabled
    #[serde(default)]
    pub skipped_epochs: u64,
}

impl Default for GenesisState {
    fn default() -> Self {
        Self {
            params: InflationParams::default(),
            claims: ClaimsParams::default(),
            period: 0,
            epoch_identifier: DEFAULT_EPOCH_IDENTIFIER.to_string(),
            epochs_per_period: DEFAULT_EPOCHS_PER_PERIOD,
            bonded_ratio: Decimal::ZERO,
            skipped_epochs: 0,
        }
    }
}

impl GenesisState {
    pub fn new(
        params: InflationParams,
        period: Period,
        epoch_identifier: impl Into<String>,
        epochs_per_period: i64,
        bonded_ratio: Decimal,
    ) -> Self {
        Self {
            params,
            claims: ClaimsParams::default(),
            period,
            epoch_identifier: epoch_identifier.into(),
            epochs_per_period,
            bonded_ratio,
            skipped_epochs: 0,
        }
    }

    pub fn with_claims(mut self, claims: ClaimsParams) -> Self {
        self.claims = claims;
        self
    }

    /// Single ordered pass; the first violated rule is reported.
    ///
    /// 1. empty epoch identifier
    /// 2. non-positive epochs per period
    /// 3. negative bonded ratio
    /// 4. bonded ratio above one
    /// 5. inflation parameters, then claims parameters
    pub fn validate(&self) -> Result<()> {
        validate_emission_counters(
            &self.epoch_identifier,
            self.epochs_per_period,
            self.bonded_ratio,
        )?;
        self.params.validate()?;
        self.claims.validate()
    }

    /// Live emission state for this snapshot, provision included.
    pub fn emission_state(&self) -> Result<EmissionState> {
        Ok(EmissionState::new(
            &self.params,
            self.period,
            self.epoch_identifier.clone(),
            self.epochs_per_period,
            self.bonded_ratio,
        )?
        .with_skipped_epochs(self.skipped_epochs))
    }
}

/// Load a genesis snapshot into the store.
///
/// Any failure is fatal to node startup: nothing is written unless the
/// module account exists, the state validates and the provision computes.
pub fn init_genesis<S, A>(store: &mut S, accounts: &A, state: &GenesisState) -> Result<Decimal>
where
    S: ParamStore + ?Sized,
    A: AccountKeeper + ?Sized,
{
    if !accounts.has_module_account(INFLATION_MODULE_NAME) {
        return Err(EconomicsError::MissingModuleAccount(
            INFLATION_MODULE_NAME.to_string(),
        ));
    }

    if let Err(err) = state.validate() {
        warn!(error = %err, "rejected genesis state");
        return Err(err);
    }

    let provision = calculate_epoch_mint_provision(
        &state.params,
        state.period,
        state.epochs_per_period,
        state.bonded_ratio,
    )?;

    store.set_inflation_params(state.params.clone());
    store.set_claims_params(state.claims.clone());
    store.set_period(state.period);
    store.set_epoch_identifier(state.epoch_identifier.clone());
    store.set_epochs_per_period(state.epochs_per_period);
    store.set_bonded_ratio(state.bonded_ratio);
    store.set_skipped_epochs(state.skipped_epochs);
    store.set_epoch_mint_provision(provision);

    info!(
        period = state.period,
        skipped_epochs = state.skipped_epochs,
        epoch_identifier = %state.epoch_identifier,
        epochs_per_period = state.epochs_per_period,
        %provision,
        "initialized inflation genesis"
    );
    Ok(provision)
}

/// Read the current state back out. Never validates; in-memory state is
/// presumed valid.
pub fn export_genesis<S: ParamStore + ?Sized>(store: &S) -> GenesisState {
    GenesisState {
        params: store.inflation_params(),
        claims: store.claims_params(),
        period: store.period(),
        epoch_identifier: store.epoch_identifier(),
        epochs_per_period: store.epochs_per_period(),
        bonded_ratio: store.bonded_ratio(),
        skipped_epochs: store.skipped_epochs(),
    }
}
