//! Epoch mint provision calculation and period advancement
//!
//! The issuance for a period comes from an [`EmissionCurve`] and is split
//! evenly across the period's epochs. The per-epoch amount is always
//! recomputed from scratch when the period changes so no rounding drift
//! accumulates across periods.

use crate::distribution::{allocate_inflation, InflationAllocation};
use crate::errors::{EconomicsError, Result};
use crate::inflation::{ExponentialCalculation, InflationParams};
use crate::types::{dec_div, dec_mul, dec_powu, truncate_amount, Amount, Period, POWER_REDUCTION};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Policy mapping a period to its total issuance in whole units.
///
/// Implementations must be pure: identical inputs yield identical outputs
/// on every node.
pub trait EmissionCurve {
    fn period_provision(&self, period: Period, bonded_ratio: Decimal) -> Result<Decimal>;
}

impl EmissionCurve for ExponentialCalculation {
    /// `(a * (1 - r)^period + c) * bonding_incentive`
    fn period_provision(&self, period: Period, bonded_ratio: Decimal) -> Result<Decimal> {
        let decay = Decimal::ONE - self.r;
        let reduction = dec_powu(decay, period, "exponential decay")?;
        let exponential = dec_mul(self.a, reduction, "exponential decay")?
            .checked_add(self.c)
            .ok_or(EconomicsError::CalculationOverflow("exponential decay"))?;

        // The incentive stops shrinking once the bonding target is reached.
        let bonded = bonded_ratio.min(self.bonding_target);
        let slope = dec_div(self.max_variance, self.bonding_target, "bonding incentive")?;
        let sub = dec_mul(bonded, slope, "bonding incentive")?;
        let bonding_incentive = Decimal::ONE + self.max_variance - sub;

        dec_mul(exponential, bonding_incentive, "period provision")
    }
}

/// Per-epoch mint amount (atomic units) under the configured exponential curve.
pub fn calculate_epoch_mint_provision(
    params: &InflationParams,
    period: Period,
    epochs_per_period: i64,
    bonded_ratio: Decimal,
) -> Result<Decimal> {
    calculate_epoch_mint_provision_with(
        &params.exponential_calculation,
        period,
        epochs_per_period,
        bonded_ratio,
    )
}

/// Per-epoch mint amount (atomic units) under an arbitrary curve.
pub fn calculate_epoch_mint_provision_with<C: EmissionCurve + ?Sized>(
    curve: &C,
    period: Period,
    epochs_per_period: i64,
    bonded_ratio: Decimal,
) -> Result<Decimal> {
    if epochs_per_period <= 0 {
        return Err(EconomicsError::InvalidEpochsPerPeriod(epochs_per_period));
    }

    let period_provision = curve.period_provision(period, bonded_ratio)?;
    let epoch_provision = dec_div(
        period_provision,
        Decimal::from(epochs_per_period),
        "epoch provision",
    )?;

    // Curves are expressed in whole units; mint in atomic units.
    let provision = dec_mul(epoch_provision, Decimal::from(POWER_REDUCTION), "epoch provision")?;

    debug!(
        period,
        epochs_per_period,
        %bonded_ratio,
        %provision,
        "calculated epoch mint provision"
    );
    Ok(provision)
}

/// Checks shared by the live emission state and genesis, in report order.
pub fn validate_emission_counters(
    epoch_identifier: &str,
    epochs_per_period: i64,
    bonded_ratio: Decimal,
) -> Result<()> {
    if epoch_identifier.is_empty() {
        return Err(EconomicsError::EmptyEpochIdentifier);
    }
    if epochs_per_period <= 0 {
        return Err(EconomicsError::InvalidEpochsPerPeriod(epochs_per_period));
    }
    if bonded_ratio.is_sign_negative() && !bonded_ratio.is_zero() {
        return Err(EconomicsError::NegativeBondedRatio(bonded_ratio));
    }
    if bonded_ratio > Decimal::ONE {
        return Err(EconomicsError::BondedRatioExceedsOne(bonded_ratio));
    }
    Ok(())
}

/// Issuance counters owned by the host chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionState {
    /// Completed periods
    pub period: Period,
    /// Epoch cadence this module mints on (e.g. `"day"`)
    pub epoch_identifier: String,
    pub epochs_per_period: i64,
    /// Fraction of supply currently staked
    #[serde(with = "rust_decimal::serde::str")]
    pub bonded_ratio: Decimal,
    /// Cached per-epoch mint for the current period
    #[serde(with = "rust_decimal::serde::str")]
    pub epoch_mint_provision: Decimal,
    /// Epochs that ended while inflation was disabled
    #[serde(default)]
    pub skipped_epochs: u64,
}

/// Outcome of one epoch end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochMint {
    pub epoch_number: i64,
    /// Period the mint was issued under
    pub period: Period,
    pub minted: Amount,
    pub allocation: InflationAllocation,
    /// Whether this epoch closed its period
    pub period_advanced: bool,
}

impl EmissionState {
    /// Build a state at `period` with its provision already computed.
    pub fn new(
        params: &InflationParams,
        period: Period,
        epoch_identifier: impl Into<String>,
        epochs_per_period: i64,
        bonded_ratio: Decimal,
    ) -> Result<Self> {
        let mut state = Self {
            period,
            epoch_identifier: epoch_identifier.into(),
            epochs_per_period,
            bonded_ratio,
            epoch_mint_provision: Decimal::ZERO,
            skipped_epochs: 0,
        };
        state.validate()?;
        state.recompute_provision(params)?;
        Ok(state)
    }

    /// Resume with `skipped` epochs already excluded from period counting.
    pub fn with_skipped_epochs(mut self, skipped: u64) -> Self {
        self.skipped_epochs = skipped;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_emission_counters(
            &self.epoch_identifier,
            self.epochs_per_period,
            self.bonded_ratio,
        )
    }

    /// Recompute and cache the provision for the current period.
    pub fn recompute_provision(&mut self, params: &InflationParams) -> Result<Decimal> {
        self.epoch_mint_provision = calculate_epoch_mint_provision(
            params,
            self.period,
            self.epochs_per_period,
            self.bonded_ratio,
        )?;
        Ok(self.epoch_mint_provision)
    }

    /// First epoch number (1-based) belonging to the current period.
    ///
    /// Skipped epochs shift every later period back by one epoch each.
    pub fn period_start_epoch(&self) -> Result<i64> {
        let skipped = i64::try_from(self.skipped_epochs).ok();
        i64::try_from(self.period)
            .ok()
            .and_then(|p| p.checked_mul(self.epochs_per_period))
            .and_then(|e| e.checked_add(skipped?))
            .and_then(|e| e.checked_add(1))
            .ok_or(EconomicsError::CalculationOverflow("period start epoch"))
    }

    /// Mint for a finished epoch and advance the period when it is full.
    ///
    /// Epochs are numbered from 1; with no skipped epochs period `p` covers
    /// `p * epochs_per_period + 1 ..= (p + 1) * epochs_per_period`. Epochs
    /// with a foreign identifier mint nothing and return `None`. Epochs
    /// ending while inflation is disabled also return `None` and are added
    /// to `skipped_epochs`, so only mint-bearing epochs fill a period.
    pub fn after_epoch_end(
        &mut self,
        params: &InflationParams,
        epoch_identifier: &str,
        epoch_number: i64,
    ) -> Result<Option<EpochMint>> {
        if epoch_identifier != self.epoch_identifier {
            return Ok(None);
        }
        if !params.enable_inflation {
            self.skipped_epochs = self
                .skipped_epochs
                .checked_add(1)
                .ok_or(EconomicsError::CalculationOverflow("skipped epochs"))?;
            debug!(
                epoch_number,
                skipped_epochs = self.skipped_epochs,
                "inflation disabled, skipped epoch"
            );
            return Ok(None);
        }

        let period_start = self.period_start_epoch()?;
        if epoch_number < period_start {
            return Err(EconomicsError::InvalidEpochNumber {
                epoch_number,
                period: self.period,
                epochs_per_period: self.epochs_per_period,
            });
        }

        let minted = truncate_amount(self.epoch_mint_provision, "epoch mint")?;
        let allocation = allocate_inflation(minted, &params.inflation_distribution)?;
        let minted_period = self.period;

        let elapsed = epoch_number - period_start + 1;
        let period_advanced = elapsed >= self.epochs_per_period;
        if period_advanced {
            self.period = self
                .period
                .checked_add(1)
                .ok_or(EconomicsError::CalculationOverflow("period"))?;
            self.recompute_provision(params)?;
            info!(
                period = self.period,
                epoch_number,
                provision = %self.epoch_mint_provision,
                "advanced inflation period"
            );
        }

        debug!(epoch_number, %minted, period = minted_period, "minted epoch provision");
        Ok(Some(EpochMint {
            epoch_number,
            period: minted_period,
            minted,
            allocation,
            period_advanced,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    struct Flat(Decimal);

    impl EmissionCurve for Flat {
        fn period_provision(&self, _period: Period, _bonded_ratio: Decimal) -> Result<Decimal> {
            Ok(self.0)
        }
    }

    #[test]
    fn default_curve_first_period() {
        let params = InflationParams::default();
        let provision = calculate_epoch_mint_provision(&params, 0, 365, Decimal::ONE).unwrap();
        assert_eq!(provision, dec("821917808219178082191781"));
    }

    #[test]
    fn default_curve_halves_each_period() {
        let params = InflationParams::default();
        let provision = calculate_epoch_mint_provision(&params, 1, 365, Decimal::ZERO).unwrap();
        assert_eq!(provision, dec("410958904109589041095890"));
    }

    #[test]
    fn long_term_floor_is_added() {
        let mut params = InflationParams::default();
        params.exponential_calculation.c = dec("1000");
        params.exponential_calculation.r = Decimal::ONE;
        let provision = calculate_epoch_mint_provision(&params, 3, 10, Decimal::ZERO).unwrap();
        assert_eq!(provision, dec("100") * Decimal::from(POWER_REDUCTION));
    }

    #[test]
    fn bonding_incentive_scales_with_bonded_ratio() {
        let calc = ExponentialCalculation {
            a: dec("100"),
            r: Decimal::ZERO,
            c: Decimal::ZERO,
            bonding_target: dec("0.5"),
            max_variance: dec("0.4"),
        };
        assert_eq!(calc.period_provision(0, Decimal::ZERO).unwrap(), dec("140"));
        assert_eq!(calc.period_provision(0, dec("0.25")).unwrap(), dec("120"));
        assert_eq!(calc.period_provision(0, dec("0.5")).unwrap(), dec("100"));
        // Capped at the target.
        assert_eq!(calc.period_provision(0, dec("0.9")).unwrap(), dec("100"));
    }

    #[test]
    fn rejects_non_positive_epochs_per_period() {
        let params = InflationParams::default();
        for epochs in [0, -1, i64::MIN] {
            assert_eq!(
                calculate_epoch_mint_provision(&params, 0, epochs, Decimal::ZERO),
                Err(EconomicsError::InvalidEpochsPerPeriod(epochs))
            );
        }
    }

    #[test]
    fn custom_curve_divides_evenly() {
        let provision =
            calculate_epoch_mint_provision_with(&Flat(dec("30")), 7, 3, Decimal::ZERO).unwrap();
        assert_eq!(provision, dec("10") * Decimal::from(POWER_REDUCTION));
    }

    #[test]
    fn counters_report_first_violation() {
        assert_eq!(
            validate_emission_counters("", 0, dec("-1")),
            Err(EconomicsError::EmptyEpochIdentifier)
        );
        assert_eq!(
            validate_emission_counters("day", 0, dec("-1")),
            Err(EconomicsError::InvalidEpochsPerPeriod(0))
        );
        assert_eq!(
            validate_emission_counters("day", 1, dec("-0.1")),
            Err(EconomicsError::NegativeBondedRatio(dec("-0.1")))
        );
        assert_eq!(
            validate_emission_counters("day", 1, dec("1.2")),
            Err(EconomicsError::BondedRatioExceedsOne(dec("1.2")))
        );
        assert!(validate_emission_counters("day", 1, Decimal::ONE).is_ok());
    }

    #[test]
    fn epoch_end_advances_period_after_last_epoch() {
        let params = InflationParams::default();
        let mut state = EmissionState::new(&params, 0, "day", 3, Decimal::ZERO).unwrap();
        let first = state.epoch_mint_provision;

        for epoch in 1..=2 {
            let mint = state.after_epoch_end(&params, "day", epoch).unwrap().unwrap();
            assert!(!mint.period_advanced);
            assert_eq!(mint.period, 0);
            assert_eq!(state.period, 0);
        }

        let mint = state.after_epoch_end(&params, "day", 3).unwrap().unwrap();
        assert!(mint.period_advanced);
        assert_eq!(mint.period, 0);
        assert_eq!(state.period, 1);
        assert_eq!(state.epoch_mint_provision, dec_div(first, dec("2"), "t").unwrap());
    }

    #[test]
    fn epoch_end_ignores_foreign_identifier_and_disabled_inflation() {
        let mut params = InflationParams::default();
        let mut state = EmissionState::new(&params, 0, "day", 3, Decimal::ZERO).unwrap();
        assert_eq!(state.after_epoch_end(&params, "week", 1).unwrap(), None);

        assert_eq!(state.skipped_epochs, 0);

        params.enable_inflation = false;
        assert_eq!(state.after_epoch_end(&params, "day", 1).unwrap(), None);
        assert_eq!(state.period, 0);
        assert_eq!(state.skipped_epochs, 1);
    }

    #[test]
    fn disabled_epochs_do_not_fill_a_period() {
        let mut params = InflationParams::default();
        let mut state = EmissionState::new(&params, 0, "day", 3, Decimal::ZERO).unwrap();
        let first = state.epoch_mint_provision;

        params.enable_inflation = false;
        for epoch in 1..=6 {
            assert_eq!(state.after_epoch_end(&params, "day", epoch).unwrap(), None);
        }
        assert_eq!(state.skipped_epochs, 6);
        assert_eq!(state.period_start_epoch().unwrap(), 7);

        params.enable_inflation = true;
        for epoch in 7..=8 {
            let mint = state.after_epoch_end(&params, "day", epoch).unwrap().unwrap();
            assert!(!mint.period_advanced);
            assert_eq!(mint.period, 0);
        }
        let mint = state.after_epoch_end(&params, "day", 9).unwrap().unwrap();
        assert!(mint.period_advanced);
        assert_eq!(mint.period, 0);
        assert_eq!(state.period, 1);
        assert_eq!(state.period_start_epoch().unwrap(), 10);
        assert_eq!(state.epoch_mint_provision, dec_div(first, dec("2"), "t").unwrap());

        // A pause in the middle of a period stretches that period.
        params.enable_inflation = false;
        assert_eq!(state.after_epoch_end(&params, "day", 10).unwrap(), None);
        params.enable_inflation = true;
        for epoch in 11..=12 {
            let mint = state.after_epoch_end(&params, "day", epoch).unwrap().unwrap();
            assert!(!mint.period_advanced);
        }
        let mint = state.after_epoch_end(&params, "day", 13).unwrap().unwrap();
        assert!(mint.period_advanced);
        assert_eq!(state.period, 2);
        assert_eq!(state.skipped_epochs, 7);
    }

    #[test]
    fn foreign_identifier_is_not_counted_as_skipped() {
        let mut params = InflationParams::default();
        params.enable_inflation = false;
        let mut state = EmissionState::new(&params, 0, "day", 3, Decimal::ZERO).unwrap();
        assert_eq!(state.after_epoch_end(&params, "week", 1).unwrap(), None);
        assert_eq!(state.skipped_epochs, 0);
    }

    #[test]
    fn resumed_state_honors_skipped_epochs() {
        let params = InflationParams::default();
        let mut state = EmissionState::new(&params, 1, "day", 10, Decimal::ZERO)
            .unwrap()
            .with_skipped_epochs(4);
        assert_eq!(state.period_start_epoch().unwrap(), 15);
        assert!(matches!(
            state.after_epoch_end(&params, "day", 14),
            Err(EconomicsError::InvalidEpochNumber { epoch_number: 14, .. })
        ));
        assert!(!state.after_epoch_end(&params, "day", 15).unwrap().unwrap().period_advanced);
    }

    #[test]
    fn epoch_end_rejects_epochs_from_past_periods() {
        let params = InflationParams::default();
        let mut state = EmissionState::new(&params, 2, "day", 10, Decimal::ZERO).unwrap();
        assert_eq!(state.period_start_epoch().unwrap(), 21);
        assert!(matches!(
            state.after_epoch_end(&params, "day", 20),
            Err(EconomicsError::InvalidEpochNumber { epoch_number: 20, period: 2, .. })
        ));
    }

    #[test]
    fn minted_amount_is_fully_allocated() {
        let params = InflationParams::default();
        let mut state = EmissionState::new(&params, 0, "day", 365, dec("0.4")).unwrap();
        let mint = state.after_epoch_end(&params, "day", 1).unwrap().unwrap();
        assert_eq!(mint.minted, 821_917_808_219_178_082_191_781);
        assert_eq!(mint.allocation.total(), mint.minted);
    }
}
