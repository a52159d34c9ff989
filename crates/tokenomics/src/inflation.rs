//! Inflation parameters governing per-period issuance

use crate::denom::validate_denom_syntax;
use crate::emission::EmissionCurve;
use crate::errors::{EconomicsError, Result};
use crate::types::{dec_mul, POWER_REDUCTION};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default denomination for newly minted coins
pub const DEFAULT_MINT_DENOM: &str = "aevmos";

/// Coefficients of the exponential emission curve
///
/// `f(x) = (a * (1 - r)^x + c) * (1 + max_variance - b * max_variance / bonding_target)`
/// where `x` is the period and `b` the bonded ratio capped at the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExponentialCalculation {
    /// Initial per-period issuance in whole units
    #[serde(with = "rust_decimal::serde::str")]
    pub a: Decimal,
    /// Reduction factor applied each period
    #[serde(with = "rust_decimal::serde::str")]
    pub r: Decimal,
    /// Long-term issuance floor
    #[serde(with = "rust_decimal::serde::str")]
    pub c: Decimal,
    /// Bonded ratio at which the bonding incentive bottoms out
    #[serde(with = "rust_decimal::serde::str")]
    pub bonding_target: Decimal,
    /// Maximum relative increase when nothing is bonded
    #[serde(with = "rust_decimal::serde::str")]
    pub max_variance: Decimal,
}

impl Default for ExponentialCalculation {
    fn default() -> Self {
        Self {
            a: Decimal::new(300_000_000, 0),
            r: Decimal::new(5, 1),
            c: Decimal::ZERO,
            bonding_target: Decimal::new(66, 2),
            max_variance: Decimal::ZERO,
        }
    }
}

impl ExponentialCalculation {
    pub fn validate(&self) -> Result<()> {
        if self.a.is_sign_negative() && !self.a.is_zero() {
            return Err(invalid("a", format!("initial value cannot be negative: {}", self.a)));
        }
        if !in_unit_interval(self.r) {
            return Err(invalid("r", format!("reduction factor must be within [0, 1]: {}", self.r)));
        }
        if self.c.is_sign_negative() && !self.c.is_zero() {
            return Err(invalid("c", format!("long term inflation cannot be negative: {}", self.c)));
        }
        if self.bonding_target <= Decimal::ZERO || self.bonding_target > Decimal::ONE {
            return Err(invalid(
                "bonding_target",
                format!("bonding target must be within (0, 1]: {}", self.bonding_target),
            ));
        }
        if self.max_variance.is_sign_negative() && !self.max_variance.is_zero() {
            return Err(invalid(
                "max_variance",
                format!("max variance cannot be negative: {}", self.max_variance),
            ));
        }

        // Largest epoch mint the curve can produce: period 0, nothing bonded,
        // one epoch per period. It must fit in atomic units.
        let peak = self
            .period_provision(0, Decimal::ZERO)
            .and_then(|p| dec_mul(p, Decimal::from(POWER_REDUCTION), "epoch provision"));
        if peak.is_err() {
            return Err(invalid(
                "a",
                format!("peak provision overflows atomic units: a = {}, c = {}", self.a, self.c),
            ));
        }
        Ok(())
    }
}

/// Shares of each epoch's mint routed to each destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InflationDistribution {
    #[serde(with = "rust_decimal::serde::str")]
    pub staking_rewards: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub usage_incentives: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub community_pool: Decimal,
}

impl Default for InflationDistribution {
    fn default() -> Self {
        Self {
            staking_rewards: Decimal::new(533_333_334, 9),
            usage_incentives: Decimal::new(333_333_333, 9),
            community_pool: Decimal::new(133_333_333, 9),
        }
    }
}

impl InflationDistribution {
    /// Each share lies in `[0, 1]` and together they sum to exactly one.
    pub fn validate(&self) -> Result<()> {
        let shares = [
            ("staking_rewards", self.staking_rewards),
            ("usage_incentives", self.usage_incentives),
            ("community_pool", self.community_pool),
        ];
        for (param, share) in shares {
            if !in_unit_interval(share) {
                return Err(invalid(param, format!("share must be within [0, 1]: {share}")));
            }
        }

        let total = self.staking_rewards + self.usage_incentives + self.community_pool;
        if total != Decimal::ONE {
            return Err(invalid(
                "inflation_distribution",
                format!("shares must sum to 1, got {total}"),
            ));
        }
        Ok(())
    }
}

/// Issuance-side parameter set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InflationParams {
    /// Denomination of minted coins
    pub mint_denom: String,
    pub exponential_calculation: ExponentialCalculation,
    pub inflation_distribution: InflationDistribution,
    /// When false, epoch ends mint nothing
    pub enable_inflation: bool,
}

impl Default for InflationParams {
    fn default() -> Self {
        Self {
            mint_denom: DEFAULT_MINT_DENOM.to_string(),
            exponential_calculation: ExponentialCalculation::default(),
            inflation_distribution: InflationDistribution::default(),
            enable_inflation: true,
        }
    }
}

impl InflationParams {
    pub fn new(
        mint_denom: impl Into<String>,
        exponential_calculation: ExponentialCalculation,
        inflation_distribution: InflationDistribution,
        enable_inflation: bool,
    ) -> Self {
        Self {
            mint_denom: mint_denom.into(),
            exponential_calculation,
            inflation_distribution,
            enable_inflation,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_denom_syntax(&self.mint_denom)?;
        self.exponential_calculation.validate()?;
        self.inflation_distribution.validate()
    }
}

pub(crate) fn in_unit_interval(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}

fn invalid(param: &'static str, reason: String) -> EconomicsError {
    EconomicsError::InvalidParameter { param, reason }
}
