//! Time-windowed claim decay
//!
//! An airdrop allotment keeps its full value until `decay_start_time`, then
//! shrinks linearly to zero at `airdrop_end_time`:
//!
//! ```text
//! factor(t) = 1                                   t <  decay_start
//!           = 1 - (t - decay_start) / decay_len   decay_start <= t < end
//!           = 0                                   t >= end
//! ```

use crate::claims::{ensure_positive, ClaimsParams};
use crate::errors::{EconomicsError, Result};
use crate::types::{dec_div, dec_mul, truncate_amount, Amount, Timestamp};
use chrono::Duration;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where a block time falls in the claims schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecayPhase {
    /// Before decay starts; claims pay out in full
    FullValue,
    /// Inside `[decay_start, end)`; payouts shrink linearly
    Decaying,
    /// At or after the end; nothing is claimable
    Expired,
}

/// Read-only view of the decay schedule for one parameter set.
#[derive(Debug, Clone, Copy)]
pub struct DecaySchedule<'a> {
    params: &'a ClaimsParams,
}

impl<'a> DecaySchedule<'a> {
    pub fn new(params: &'a ClaimsParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ClaimsParams {
        self.params
    }

    pub fn decay_start_time(&self) -> Timestamp {
        self.params.decay_start_time()
    }

    pub fn airdrop_end_time(&self) -> Timestamp {
        self.params.airdrop_end_time()
    }

    pub fn phase(&self, now: Timestamp) -> DecayPhase {
        if now < self.decay_start_time() {
            DecayPhase::FullValue
        } else if now < self.airdrop_end_time() {
            DecayPhase::Decaying
        } else {
            DecayPhase::Expired
        }
    }

    /// Fraction of the allotment still claimable at `now`, in `[0, 1]`.
    pub fn decay_factor(&self, now: Timestamp) -> Result<Decimal> {
        match self.phase(now) {
            DecayPhase::FullValue => Ok(Decimal::ONE),
            DecayPhase::Expired => Ok(Decimal::ZERO),
            DecayPhase::Decaying => {
                let elapsed = now - self.decay_start_time();
                let decayed = elapsed_ratio(elapsed, self.params.duration_of_decay)?;
                Ok((Decimal::ONE - decayed).clamp(Decimal::ZERO, Decimal::ONE))
            }
        }
    }

    /// `initial * decay_factor(now)`, truncated toward zero.
    pub fn claimable_amount(&self, initial: Amount, now: Timestamp) -> Result<Amount> {
        let factor = self.decay_factor(now)?;
        if factor == Decimal::ONE {
            return Ok(initial);
        }
        let initial = Decimal::from_u128(initial)
            .ok_or(EconomicsError::CalculationOverflow("claimable amount"))?;
        let claimable = dec_mul(initial, factor, "claimable amount")?;
        truncate_amount(claimable, "claimable amount")
    }
}

impl ClaimsParams {
    /// Decay schedule view over these parameters
    pub fn decay_schedule(&self) -> DecaySchedule<'_> {
        DecaySchedule::new(self)
    }
}

/// `elapsed / total` on integer nanoseconds, falling back to milliseconds
/// for windows longer than `i64` nanoseconds can hold.
fn elapsed_ratio(elapsed: Duration, total: Duration) -> Result<Decimal> {
    ensure_positive("duration_of_decay", &total)?;
    let (num, den) = match (elapsed.num_nanoseconds(), total.num_nanoseconds()) {
        (Some(num), Some(den)) => (num, den),
        _ => (elapsed.num_milliseconds(), total.num_milliseconds()),
    };
    dec_div(Decimal::from(num), Decimal::from(den), "decay ratio")
}
