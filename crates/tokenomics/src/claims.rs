//! Claims (airdrop) parameter set

use crate::denom::validate_denom_syntax;
use crate::errors::{EconomicsError, Result};
use crate::types::{duration_serde, format_duration, saturating_add, unset_start_time, Timestamp};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Default payout denomination for claims
pub const DEFAULT_CLAIMS_DENOM: &str = "aevmos";

/// Full-value window before decay begins
pub fn default_duration_until_decay() -> Duration {
    Duration::hours(1)
}

/// Linear decay window
pub fn default_duration_of_decay() -> Duration {
    Duration::hours(5)
}

/// Claims parameters, read once per block.
///
/// Disabling claims does not relax validation: a disabled set must stay
/// internally consistent so it can be re-enabled safely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsParams {
    /// Master on/off switch
    pub enable_claims: bool,
    /// Instant the claim/decay clock starts; year one means unset
    #[serde(default = "unset_start_time")]
    pub airdrop_start_time: Timestamp,
    /// Length of the full-value window after start
    #[serde(with = "duration_serde")]
    pub duration_until_decay: Duration,
    /// Length of the linear decay window following the full-value window
    #[serde(with = "duration_serde")]
    pub duration_of_decay: Duration,
    /// Currency identifier for claim payouts
    pub claims_denom: String,
}

impl Default for ClaimsParams {
    fn default() -> Self {
        Self {
            enable_claims: true,
            airdrop_start_time: unset_start_time(),
            duration_until_decay: default_duration_until_decay(),
            duration_of_decay: default_duration_of_decay(),
            claims_denom: DEFAULT_CLAIMS_DENOM.to_string(),
        }
    }
}

impl ClaimsParams {
    pub fn new(
        enable_claims: bool,
        airdrop_start_time: Timestamp,
        claims_denom: impl Into<String>,
        duration_until_decay: Duration,
        duration_of_decay: Duration,
    ) -> Self {
        Self {
            enable_claims,
            airdrop_start_time,
            duration_until_decay,
            duration_of_decay,
            claims_denom: claims_denom.into(),
        }
    }

    /// Structural check of every field. Pure.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("duration_of_decay", &self.duration_of_decay)?;
        ensure_positive("duration_until_decay", &self.duration_until_decay)?;
        validate_denom_syntax(&self.claims_denom)
    }

    /// Whether an airdrop start time has been configured
    pub fn has_start_time(&self) -> bool {
        self.airdrop_start_time != unset_start_time()
    }

    /// `airdrop_start_time + duration_until_decay`
    pub fn decay_start_time(&self) -> Timestamp {
        saturating_add(self.airdrop_start_time, self.duration_until_decay)
    }

    /// `decay_start_time + duration_of_decay`; no claims are processed after this.
    pub fn airdrop_end_time(&self) -> Timestamp {
        saturating_add(self.decay_start_time(), self.duration_of_decay)
    }

    /// Claims are accepted once enabled and the clock has started.
    pub fn is_claims_active(&self, now: Timestamp) -> bool {
        self.enable_claims && now >= self.airdrop_start_time
    }
}

pub(crate) fn ensure_positive(param: &'static str, duration: &Duration) -> Result<()> {
    if *duration <= Duration::zero() {
        return Err(EconomicsError::InvalidDuration {
            param,
            value: format_duration(duration),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2022, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn default_params_are_valid() {
        let params = ClaimsParams::default();
        assert!(params.validate().is_ok());
        assert!(!params.has_start_time());
        assert_eq!(params.claims_denom, "aevmos");
    }

    #[test]
    fn boundary_times_follow_durations() {
        let params = ClaimsParams::new(
            true,
            t0(),
            "aevmos",
            Duration::hours(1),
            Duration::hours(5),
        );
        assert_eq!(params.decay_start_time(), t0() + Duration::hours(1));
        assert_eq!(params.airdrop_end_time(), t0() + Duration::hours(6));
    }

    #[test]
    fn zero_duration_of_decay_is_rejected() {
        let params = ClaimsParams {
            duration_of_decay: Duration::zero(),
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(EconomicsError::InvalidDuration { param: "duration_of_decay", .. })
        ));
    }

    #[test]
    fn negative_duration_until_decay_is_rejected() {
        let params = ClaimsParams {
            duration_until_decay: Duration::seconds(-1),
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(EconomicsError::InvalidDuration { param: "duration_until_decay", .. })
        ));
    }

    #[test]
    fn empty_denom_is_rejected() {
        let params = ClaimsParams {
            claims_denom: String::new(),
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(EconomicsError::InvalidDenom(String::new())));
    }

    #[test]
    fn disabled_params_are_still_validated() {
        let params = ClaimsParams {
            enable_claims: false,
            duration_of_decay: Duration::zero(),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn claims_activate_at_start_time() {
        let mut params = ClaimsParams {
            airdrop_start_time: t0(),
            ..Default::default()
        };
        assert!(!params.is_claims_active(t0() - Duration::seconds(1)));
        assert!(params.is_claims_active(t0()));

        params.enable_claims = false;
        assert!(!params.is_claims_active(t0() + Duration::hours(1)));
    }

    #[test]
    fn serde_uses_string_durations() {
        let params = ClaimsParams {
            airdrop_start_time: t0(),
            ..Default::default()
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["duration_until_decay"], "3600s");
        assert_eq!(json["duration_of_decay"], "18000s");

        let back: ClaimsParams = serde_json::from_value(json).unwrap();
        assert_eq!(back, params);
    }
}
