//! Core types for the tokenomics engine
//!
//! Defines monetary units, the fixed-point decimal model, block-time
//! helpers, and the serde encodings shared by every parameter struct.

use crate::errors::{EconomicsError, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Atomic currency amount (e.g. `aevmos`)
pub type Amount = u128;

/// Block-header time. Always supplied by the caller, never read locally.
pub type Timestamp = DateTime<Utc>;

/// Monotonically increasing count of completed periods
pub type Period = u64;

/// Number of fractional digits carried by every decimal result
pub const DEC_PRECISION: u32 = 18;

/// Atomic units per whole unit (1 evmos = 10^18 aevmos)
pub const POWER_REDUCTION: u64 = 1_000_000_000_000_000_000;

/// Seconds between the Unix epoch and `0001-01-01T00:00:00Z`
const UNSET_START_TIME_SECS: i64 = -62_135_596_800;

/// The zero timestamp used to mark an airdrop start time as unset.
pub fn unset_start_time() -> Timestamp {
    DateTime::from_timestamp(UNSET_START_TIME_SECS, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// `time + duration`, clamped to the representable range.
pub fn saturating_add(time: Timestamp, duration: Duration) -> Timestamp {
    match time.checked_add_signed(duration) {
        Some(t) => t,
        None if duration < Duration::zero() => DateTime::<Utc>::MIN_UTC,
        None => DateTime::<Utc>::MAX_UTC,
    }
}

/// Round to [`DEC_PRECISION`] places, half to even.
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DEC_PRECISION, RoundingStrategy::MidpointNearestEven)
}

/// Quantized `a * b`
pub fn dec_mul(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal> {
    a.checked_mul(b)
        .map(quantize)
        .ok_or(EconomicsError::CalculationOverflow(what))
}

/// Quantized `a / b`
pub fn dec_div(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal> {
    a.checked_div(b)
        .map(quantize)
        .ok_or(EconomicsError::CalculationOverflow(what))
}

/// Quantized `base ^ exp` by repeated squaring.
///
/// Each intermediate product is quantized, so the result matches an
/// 18-digit fixed-point implementation regardless of platform.
pub fn dec_powu(base: Decimal, mut exp: u64, what: &'static str) -> Result<Decimal> {
    let mut result = Decimal::ONE;
    let mut square = quantize(base);

    while exp > 0 {
        if exp & 1 == 1 {
            result = dec_mul(result, square, what)?;
        }
        exp >>= 1;
        if exp > 0 {
            if square.is_zero() {
                // A set bit remains, so the product is zero.
                return Ok(Decimal::ZERO);
            }
            square = dec_mul(square, square, what)?;
        }
    }

    Ok(result)
}

/// Truncate a non-negative decimal toward zero into an atomic amount.
pub fn truncate_amount(value: Decimal, what: &'static str) -> Result<Amount> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(EconomicsError::CalculationOverflow(what));
    }
    value
        .trunc()
        .to_u128()
        .ok_or(EconomicsError::CalculationOverflow(what))
}

/// Render a duration in protobuf JSON form, e.g. `"3600s"` or `"-0.5s"`.
pub fn format_duration(duration: &Duration) -> String {
    let secs = duration.num_seconds();
    let nanos = duration.subsec_nanos();
    let sign = if secs == 0 && nanos < 0 { "-" } else { "" };

    if nanos == 0 {
        format!("{sign}{secs}s")
    } else {
        let frac = format!("{:09}", nanos.unsigned_abs());
        format!("{sign}{secs}.{}s", frac.trim_end_matches('0'))
    }
}

/// Parse a protobuf JSON duration (`"5s"`, `"1.25s"`, `"-3s"`).
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let invalid = |reason: &str| EconomicsError::InvalidParameter {
        param: "duration",
        reason: format!("{reason}: {raw:?}"),
    };

    let body = raw
        .trim()
        .strip_suffix('s')
        .ok_or_else(|| invalid("missing 's' suffix"))?;
    let (negative, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let (whole, frac) = body.split_once('.').unwrap_or((body, ""));

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("malformed seconds"));
    }
    if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("malformed fractional seconds"));
    }

    let secs: i64 = whole.parse().map_err(|_| invalid("seconds out of range"))?;
    let nanos: i64 = if frac.is_empty() {
        0
    } else {
        format!("{frac:0<9}")
            .parse()
            .map_err(|_| invalid("malformed fractional seconds"))?
    };

    let magnitude = Duration::try_seconds(secs)
        .and_then(|d| d.checked_add(&Duration::nanoseconds(nanos)))
        .ok_or_else(|| invalid("duration out of range"))?;

    Ok(if negative { -magnitude } else { magnitude })
}

/// Serde adapter for [`chrono::Duration`] in protobuf JSON form.
pub mod duration_serde {
    use super::{format_duration, parse_duration};
    use chrono::Duration;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration(duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_duration(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn unset_start_time_is_year_one() {
        assert_eq!(unset_start_time().to_rfc3339(), "0001-01-01T00:00:00+00:00");
    }

    #[test]
    fn quantize_rounds_half_to_even() {
        let half_down = Decimal::from_str("0.0000000000000000005").unwrap();
        let half_up = Decimal::from_str("0.0000000000000000015").unwrap();
        assert_eq!(quantize(half_down), Decimal::ZERO);
        assert_eq!(quantize(half_up), Decimal::from_str("0.000000000000000002").unwrap());
    }

    #[test]
    fn powu_matches_repeated_multiplication() {
        let half = Decimal::from_str("0.5").unwrap();
        assert_eq!(dec_powu(half, 0, "t").unwrap(), Decimal::ONE);
        assert_eq!(dec_powu(half, 1, "t").unwrap(), half);
        assert_eq!(dec_powu(half, 3, "t").unwrap(), Decimal::from_str("0.125").unwrap());
        assert_eq!(dec_powu(Decimal::ZERO, 5, "t").unwrap(), Decimal::ZERO);
        assert_eq!(dec_powu(Decimal::ZERO, 0, "t").unwrap(), Decimal::ONE);
    }

    #[test]
    fn powu_flushes_tiny_results_to_zero() {
        let half = Decimal::from_str("0.5").unwrap();
        assert_eq!(dec_powu(half, 200, "t").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn truncate_amount_drops_fraction() {
        let value = Decimal::from_str("41.999").unwrap();
        assert_eq!(truncate_amount(value, "t").unwrap(), 41);
        assert!(truncate_amount(Decimal::NEGATIVE_ONE, "t").is_err());
    }

    #[test]
    fn durations_use_protobuf_json_form() {
        assert_eq!(format_duration(&Duration::hours(1)), "3600s");
        assert_eq!(format_duration(&Duration::milliseconds(1500)), "1.5s");
        assert_eq!(format_duration(&Duration::milliseconds(-500)), "-0.5s");

        assert_eq!(parse_duration("3600s").unwrap(), Duration::hours(1));
        assert_eq!(parse_duration("1.25s").unwrap(), Duration::milliseconds(1250));
        assert_eq!(parse_duration("-3s").unwrap(), Duration::seconds(-3));
        assert_eq!(parse_duration("0s").unwrap(), Duration::zero());
    }

    #[test]
    fn malformed_durations_are_rejected() {
        for raw in ["", "s", "10", "1h", "1.0000000001s", "a1s", "-s"] {
            assert!(parse_duration(raw).is_err(), "{raw:?} should not parse");
        }
    }
}
