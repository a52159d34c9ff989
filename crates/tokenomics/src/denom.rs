//! Currency denomination syntax

use crate::errors::{EconomicsError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Leading letter, then 2–127 of `[a-zA-Z0-9/:._-]` (3–128 chars total).
const DENOM_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9/:._-]{2,127}$";

static DENOM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(DENOM_PATTERN).expect("denom pattern is a valid regex"));

/// Check that `denom` is a well-formed currency identifier.
pub fn validate_denom_syntax(denom: &str) -> Result<()> {
    if DENOM_REGEX.is_match(denom) {
        Ok(())
    } else {
        Err(EconomicsError::InvalidDenom(denom.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_denoms() {
        for denom in ["aevmos", "uatom", "ibc/27394FB092D2ECCD", "gamm/pool/1", "abc"] {
            assert!(validate_denom_syntax(denom).is_ok(), "{denom} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_denoms() {
        let too_long = format!("a{}", "b".repeat(128));
        for denom in ["", "ab", "1abc", "evm os", "ev$mos", too_long.as_str()] {
            assert_eq!(
                validate_denom_syntax(denom),
                Err(EconomicsError::InvalidDenom(denom.to_string()))
            );
        }
    }

    #[test]
    fn accepts_maximum_length() {
        let max = format!("a{}", "b".repeat(127));
        assert!(validate_denom_syntax(&max).is_ok());
    }
}
