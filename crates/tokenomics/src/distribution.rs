//! Splitting minted coins and transaction fees between recipients

use crate::errors::{EconomicsError, Result};
use crate::inflation::{in_unit_interval, InflationDistribution};
use crate::types::{dec_mul, truncate_amount, Amount};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where one epoch's mint went, in atomic units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InflationAllocation {
    pub staking_rewards: Amount,
    pub usage_incentives: Amount,
    /// Receives the truncation remainder
    pub community_pool: Amount,
}

impl InflationAllocation {
    pub fn total(&self) -> Amount {
        self.staking_rewards + self.usage_incentives + self.community_pool
    }
}

/// Split `minted` by the distribution shares. Staking and incentive shares
/// truncate; the community pool takes what is left so nothing is lost.
pub fn allocate_inflation(
    minted: Amount,
    distribution: &InflationDistribution,
) -> Result<InflationAllocation> {
    let staking_rewards = share_of(minted, distribution.staking_rewards, "staking rewards")?;
    let usage_incentives = share_of(minted, distribution.usage_incentives, "usage incentives")?;
    let community_pool = minted
        .checked_sub(staking_rewards)
        .and_then(|rest| rest.checked_sub(usage_incentives))
        .ok_or(EconomicsError::CalculationOverflow("community pool"))?;

    Ok(InflationAllocation {
        staking_rewards,
        usage_incentives,
        community_pool,
    })
}

/// Fee split between the block proposer and the deployer of the called contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeDistribution {
    /// Block proposer reward percentage
    #[serde(with = "rust_decimal::serde::str")]
    pub proposer_reward: Decimal,
    /// Contract reward percentage
    #[serde(with = "rust_decimal::serde::str")]
    pub contract_rewards: Decimal,
}

impl Default for FeeDistribution {
    fn default() -> Self {
        Self {
            proposer_reward: Decimal::new(5, 1),
            contract_rewards: Decimal::new(5, 1),
        }
    }
}

/// Result of [`FeeDistribution::split`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub proposer: Amount,
    pub contract: Amount,
    /// Unassigned share plus rounding dust
    pub remainder: Amount,
}

impl FeeDistribution {
    pub fn validate(&self) -> Result<()> {
        if !in_unit_interval(self.proposer_reward) {
            return Err(EconomicsError::InvalidParameter {
                param: "proposer_reward",
                reason: format!("must be within [0, 1]: {}", self.proposer_reward),
            });
        }
        if !in_unit_interval(self.contract_rewards) {
            return Err(EconomicsError::InvalidParameter {
                param: "contract_rewards",
                reason: format!("must be within [0, 1]: {}", self.contract_rewards),
            });
        }
        let total = self.proposer_reward + self.contract_rewards;
        if total > Decimal::ONE {
            return Err(EconomicsError::InvalidParameter {
                param: "fee_distribution",
                reason: format!("shares cannot exceed 1, got {total}"),
            });
        }
        Ok(())
    }

    pub fn split(&self, fee: Amount) -> Result<FeeSplit> {
        let proposer = share_of(fee, self.proposer_reward, "proposer fee")?;
        let contract = share_of(fee, self.contract_rewards, "contract fee")?;
        let remainder = fee
            .checked_sub(proposer)
            .and_then(|rest| rest.checked_sub(contract))
            .ok_or(EconomicsError::CalculationOverflow("fee remainder"))?;
        Ok(FeeSplit {
            proposer,
            contract,
            remainder,
        })
    }
}

/// Registered payout address for a contract's fee share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractWithdrawAddress {
    /// Contract hex address registered on the fee distribution module
    pub contract_address: String,
    /// Hex address of the registered owner/withdraw address
    pub withdraw_address: String,
}

impl ContractWithdrawAddress {
    pub fn new(contract_address: impl Into<String>, withdraw_address: impl Into<String>) -> Self {
        Self {
            contract_address: contract_address.into(),
            withdraw_address: withdraw_address.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_hex_address("contract", &self.contract_address)?;
        validate_hex_address("withdraw", &self.withdraw_address)
    }
}

/// `0x` followed by exactly 20 bytes of hex.
pub fn validate_hex_address(field: &'static str, address: &str) -> Result<()> {
    let invalid = || EconomicsError::InvalidContractAddress {
        field,
        address: address.to_string(),
    };
    let body = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(invalid)?;
    match hex::decode(body) {
        Ok(bytes) if bytes.len() == 20 => Ok(()),
        _ => Err(invalid()),
    }
}

fn share_of(amount: Amount, share: Decimal, what: &'static str) -> Result<Amount> {
    let amount = Decimal::from_u128(amount).ok_or(EconomicsError::CalculationOverflow(what))?;
    truncate_amount(dec_mul(amount, share, what)?, what)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn inflation_split_gives_remainder_to_community_pool() {
        let alloc = allocate_inflation(1_000, &InflationDistribution::default()).unwrap();
        assert_eq!(alloc.staking_rewards, 533);
        assert_eq!(alloc.usage_incentives, 333);
        assert_eq!(alloc.community_pool, 134);
        assert_eq!(alloc.total(), 1_000);
    }

    #[test]
    fn zero_mint_allocates_nothing() {
        let alloc = allocate_inflation(0, &InflationDistribution::default()).unwrap();
        assert_eq!(alloc, InflationAllocation::default());
    }

    #[test]
    fn fee_split_keeps_dust_in_remainder() {
        let dist = FeeDistribution {
            proposer_reward: dec("0.3"),
            contract_rewards: dec("0.6"),
        };
        assert!(dist.validate().is_ok());
        let split = dist.split(1_001).unwrap();
        assert_eq!(split.proposer, 300);
        assert_eq!(split.contract, 600);
        assert_eq!(split.remainder, 101);
    }

    #[test]
    fn fee_shares_above_one_are_rejected() {
        let dist = FeeDistribution {
            proposer_reward: dec("0.6"),
            contract_rewards: dec("0.6"),
        };
        assert!(matches!(
            dist.validate(),
            Err(EconomicsError::InvalidParameter { param: "fee_distribution", .. })
        ));

        let dist = FeeDistribution {
            proposer_reward: dec("-0.1"),
            contract_rewards: dec("0.5"),
        };
        assert!(dist.validate().is_err());
    }

    #[test]
    fn withdraw_addresses_must_be_hex() {
        let ok = ContractWithdrawAddress::new(
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
        );
        assert!(ok.validate().is_ok());

        let bad = ContractWithdrawAddress::new("0x1234", ok.withdraw_address.clone());
        assert!(matches!(
            bad.validate(),
            Err(EconomicsError::InvalidContractAddress { field: "contract", .. })
        ));

        let bad = ContractWithdrawAddress::new(ok.contract_address.clone(), "evmos1qqqq");
        assert!(matches!(
            bad.validate(),
            Err(EconomicsError::InvalidContractAddress { field: "withdraw", .. })
        ));
    }
}
