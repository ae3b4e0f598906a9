use std::collections::BTreeMap;

use caws_context::RiskTier;
use serde::Deserialize;
use serde::Serialize;

use crate::error::BudgetError;
use crate::error::Result;

/// Change limits for one risk tier, plus the quality thresholds the tier
/// is held to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPolicy {
    #[serde(alias = "maxFiles")]
    pub max_files: u64,
    #[serde(alias = "maxLoc")]
    pub max_loc: u64,
    #[serde(alias = "coverageThreshold")]
    pub coverage_threshold: f64,
    #[serde(alias = "mutationThreshold")]
    pub mutation_threshold: f64,
}

/// Rules a waiver must satisfy before it counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaiverApproval {
    #[serde(alias = "requiredApprovers")]
    pub required_approvers: u32,
    #[serde(alias = "maxDurationDays")]
    pub max_duration_days: u32,
}

impl Default for WaiverApproval {
    fn default() -> Self {
        Self {
            required_approvers: 1,
            max_duration_days: 90,
        }
    }
}

/// Versioned mapping from risk tier to baseline budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyTable {
    pub version: u32,
    #[serde(alias = "riskTiers")]
    pub risk_tiers: BTreeMap<u8, TierPolicy>,
    #[serde(default, alias = "waiverApproval")]
    pub waiver_approval: WaiverApproval,
}

impl Default for PolicyTable {
    fn default() -> Self {
        let tier = |max_files, max_loc, coverage_threshold, mutation_threshold| TierPolicy {
            max_files,
            max_loc,
            coverage_threshold,
            mutation_threshold,
        };
        Self {
            version: 1,
            risk_tiers: BTreeMap::from([
                (RiskTier::Critical.as_u8(), tier(25, 1000, 0.9, 0.7)),
                (RiskTier::Standard.as_u8(), tier(50, 2000, 0.8, 0.5)),
                (RiskTier::Low.as_u8(), tier(100, 5000, 0.7, 0.3)),
            ]),
            waiver_approval: WaiverApproval::default(),
        }
    }
}

impl PolicyTable {
    /// Reject tables that name tiers outside 1..=3 or allow unapproved waivers.
    pub fn validate(&self) -> Result<()> {
        for tier in self.risk_tiers.keys() {
            if RiskTier::try_from(*tier).is_err() {
                return Err(BudgetError::InvalidPolicy(format!(
                    "risk tier {tier} is outside 1..=3"
                )));
            }
        }
        if self.waiver_approval.required_approvers == 0 {
            return Err(BudgetError::InvalidPolicy(
                "waiver_approval.required_approvers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tier(&self, tier: u8) -> Result<&TierPolicy> {
        self.risk_tiers
            .get(&tier)
            .ok_or(BudgetError::UndefinedTier(tier))
    }
}
