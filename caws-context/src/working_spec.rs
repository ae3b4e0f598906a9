use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ContextError;

/// Risk classification of a piece of work. Tier 1 is the strictest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RiskTier {
    Critical = 1,
    Standard = 2,
    Low = 3,
}

impl RiskTier {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for RiskTier {
    type Error = ContextError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Critical),
            2 => Ok(Self::Standard),
            3 => Ok(Self::Low),
            other => Err(ContextError::InvalidRiskTier(other)),
        }
    }
}

impl From<RiskTier> for u8 {
    fn from(value: RiskTier) -> Self {
        value.as_u8()
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Kind of change a working spec describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecMode {
    #[default]
    Feature,
    Refactor,
    Fix,
    Doc,
    Chore,
}

/// The subset of `.caws/working-spec.yaml` the governance core reads.
///
/// The tier is kept as the raw number so that an out-of-range value reaches
/// budget derivation and is reported there as an undefined tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingSpec {
    pub id: String,
    pub title: String,
    pub risk_tier: u8,
    #[serde(default)]
    pub mode: SpecMode,
    #[serde(default)]
    pub waiver_ids: Vec<String>,
}

/// Working-spec state captured into each provenance entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingSpecSnapshot {
    pub id: String,
    pub title: String,
    pub risk_tier: u8,
    pub mode: SpecMode,
    #[serde(default)]
    pub waiver_ids: Vec<String>,
}

impl From<&WorkingSpec> for WorkingSpecSnapshot {
    fn from(spec: &WorkingSpec) -> Self {
        Self {
            id: spec.id.clone(),
            title: spec.title.clone(),
            risk_tier: spec.risk_tier,
            mode: spec.mode,
            waiver_ids: spec.waiver_ids.clone(),
        }
    }
}
