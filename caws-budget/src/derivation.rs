use std::collections::HashSet;

use caws_context::WaiverId;
use caws_context::WorkingSpec;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::error::Result;
use crate::policy::PolicyTable;
use crate::store::PolicyStore;
use crate::store::WaiverLookup;
use crate::waiver::ExclusionReason;
use crate::waiver::waiver_exclusion;

/// What a budget is being derived for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSpec {
    pub risk_tier: u8,
    #[serde(default)]
    pub waiver_ids: Vec<String>,
}

impl From<&WorkingSpec> for BudgetSpec {
    fn from(spec: &WorkingSpec) -> Self {
        Self {
            risk_tier: spec.risk_tier,
            waiver_ids: spec.waiver_ids.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLimits {
    pub max_files: u64,
    pub max_loc: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedWaiver {
    pub id: String,
    pub reason: ExclusionReason,
}

/// A derived change budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub risk_tier: u8,
    pub policy_version: u32,
    pub baseline: BudgetLimits,
    pub effective: BudgetLimits,
    /// Ids summed into `effective`, in request order.
    pub waivers_applied: Vec<String>,
    pub waivers_excluded: Vec<ExcludedWaiver>,
    pub derived_at: DateTime<Utc>,
}

/// Derive the budget for `spec` as of now.
pub fn derive_budget(spec: &BudgetSpec, store: &impl PolicyStore) -> Result<Budget> {
    derive_budget_at(spec, store, Utc::now())
}

/// Derive the budget for `spec`, judging waiver expiry against `now`.
pub fn derive_budget_at(
    spec: &BudgetSpec,
    store: &impl PolicyStore,
    now: DateTime<Utc>,
) -> Result<Budget> {
    let policy = match store.load_policy()? {
        Some(policy) => policy,
        None => {
            debug!("no policy configured, using built-in table");
            PolicyTable::default()
        }
    };
    policy.validate()?;

    let tier = policy.tier(spec.risk_tier)?;
    let baseline = BudgetLimits {
        max_files: tier.max_files,
        max_loc: tier.max_loc,
    };
    let mut effective = baseline;
    let mut waivers_applied = Vec::new();
    let mut waivers_excluded = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for raw_id in &spec.waiver_ids {
        let outcome = if seen.insert(raw_id.as_str()) {
            evaluate_waiver(raw_id, store, &policy, now)
        } else {
            Err(ExclusionReason::Duplicate)
        };
        match outcome {
            Ok(delta) => {
                effective.max_files = effective.max_files.saturating_add(delta.max_files);
                effective.max_loc = effective.max_loc.saturating_add(delta.max_loc);
                debug!(
                    waiver = %raw_id,
                    files = delta.max_files,
                    loc = delta.max_loc,
                    "applied waiver"
                );
                waivers_applied.push(raw_id.clone());
            }
            Err(reason) => {
                warn!(waiver = %raw_id, %reason, "waiver excluded from budget");
                waivers_excluded.push(ExcludedWaiver {
                    id: raw_id.clone(),
                    reason,
                });
            }
        }
    }

    Ok(Budget {
        risk_tier: spec.risk_tier,
        policy_version: policy.version,
        baseline,
        effective,
        waivers_applied,
        waivers_excluded,
        derived_at: now,
    })
}

fn evaluate_waiver(
    raw_id: &str,
    store: &impl PolicyStore,
    policy: &PolicyTable,
    now: DateTime<Utc>,
) -> std::result::Result<BudgetLimits, ExclusionReason> {
    let id = WaiverId::parse(raw_id).map_err(|_| ExclusionReason::MalformedId)?;
    let waiver = match store.load_waiver(&id) {
        WaiverLookup::Found(waiver) => waiver,
        WaiverLookup::Missing => return Err(ExclusionReason::Missing),
        WaiverLookup::Unreadable(detail) => {
            debug!(waiver = %id, %detail, "waiver record unreadable");
            return Err(ExclusionReason::Unreadable);
        }
    };
    if waiver.id.as_deref().is_some_and(|recorded| recorded != id.as_str()) {
        return Err(ExclusionReason::IdMismatch);
    }
    if let Some(reason) = waiver_exclusion(&waiver, policy, now) {
        return Err(reason);
    }
    let delta = waiver.delta.unwrap_or_default();
    Ok(BudgetLimits {
        max_files: delta.max_files,
        max_loc: delta.max_loc,
    })
}
