use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::policy::PolicyTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaiverStatus {
    Active,
    Revoked,
    /// Any status this core does not recognise; never valid for use.
    #[serde(other)]
    Unknown,
}

/// Additional allowance granted by a waiver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetDelta {
    #[serde(default, alias = "maxFiles")]
    pub max_files: u64,
    #[serde(default, alias = "maxLoc")]
    pub max_loc: u64,
}

/// A time-boxed exception as stored on disk.
///
/// Identifying fields are optional so that an incomplete record still loads
/// and is rejected by [`waiver_exclusion`] rather than by the parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Waiver {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub status: Option<WaiverStatus>,
    #[serde(default, alias = "expiresAt")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "approved_by", alias = "approvedBy")]
    pub approvers: Option<Vec<String>>,
    #[serde(default)]
    pub delta: Option<BudgetDelta>,
    /// Quality gates this waiver exempts. Carried through untouched.
    #[serde(default)]
    pub gates: Vec<String>,
}

/// Why a requested waiver did not contribute to the effective budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    MalformedId,
    Missing,
    Unreadable,
    /// The record found under the requested id names a different waiver.
    IdMismatch,
    Duplicate,
    Incomplete,
    NotActive,
    Expired,
    InsufficientApprovals,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MalformedId => "id does not match WV-####",
            Self::Missing => "no waiver record found",
            Self::Unreadable => "waiver record could not be parsed",
            Self::IdMismatch => "record id does not match the requested id",
            Self::Duplicate => "already requested earlier in the list",
            Self::Incomplete => "required fields missing",
            Self::NotActive => "status is not active",
            Self::Expired => "expired",
            Self::InsufficientApprovals => "not enough approvers",
        };
        f.write_str(text)
    }
}

/// First rule `waiver` breaks at `now`, or `None` when it may be applied.
pub fn waiver_exclusion(
    waiver: &Waiver,
    policy: &PolicyTable,
    now: DateTime<Utc>,
) -> Option<ExclusionReason> {
    let (Some(_), Some(status), Some(expires_at), Some(approvers), Some(_)) = (
        waiver.id.as_ref(),
        waiver.status,
        waiver.expires_at,
        waiver.approvers.as_ref(),
        waiver.delta,
    ) else {
        return Some(ExclusionReason::Incomplete);
    };

    if status != WaiverStatus::Active {
        return Some(ExclusionReason::NotActive);
    }
    if expires_at <= now {
        return Some(ExclusionReason::Expired);
    }
    if (approvers.len() as u64) < u64::from(policy.waiver_approval.required_approvers) {
        return Some(ExclusionReason::InsufficientApprovals);
    }
    None
}

pub fn is_waiver_valid(waiver: &Waiver, policy: &PolicyTable, now: DateTime<Utc>) -> bool {
    waiver_exclusion(waiver, policy, now).is_none()
}
