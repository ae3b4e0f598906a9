use serde::Deserialize;
use serde::Serialize;

use crate::derivation::Budget;
use crate::derivation::BudgetLimits;

/// Observed size of a change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStats {
    pub files_changed: u64,
    pub lines_changed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    #[serde(rename = "maxFiles")]
    MaxFiles,
    #[serde(rename = "maxLoc")]
    MaxLoc,
}

/// A budget dimension that was exceeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetViolation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub current: u64,
    pub limit: u64,
    /// Tier baseline for the same dimension, for context.
    pub baseline: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub compliant: bool,
    pub baseline: BudgetLimits,
    pub effective: BudgetLimits,
    pub violations: Vec<BudgetViolation>,
}

impl Budget {
    /// Check a file count against the effective budget.
    pub fn check_files(&self, files_changed: u64) -> Option<BudgetViolation> {
        if files_changed > self.effective.max_files {
            Some(BudgetViolation {
                kind: ViolationKind::MaxFiles,
                current: files_changed,
                limit: self.effective.max_files,
                baseline: self.baseline.max_files,
                message: format!(
                    "File count ({files_changed}) exceeds budget ({})",
                    self.effective.max_files
                ),
            })
        } else {
            None
        }
    }

    pub fn check_lines(&self, lines_changed: u64) -> Option<BudgetViolation> {
        if lines_changed > self.effective.max_loc {
            Some(BudgetViolation {
                kind: ViolationKind::MaxLoc,
                current: lines_changed,
                limit: self.effective.max_loc,
                baseline: self.baseline.max_loc,
                message: format!(
                    "Lines of code ({lines_changed}) exceeds budget ({})",
                    self.effective.max_loc
                ),
            })
        } else {
            None
        }
    }
}

/// Compare observed stats with the effective budget, files first.
pub fn check_budget_compliance(budget: &Budget, stats: &ChangeStats) -> ComplianceResult {
    let violations: Vec<BudgetViolation> = [
        budget.check_files(stats.files_changed),
        budget.check_lines(stats.lines_changed),
    ]
    .into_iter()
    .flatten()
    .collect();
    ComplianceResult {
        compliant: violations.is_empty(),
        baseline: budget.baseline,
        effective: budget.effective,
        violations,
    }
}

/// Share of the effective budget taken up by the tier baseline, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetUtilization {
    pub files: f64,
    pub loc: f64,
    pub overall: f64,
}

pub fn calculate_budget_utilization(result: &ComplianceResult) -> BudgetUtilization {
    let files = percent(result.baseline.max_files, result.effective.max_files);
    let loc = percent(result.baseline.max_loc, result.effective.max_loc);
    BudgetUtilization {
        files,
        loc,
        overall: files.max(loc),
    }
}

pub fn is_approaching_budget_limit(result: &ComplianceResult, threshold_percent: f64) -> bool {
    calculate_budget_utilization(result).overall >= threshold_percent
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
