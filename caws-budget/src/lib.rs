pub mod compliance;
pub mod derivation;
pub mod error;
pub mod policy;
pub mod report;
pub mod store;
pub mod waiver;

// Re-export key types for convenience.
pub use compliance::{
    BudgetUtilization, BudgetViolation, ChangeStats, ComplianceResult, ViolationKind,
    calculate_budget_utilization, check_budget_compliance, is_approaching_budget_limit,
};
pub use derivation::{
    Budget, BudgetLimits, BudgetSpec, ExcludedWaiver, derive_budget, derive_budget_at,
};
pub use error::{BudgetError, Result};
pub use policy::{PolicyTable, TierPolicy, WaiverApproval};
pub use report::render_budget_report;
pub use store::{FsPolicyStore, MemoryPolicyStore, PolicyStore, WaiverLookup};
pub use waiver::{
    BudgetDelta, ExclusionReason, Waiver, WaiverStatus, is_waiver_valid, waiver_exclusion,
};
