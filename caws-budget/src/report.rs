use crate::compliance::ComplianceResult;
use crate::compliance::calculate_budget_utilization;
use crate::derivation::Budget;

/// Render a budget, and optionally its compliance result, as Markdown.
pub fn render_budget_report(budget: &Budget, compliance: Option<&ComplianceResult>) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Change budget (risk tier {})\n\n", budget.risk_tier));
    md.push_str(&format!("**Policy version**: {}\n", budget.policy_version));
    md.push_str(&format!("**Derived at**: {}\n\n", budget.derived_at.to_rfc3339()));
    md.push_str("| Limit | Baseline | Effective |\n|---|---|---|\n");
    md.push_str(&format!(
        "| Files | {} | {} |\n",
        budget.baseline.max_files, budget.effective.max_files
    ));
    md.push_str(&format!(
        "| Lines | {} | {} |\n\n",
        budget.baseline.max_loc, budget.effective.max_loc
    ));

    if !budget.waivers_applied.is_empty() {
        md.push_str(&format!(
            "**Waivers applied**: {}\n",
            budget.waivers_applied.join(", ")
        ));
    }
    for excluded in &budget.waivers_excluded {
        md.push_str(&format!(
            "- Waiver {} excluded: {}\n",
            excluded.id, excluded.reason
        ));
    }

    if let Some(result) = compliance {
        md.push_str("\n---\n\n");
        if result.compliant {
            md.push_str("Within budget.\n");
        } else {
            md.push_str("## Violations\n\n");
            for violation in &result.violations {
                md.push_str(&format!(
                    "- {} (tier baseline {})\n",
                    violation.message, violation.baseline
                ));
            }
        }
        let util = calculate_budget_utilization(result);
        md.push_str(&format!(
            "\n**Baseline share of budget**: files {:.1}%, lines {:.1}%\n",
            util.files, util.loc
        ));
    }
    md
}
