use anyhow::Context;
use caws_budget::BudgetSpec;
use caws_budget::ChangeStats;
use caws_budget::FsPolicyStore;
use caws_budget::calculate_budget_utilization;
use caws_budget::check_budget_compliance;
use caws_budget::derive_budget;
use caws_budget::is_approaching_budget_limit;
use caws_budget::render_budget_report;
use caws_context::ProjectContext;
use caws_provenance::AgentInfo;
use caws_provenance::ChainStore;
use caws_provenance::ChangeEvent;
use caws_provenance::CommitInfo;
use caws_provenance::JsonFileChainStore;
use caws_provenance::JsonLinesChainStore;
use caws_provenance::ProvenanceLedger;
use serde_json::Value;
use serde_json::json;

use crate::cli_args::AppendArgs;
use crate::cli_args::BudgetArgs;
use crate::cli_args::ProvenanceCommand;
use crate::config::ChainFormat;
use crate::config::CliConfig;

/// What a command printed and whether the checked condition held.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    /// False when a budget is exceeded or the chain is compromised.
    pub passed: bool,
}

impl CommandOutput {
    fn json(value: &Value, passed: bool) -> anyhow::Result<Self> {
        Ok(Self {
            stdout: serde_json::to_string_pretty(value)?,
            passed,
        })
    }
}

pub fn budget(
    ctx: &ProjectContext,
    config: &CliConfig,
    args: &BudgetArgs,
) -> anyhow::Result<CommandOutput> {
    let spec = match args.tier {
        Some(risk_tier) => BudgetSpec {
            risk_tier,
            waiver_ids: args.waivers.clone(),
        },
        None => BudgetSpec::from(ctx.require_working_spec()?),
    };
    let store = FsPolicyStore::for_project(ctx);
    let budget = derive_budget(&spec, &store)?;

    let compliance = match (args.files, args.lines) {
        (Some(files_changed), Some(lines_changed)) => Some(check_budget_compliance(
            &budget,
            &ChangeStats {
                files_changed,
                lines_changed,
            },
        )),
        _ => None,
    };
    let passed = compliance.as_ref().is_none_or(|c| c.compliant);

    if args.report {
        return Ok(CommandOutput {
            stdout: render_budget_report(&budget, compliance.as_ref()),
            passed,
        });
    }

    let mut out = json!({ "budget": budget });
    if let Some(result) = &compliance {
        out["compliance"] = serde_json::to_value(result)?;
        out["utilization"] = serde_json::to_value(calculate_budget_utilization(result))?;
        out["approachingLimit"] = json!(is_approaching_budget_limit(
            result,
            config.approaching_threshold_percent
        ));
    }
    CommandOutput::json(&out, passed)
}

pub fn provenance(
    ctx: &ProjectContext,
    config: &CliConfig,
    command: &ProvenanceCommand,
) -> anyhow::Result<CommandOutput> {
    let ledger = ProvenanceLedger::new(chain_store(ctx, config));
    match command {
        ProvenanceCommand::Append(args) => {
            let event = change_event(args)?;
            let entry = ledger.append(ctx, event)?;
            CommandOutput::json(&serde_json::to_value(&entry)?, true)
        }
        ProvenanceCommand::Verify => {
            let result = ledger.verify()?;
            let passed = result.valid;
            CommandOutput::json(&serde_json::to_value(&result)?, passed)
        }
        ProvenanceCommand::Show => {
            let summary = ledger.summary()?;
            CommandOutput::json(&serde_json::to_value(&summary)?, true)
        }
    }
}

fn chain_store(ctx: &ProjectContext, config: &CliConfig) -> Box<dyn ChainStore> {
    match config.chain_format {
        ChainFormat::Json => Box::new(JsonFileChainStore::for_project(ctx)),
        ChainFormat::Jsonl => Box::new(JsonLinesChainStore::for_project(ctx)),
    }
}

fn change_event(args: &AppendArgs) -> anyhow::Result<ChangeEvent> {
    let quality_gates: Value = serde_json::from_str(&args.quality_gates)
        .context("--quality-gates must be a JSON value")?;
    Ok(ChangeEvent {
        commit: CommitInfo {
            hash: args.commit_hash.clone(),
            message: args.message.clone(),
            author: args.author.clone(),
        },
        working_spec: None,
        quality_gates,
        agent: AgentInfo {
            agent_type: args.agent_type.clone(),
            confidence_level: args.confidence.into(),
        },
    })
}
