use std::path::PathBuf;

use caws_provenance::ConfidenceLevel;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Debug, Parser)]
#[command(name = "caws", about = "Change budgets and provenance for governed projects")]
pub struct CawsCli {
    /// Project root containing the `.caws/` directory.
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// CLI config file. Defaults to `<root>/.caws/caws.toml` when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level (otherwise `RUST_LOG` or `warn`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Derive the change budget and optionally check observed stats against it.
    Budget(BudgetArgs),
    /// Append to, verify, or summarize the provenance chain.
    #[command(subcommand)]
    Provenance(ProvenanceCommand),
}

#[derive(Debug, Args)]
pub struct BudgetArgs {
    /// Risk tier to use instead of the working spec's.
    #[arg(long)]
    pub tier: Option<u8>,

    /// Waiver ids to apply; only used together with `--tier`.
    #[arg(long = "waiver", requires = "tier")]
    pub waivers: Vec<String>,

    /// Files changed.
    #[arg(long, requires = "lines")]
    pub files: Option<u64>,

    /// Lines changed.
    #[arg(long, requires = "files")]
    pub lines: Option<u64>,

    /// Print a Markdown report instead of JSON.
    #[arg(long)]
    pub report: bool,
}

#[derive(Debug, Subcommand)]
pub enum ProvenanceCommand {
    /// Record a change event.
    Append(AppendArgs),
    /// Replay the chain and report integrity faults.
    Verify,
    /// Summarize the chain.
    Show,
}

#[derive(Debug, Args)]
pub struct AppendArgs {
    #[arg(long)]
    pub commit_hash: String,

    #[arg(long)]
    pub message: String,

    #[arg(long)]
    pub author: String,

    /// Who produced the change, e.g. `human`, `ci`, `ide-agent`.
    #[arg(long, default_value = "human")]
    pub agent_type: String,

    #[arg(long, value_enum, default_value_t = Confidence::High)]
    pub confidence: Confidence,

    /// Quality gate status as a JSON object.
    #[arg(long, default_value = "{}")]
    pub quality_gates: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl From<Confidence> for ConfidenceLevel {
    fn from(value: Confidence) -> Self {
        match value {
            Confidence::Low => ConfidenceLevel::Low,
            Confidence::Medium => ConfidenceLevel::Medium,
            Confidence::High => ConfidenceLevel::High,
        }
    }
}
