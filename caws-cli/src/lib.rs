pub mod cli_args;
pub mod commands;
pub mod config;

pub use cli_args::CawsCli;
pub use cli_args::Command;
pub use cli_args::ProvenanceCommand;
pub use commands::CommandOutput;
pub use config::ChainFormat;
pub use config::CliConfig;

use caws_context::ProjectContext;
use tracing::debug;

/// Resolve the project and config for `cli`, then dispatch its subcommand.
///
/// The working spec is only read for commands that use it, so a broken spec
/// file does not block chain inspection or explicit-tier budgets.
pub fn run(cli: &CawsCli) -> anyhow::Result<CommandOutput> {
    let config = CliConfig::load(&cli.root, cli.config.as_deref())?;
    debug!(
        root = %cli.root.display(),
        chain_format = ?config.chain_format,
        "loaded cli config"
    );
    let layout = config.layout();
    let ctx = if needs_working_spec(&cli.command) {
        ProjectContext::discover_with_layout(&cli.root, layout)?
    } else {
        ProjectContext::new(&cli.root, None).with_layout(layout)
    };
    match &cli.command {
        Command::Budget(args) => commands::budget(&ctx, &config, args),
        Command::Provenance(command) => commands::provenance(&ctx, &config, command),
    }
}

fn needs_working_spec(command: &Command) -> bool {
    match command {
        Command::Budget(args) => args.tier.is_none(),
        Command::Provenance(command) => matches!(command, ProvenanceCommand::Append(_)),
    }
}
