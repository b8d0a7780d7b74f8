use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use polystore::adapter::inbound::cli::command::{Cli, Commands, ConfigCommand};
use polystore::adapter::inbound::cli::output::{self, OutputMode};
use polystore::adapter::inbound::cli::{check, config, cycle, report};
use polystore::infrastructure::config::Config;

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    config.init_logging();
    info!(config = %cli.config.display(), "polystore starting");
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let passed = match &cli.command {
        Commands::Check => check::execute(&load_config(&cli)?)?,
        Commands::Report(args) => {
            let intent = args.intent.to_intent();
            report::execute(&load_config(&cli)?, &intent).await?
        }
        Commands::Cycle => cycle::execute(&load_config(&cli)?).await?,
        Commands::Config(ConfigCommand::Show) => {
            config::execute_show(&cli.config)?;
            true
        }
        Commands::Config(ConfigCommand::Validate) => {
            config::execute_validate(&cli.config)?;
            true
        }
    };
    Ok(passed)
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    output::configure(OutputMode::new(cli.json, cli.quiet, cli.verbose), &cli.color);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
