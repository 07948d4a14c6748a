//! openmash CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use openmash_cli::cli::{Cli, Command};
use openmash_cli::commands;
use openmash_cli::error::CliResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = commands::init_logging(cli.tracing_config()) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<String> {
    let factory = commands::factory(&cli)?;

    match cli.command {
        Command::Check => Ok(commands::check(&factory, &cli.properties, &cli.user)),
        Command::Calendars { json } => {
            let client = factory.build_client(&cli.user);
            let calendars = client.list_calendars().await?;
            commands::render_calendars(&calendars, json)
        }
        Command::Get { ref path } => {
            let client = factory.build_client(&cli.user);
            let body: serde_json::Value = client.get_json(path).await?;
            Ok(serde_json::to_string_pretty(&body)?)
        }
    }
}
