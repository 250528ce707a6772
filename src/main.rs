use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use property_valuer::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    init_tracing(args.log_format);

    match args.get_command() {
        cli::Commands::Start => {
            commands::start::execute(&args.config).await?;
        }
        cli::Commands::Estimate(estimate_args) => {
            commands::estimate::execute(&args.config, estimate_args).await?;
        }
        cli::Commands::Neighborhoods => {
            commands::neighborhoods::execute();
        }
        cli::Commands::Test => {
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Version => {
            println!("Property Valuer v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
