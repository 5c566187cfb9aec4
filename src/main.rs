use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use oracle_indicators::core::log::init_logging;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for oracle_indicators::AppCommand {
    fn from(cmd: Commands) -> oracle_indicators::AppCommand {
        match cmd {
            Commands::Serve { bind } => oracle_indicators::AppCommand::Serve { bind },
            Commands::Breakdown { country, json } => {
                oracle_indicators::AppCommand::Breakdown { country, json }
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Serve the indicator breakdown over HTTP
    Serve {
        /// Address to listen on, overrides `server.bind`
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Fetch the indicators once and print the breakdown
    Breakdown {
        /// Country code echoed in the output
        #[arg(long)]
        country: Option<String>,
        /// Print the JSON body the HTTP endpoint would return
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Some(Commands::Serve { .. }) => LevelFilter::INFO,
        _ => LevelFilter::WARN,
    };
    init_logging(cli.verbose, default_level);

    let result = match cli.command {
        Some(Commands::Setup) => oracle_indicators::cli::setup::setup(),
        Some(cmd) => oracle_indicators::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
