use anyhow::Result;
use autofee::core::log::init_logging;
use clap::{CommandFactory, Parser, Subcommand};

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

impl From<Commands> for autofee::AppCommand {
    fn from(cmd: Commands) -> autofee::AppCommand {
        match cmd {
            Commands::Categories => autofee::AppCommand::Categories,
            Commands::Calc {
                price,
                category,
                json,
            } => autofee::AppCommand::Calculate {
                price,
                category,
                json,
            },
            Commands::Interactive => autofee::AppCommand::Interactive,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List vehicle categories offered by the fee service
    Categories,
    /// Calculate the fee breakdown for a vehicle price
    Calc {
        /// Vehicle base price; invalid input counts as 0
        #[arg(allow_hyphen_values = true)]
        price: String,

        /// Vehicle category id or label
        #[arg(short = 't', long)]
        category: Option<String>,

        /// Print the breakdown as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recalculate fees interactively as price and category change
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => autofee::cli::setup::setup(),
        Some(cmd) => autofee::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
