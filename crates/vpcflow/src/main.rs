mod commands;
mod progress;
mod utils;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vpcflow_core::Topology;

#[derive(Parser)]
#[command(name = "vpcflow")]
#[command(about = "Provision the skills VPC network on AWS, one call at a time", long_about = None)]
struct Cli {
    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the topology and list the actions apply would perform
    Plan,
    /// Create the network
    Apply {
        /// Create the resources (without this only the plan is printed)
        #[arg(short, long)]
        yes: bool,
        /// Do not write the state file
        #[arg(long)]
        no_state: bool,
    },
    /// Show the resources recorded by the last apply
    Show {
        /// Print the raw state file
        #[arg(long)]
        json: bool,
    },
    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let topology = Topology::skills();

    match cli.command {
        Commands::Plan => commands::plan::handle(&topology),
        Commands::Apply { yes, no_state } => commands::apply::handle(topology, yes, no_state).await,
        Commands::Show { json } => commands::show::handle(json).await,
        Commands::Version => {
            println!("vpcflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
