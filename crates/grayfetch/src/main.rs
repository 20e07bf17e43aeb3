//! Grayfetch CLI - download images from a CSV of links and convert them to grayscale.
//!
//! Every link is downloaded concurrently into a staging directory, and a
//! fixed-size pool of workers writes a grayscale copy of each download into
//! the output directory.
//!
//! # Usage
//!
//! ```bash
//! # Process a CSV of image links
//! grayfetch process --input links.csv --output outputs
//!
//! # Limit conversion workers and use the built-in converter
//! grayfetch process --input links.csv --output outputs --workers 2 --backend builtin
//!
//! # View configuration
//! grayfetch config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Grayfetch - concurrent image download and grayscale conversion.
#[derive(Parser, Debug)]
#[command(name = "grayfetch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Download every link in a CSV file and write grayscale copies
    Process(cli::process::ProcessArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match grayfetch_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `grayfetch config path`."
            );
            grayfetch_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Grayfetch v{}", grayfetch_core::VERSION);

    match cli.command {
        Commands::Process(args) => cli::process::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
